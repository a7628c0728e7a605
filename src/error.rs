//! Error types for the simulation

use crate::pathfinding::Position;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("No initial path found from {start} to {goal}")]
    UnreachableAtStart { start: Position, goal: Position },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for SimError {
    fn from(e: toml::de::Error) -> Self {
        SimError::InvalidConfig(e.to_string())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
