pub mod agent;
pub mod config;
pub mod engine;
pub mod error;
pub mod event_log;
pub mod grid;
pub mod injector;
pub mod pathfinding;

pub use agent::Agent;
pub use config::Config;
pub use engine::{EngineSettings, Phase, SimStats, SimulationConfig, SimulationEngine, TickReport};
pub use error::{Result, SimError};
pub use grid::{CellState, GridMap};
pub use injector::{InjectionOutcome, ObstacleInjector};
pub use pathfinding::{find_path, Path, Position};
