use crate::engine::{EngineSettings, SimulationConfig};
use crate::error::Result;
use crate::pathfinding::Position;
use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub obstacles: ObstacleConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub simulation: RunConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_cols")]
    pub cols: i32,
    #[serde(default = "default_rows")]
    pub rows: i32,
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
}

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub start_x: i32,
    #[serde(default)]
    pub start_y: i32,
    /// Defaults to the bottom-right cell
    #[serde(default)]
    pub goal_x: Option<i32>,
    #[serde(default)]
    pub goal_y: Option<i32>,
    #[serde(default = "default_steps_per_move")]
    pub steps_per_move: usize,
}

#[derive(Debug, Deserialize)]
pub struct ObstacleConfig {
    #[serde(default = "default_initial_count")]
    pub initial_count: usize,
    #[serde(default = "default_inject_interval_ms")]
    pub inject_interval_ms: u64,
    #[serde(default = "default_validate_off_path")]
    pub validate_off_path: bool,
}

#[derive(Debug, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_move_interval_ms")]
    pub move_interval_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_headless_tick_ms")]
    pub headless_tick_ms: u64,
    #[serde(default = "default_headless_max_ticks")]
    pub headless_max_ticks: u64,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_enable_event_log")]
    pub enable_event_log: bool,
    #[serde(default = "default_event_log_path")]
    pub event_log_path: String,
}

// Default values
fn default_cols() -> i32 { 40 }
fn default_rows() -> i32 { 20 }
fn default_cell_size() -> f32 { 30.0 }
fn default_steps_per_move() -> usize { 1 }
fn default_initial_count() -> usize { 150 }
fn default_inject_interval_ms() -> u64 { 2000 }
fn default_validate_off_path() -> bool { true }
fn default_move_interval_ms() -> u64 { 375 }
fn default_headless_tick_ms() -> u64 { 16 }
fn default_headless_max_ticks() -> u64 { 100_000 }
fn default_enable_event_log() -> bool { true }
fn default_event_log_path() -> String { "event_log.json".to_string() }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: default_cols(),
            rows: default_rows(),
            cell_size: default_cell_size(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            start_x: 0,
            start_y: 0,
            goal_x: None,
            goal_y: None,
            steps_per_move: default_steps_per_move(),
        }
    }
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            initial_count: default_initial_count(),
            inject_interval_ms: default_inject_interval_ms(),
            validate_off_path: default_validate_off_path(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            move_interval_ms: default_move_interval_ms(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: None,
            headless_tick_ms: default_headless_tick_ms(),
            headless_max_ticks: default_headless_max_ticks(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_event_log: default_enable_event_log(),
            event_log_path: default_event_log_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            agent: AgentConfig::default(),
            obstacles: ObstacleConfig::default(),
            timing: TimingConfig::default(),
            simulation: RunConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `config.toml`, or use defaults if it is missing or invalid
    pub fn load() -> Self {
        match Self::from_path("config.toml") {
            Ok(config) => {
                info!("Loaded configuration from config.toml");
                config
            }
            Err(crate::error::SimError::Io(_)) => {
                info!("No config.toml found, using default configuration");
                Config::default()
            }
            Err(e) => {
                warn!("Failed to parse config.toml: {}", e);
                warn!("Using default configuration");
                Config::default()
            }
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn start(&self) -> Position {
        Position::new(self.agent.start_x, self.agent.start_y)
    }

    pub fn goal(&self) -> Position {
        Position::new(
            self.agent.goal_x.unwrap_or(self.grid.cols - 1),
            self.agent.goal_y.unwrap_or(self.grid.rows - 1),
        )
    }

    /// Engine parameters derived from this configuration
    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            cols: self.grid.cols,
            rows: self.grid.rows,
            start: self.start(),
            goal: self.goal(),
            initial_obstacles: self.obstacles.initial_count,
            settings: EngineSettings {
                move_interval_ms: self.timing.move_interval_ms,
                obstacle_interval_ms: self.obstacles.inject_interval_ms,
                steps_per_move: self.agent.steps_per_move,
                validate_off_path: self.obstacles.validate_off_path,
                record_events: self.logging.enable_event_log,
            },
            seed: self.simulation.seed,
        }
    }
}
