use crate::error::Result;
use crate::pathfinding::Position;
use serde::{Deserialize, Serialize};

/// Things the engine reports while it runs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Initial route computed
    Planned { path_len: usize },
    /// Agent moved onto a cell
    Moved { x: i32, y: i32, step: usize },
    /// Obstacle placed and kept
    ObstacleAdded { x: i32, y: i32, path_len: usize },
    /// Obstacle placed and rolled back because it stranded the agent
    ObstacleReverted { x: i32, y: i32 },
    /// No cell available for an obstacle
    InjectionSkipped,
    /// Agent has no route to the goal
    Stranded { x: i32, y: i32 },
    /// Agent arrived at the goal
    GoalReached { steps: usize },
}

impl SimEvent {
    pub fn moved(pos: Position, step: usize) -> Self {
        SimEvent::Moved { x: pos.x, y: pos.y, step }
    }
}

/// Logged event with simulated timestamp
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Simulated milliseconds since start
    pub timestamp_ms: u64,
    pub event: SimEvent,
}

/// Event recorder
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    enabled: bool,
    events: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn new(enabled: bool) -> Self {
        EventLog {
            enabled,
            events: Vec::new(),
        }
    }

    /// Record an event; no-op when disabled
    pub fn log(&mut self, timestamp_ms: u64, event: SimEvent) {
        if self.enabled {
            self.events.push(LoggedEvent { timestamp_ms, event });
        }
    }

    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    /// Save log to JSON file
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.events)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Print log to console
    pub fn print(&self) {
        println!("\n=== Event Log ({} events) ===", self.events.len());
        for (i, logged) in self.events.iter().enumerate() {
            println!("[{:7}ms] #{:4} {:?}", logged.timestamp_ms, i + 1, logged.event);
        }
        println!("=== End of Log ===\n");
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        let mut moves = 0;
        let mut added = 0;
        let mut reverted = 0;
        let mut skipped = 0;
        let mut stranded = 0;

        for logged in &self.events {
            match logged.event {
                SimEvent::Moved { .. } => moves += 1,
                SimEvent::ObstacleAdded { .. } => added += 1,
                SimEvent::ObstacleReverted { .. } => reverted += 1,
                SimEvent::InjectionSkipped => skipped += 1,
                SimEvent::Stranded { .. } => stranded += 1,
                _ => {}
            }
        }

        let duration = self.events.last().map_or(0, |last| last.timestamp_ms);

        format!(
            "Simulated Duration: {}ms\n\
             Total Events: {}\n\
             Moves: {}\n\
             Injections: {} added, {} reverted, {} skipped\n\
             Stranded: {}",
            duration,
            self.events.len(),
            moves,
            added,
            reverted,
            skipped,
            stranded
        )
    }
}
