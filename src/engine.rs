//! Tick-driven simulation engine.
//!
//! The engine exclusively owns the grid, the planned path and the agent.
//! A driver calls [`SimulationEngine::tick`] with elapsed wall-clock (or
//! synthetic) milliseconds and reads state back between ticks. Two
//! independent accumulators gate agent movement and obstacle injection.

use crate::agent::Agent;
use crate::error::{Result, SimError};
use crate::event_log::{EventLog, SimEvent};
use crate::injector::{InjectionOutcome, ObstacleInjector};
use crate::pathfinding::{find_path, Position};
use crate::GridMap;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::VecDeque;

/// Engine parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub cols: i32,
    pub rows: i32,
    pub start: Position,
    pub goal: Position,
    pub initial_obstacles: usize,
    pub settings: EngineSettings,
    /// Fixed seed for reproducible runs; entropy when `None`
    pub seed: Option<u64>,
}

/// Tick cadence and injection policy
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub move_interval_ms: u64,
    pub obstacle_interval_ms: u64,
    pub steps_per_move: usize,
    pub validate_off_path: bool,
    pub record_events: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            move_interval_ms: 375,
            obstacle_interval_ms: 2000,
            steps_per_move: 1,
            validate_off_path: true,
            record_events: true,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            cols: 40,
            rows: 20,
            start: Position::new(0, 0),
            goal: Position::new(39, 19),
            initial_obstacles: 150,
            settings: EngineSettings::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Planning,
    Moving,
    GoalReached,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub steps: usize,
    pub injection: Option<InjectionOutcome>,
    pub goal_reached: bool,
}

/// Counters exposed to drivers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimStats {
    pub steps_taken: usize,
    pub obstacles_added: usize,
    pub injections_accepted: usize,
    pub injections_reverted: usize,
    pub injections_skipped: usize,
    pub elapsed_ms: u64,
    pub path_len: usize,
    pub goal_reached: bool,
}

pub struct SimulationEngine {
    grid: GridMap,
    start: Position,
    path: VecDeque<Position>,
    agent: Agent,
    injector: ObstacleInjector,
    settings: EngineSettings,
    rng: StdRng,
    phase: Phase,
    move_timer: u64,
    obstacle_timer: u64,
    elapsed_ms: u64,
    obstacles_added: usize,
    injections_reverted: usize,
    injections_skipped: usize,
    injections_accepted: usize,
    events: EventLog,
}

impl SimulationEngine {
    /// Build a random grid from `config` and plan the initial route
    pub fn new(config: SimulationConfig) -> Result<Self> {
        if config.cols <= 0 || config.rows <= 0 {
            return Err(SimError::InvalidConfig(format!(
                "grid must be non-empty, got {}x{}",
                config.cols, config.rows
            )));
        }
        if config.cols.checked_mul(config.rows).is_none() {
            return Err(SimError::InvalidConfig(format!(
                "grid of {}x{} cells is too large",
                config.cols, config.rows
            )));
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut grid = GridMap::new(config.cols, config.rows);
        check_in_bounds(&grid, config.start, "start")?;
        check_in_bounds(&grid, config.goal, "goal")?;
        grid.protect(config.start);
        grid.protect(config.goal);

        let placed = grid.populate_random(&mut rng, config.initial_obstacles, &[]);
        if placed < config.initial_obstacles {
            warn!(
                "Requested {} initial obstacles, only {} cells were available",
                config.initial_obstacles, placed
            );
        }

        Self::with_grid(grid, config.start, config.goal, config.settings, rng)
    }

    /// Start a simulation on a prepared grid.
    ///
    /// Start and goal are protected on the grid, so both are free from here on.
    /// Every blocked cell already on the grid counts as an added obstacle.
    pub fn with_grid(
        mut grid: GridMap,
        start: Position,
        goal: Position,
        settings: EngineSettings,
        rng: StdRng,
    ) -> Result<Self> {
        check_in_bounds(&grid, start, "start")?;
        check_in_bounds(&grid, goal, "goal")?;
        grid.protect(start);
        grid.protect(goal);

        let agent = Agent::new(start, goal);
        let mut engine = SimulationEngine {
            obstacles_added: grid.blocked_count(),
            grid,
            start,
            path: VecDeque::new(),
            agent,
            injector: ObstacleInjector::new(goal, settings.validate_off_path),
            events: EventLog::new(settings.record_events),
            settings,
            rng,
            phase: Phase::Planning,
            move_timer: 0,
            obstacle_timer: 0,
            elapsed_ms: 0,
            injections_reverted: 0,
            injections_skipped: 0,
            injections_accepted: 0,
        };
        engine.plan()?;
        Ok(engine)
    }

    fn plan(&mut self) -> Result<()> {
        let start = self.agent.position;
        let goal = self.injector.goal();

        if self.agent.is_goal_reached() {
            info!("Start {} is the goal, nothing to plan", start);
            self.phase = Phase::GoalReached;
            self.events.log(0, SimEvent::GoalReached { steps: 0 });
            return Ok(());
        }

        let path = find_path(&self.grid, start, goal);
        if path.is_empty() {
            return Err(SimError::UnreachableAtStart { start, goal });
        }

        info!(
            "Planned initial path {} -> {}: {} steps, {} obstacles on grid",
            start,
            goal,
            path.len(),
            self.obstacles_added
        );
        self.events.log(0, SimEvent::Planned { path_len: path.len() });
        self.path = path.into();
        self.phase = Phase::Moving;
        Ok(())
    }

    /// Advance both timers by `elapsed_ms` and fire whichever exceed their interval.
    ///
    /// Movement fires before injection; an agent arriving at the goal this
    /// tick suppresses the injection.
    pub fn tick(&mut self, elapsed_ms: u64) -> TickReport {
        let mut report = TickReport::default();
        if self.phase == Phase::GoalReached {
            report.goal_reached = true;
            return report;
        }

        self.elapsed_ms += elapsed_ms;
        self.move_timer += elapsed_ms;
        self.obstacle_timer += elapsed_ms;

        if self.move_timer > self.settings.move_interval_ms {
            report.steps = self.advance_agent();
            self.move_timer = 0;
        }

        if self.phase == Phase::GoalReached {
            report.goal_reached = true;
            return report;
        }

        if self.obstacle_timer > self.settings.obstacle_interval_ms {
            report.injection = Some(self.inject_now());
            self.obstacle_timer = 0;
        }

        report
    }

    fn advance_agent(&mut self) -> usize {
        let mut moved = 0;
        for _ in 0..self.settings.steps_per_move {
            if !self.agent.step(&mut self.path) {
                break;
            }
            moved += 1;
            self.events.log(
                self.elapsed_ms,
                SimEvent::moved(self.agent.position, self.agent.steps_taken),
            );
        }

        if self.agent.is_goal_reached() {
            info!(
                "Goal {} reached after {} steps and {}ms",
                self.agent.goal, self.agent.steps_taken, self.elapsed_ms
            );
            self.phase = Phase::GoalReached;
            self.events.log(
                self.elapsed_ms,
                SimEvent::GoalReached {
                    steps: self.agent.steps_taken,
                },
            );
        }
        moved
    }

    /// Attempt one obstacle injection immediately, independent of the timer.
    ///
    /// Suspended once the goal is reached.
    pub fn inject_now(&mut self) -> InjectionOutcome {
        if self.phase == Phase::GoalReached {
            return InjectionOutcome::Skipped;
        }

        let (path, outcome) = self.injector.inject(
            &mut self.grid,
            &mut self.rng,
            self.agent.position,
            &self.path,
        );
        self.adopt(path, outcome);
        outcome
    }

    /// Attempt to place an obstacle at `cell`, with the same validation as
    /// random injection.
    pub fn inject_at(&mut self, cell: Position) -> InjectionOutcome {
        if self.phase == Phase::GoalReached {
            return InjectionOutcome::Skipped;
        }

        let (path, outcome) = self.injector.inject_at(&mut self.grid, self.agent.position, cell);
        self.adopt(path, outcome);
        outcome
    }

    fn adopt(&mut self, path: Vec<Position>, outcome: InjectionOutcome) {
        let event = match outcome {
            InjectionOutcome::Accepted { cell } => {
                self.obstacles_added += 1;
                self.injections_accepted += 1;
                SimEvent::ObstacleAdded {
                    x: cell.x,
                    y: cell.y,
                    path_len: path.len(),
                }
            }
            InjectionOutcome::Reverted { cell } => {
                self.injections_reverted += 1;
                SimEvent::ObstacleReverted { x: cell.x, y: cell.y }
            }
            InjectionOutcome::Skipped => {
                self.injections_skipped += 1;
                SimEvent::InjectionSkipped
            }
        };
        self.events.log(self.elapsed_ms, event);

        if path.is_empty() && self.agent.position != self.agent.goal {
            warn!("Agent at {} has no route to the goal", self.agent.position);
            self.events.log(
                self.elapsed_ms,
                SimEvent::Stranded {
                    x: self.agent.position.x,
                    y: self.agent.position.y,
                },
            );
        }
        debug!("Adopted path of {} cells after {:?}", path.len(), outcome);
        self.path = path.into();
    }

    pub fn grid(&self) -> &GridMap {
        &self.grid
    }

    pub fn path(&self) -> &VecDeque<Position> {
        &self.path
    }

    pub fn agent_position(&self) -> Position {
        self.agent.position
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.agent.goal
    }

    pub fn trail(&self) -> &[Position] {
        &self.agent.trail
    }

    pub fn steps_taken(&self) -> usize {
        self.agent.steps_taken
    }

    pub fn obstacles_added(&self) -> usize {
        self.obstacles_added
    }

    pub fn is_goal_reached(&self) -> bool {
        self.phase == Phase::GoalReached
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn stats(&self) -> SimStats {
        SimStats {
            steps_taken: self.agent.steps_taken,
            obstacles_added: self.obstacles_added,
            injections_accepted: self.injections_accepted,
            injections_reverted: self.injections_reverted,
            injections_skipped: self.injections_skipped,
            elapsed_ms: self.elapsed_ms,
            path_len: self.path.len(),
            goal_reached: self.is_goal_reached(),
        }
    }
}

fn check_in_bounds(grid: &GridMap, cell: Position, what: &str) -> Result<()> {
    if grid.in_bounds(cell) {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(format!(
            "{} {} is outside the {}x{} grid",
            what, cell, grid.cols, grid.rows
        )))
    }
}
