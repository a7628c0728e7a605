//! Headless runner for the replanning simulation
//!
//! Drives the engine with fixed synthetic ticks until the agent reaches the
//! goal or the tick budget runs out, then prints a summary.
//!
//! Usage: headless [config.toml]

use dynpath::{Config, SimulationEngine};
use log::{error, info};
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => match Config::from_path(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::load(),
    };

    let mut engine = match SimulationEngine::new(config.simulation()) {
        Ok(engine) => engine,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Running from {} to {}", engine.start(), engine.goal());

    let tick_ms = config.simulation.headless_tick_ms;
    let mut ticks = 0;
    while !engine.is_goal_reached() && ticks < config.simulation.headless_max_ticks {
        engine.tick(tick_ms);
        ticks += 1;
    }

    let stats = engine.stats();
    println!("=== Simulation finished after {} ticks ===", ticks);
    match serde_json::to_string_pretty(&stats) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize stats: {}", e),
    }
    if log::log_enabled!(log::Level::Debug) {
        engine.events().print();
    }
    println!("\n{}", engine.events().summary());

    if config.logging.enable_event_log {
        let path = &config.logging.event_log_path;
        match engine.events().save_to_file(path) {
            Ok(()) => info!("Event log written to {}", path),
            Err(e) => error!("Failed to write event log: {}", e),
        }
    }

    if stats.goal_reached {
        ExitCode::SUCCESS
    } else {
        error!("Goal not reached within {} ticks", config.simulation.headless_max_ticks);
        ExitCode::FAILURE
    }
}
