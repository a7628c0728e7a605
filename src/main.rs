use arboard::Clipboard;
use dynpath::{Config, Position, SimError, SimulationEngine};
use macroquad::prelude::*;
use std::sync::OnceLock;

const PANEL_HEIGHT: f32 = 60.0;

/// Loaded once in `window_conf`, which macroquad runs before `main`
static CONFIG: OnceLock<Config> = OnceLock::new();

fn config() -> &'static Config {
    CONFIG.get_or_init(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        Config::load()
    })
}

/// Visualization state
struct VisState {
    engine: SimulationEngine,
    cell_size: f32,
    event_log_path: Option<String>,
}

impl VisState {
    fn new(config: &Config) -> Result<Self, SimError> {
        let engine = SimulationEngine::new(config.simulation())?;
        Ok(VisState {
            engine,
            cell_size: config.grid.cell_size,
            event_log_path: config
                .logging
                .enable_event_log
                .then(|| config.logging.event_log_path.clone()),
        })
    }

    fn cell_rect(&self, pos: Position, inset: f32) -> (f32, f32, f32) {
        let px = pos.x as f32 * self.cell_size + inset;
        let py = pos.y as f32 * self.cell_size + inset;
        (px, py, self.cell_size - 2.0 * inset)
    }

    fn copy_to_clipboard(&self) {
        let agent = self.engine.agent_position();
        let goal = self.engine.goal();
        let path = self.engine.path();
        let layout = self.engine.grid().render(|pos| {
            if pos == agent {
                Some('s')
            } else if pos == goal {
                Some('g')
            } else if path.contains(&pos) {
                Some('o')
            } else {
                None
            }
        });

        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(&layout) {
                    ::log::warn!("Failed to copy to clipboard: {}", e);
                } else {
                    ::log::info!("Grid layout copied to clipboard");
                    // Keep clipboard alive for a moment so clipboard managers can capture it
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
            Err(e) => ::log::warn!("Failed to access clipboard: {}", e),
        }
    }

    fn save_event_log(&self) {
        if let Some(path) = &self.event_log_path {
            match self.engine.events().save_to_file(path) {
                Ok(()) => ::log::info!("Event log written to {}", path),
                Err(e) => ::log::warn!("Failed to write event log: {}", e),
            }
        }
    }

    fn draw(&self) {
        clear_background(Color::from_rgba(30, 30, 30, 255));
        let grid = self.engine.grid();

        // Checkerboard with obstacles as crates
        for pos in grid.cells() {
            let (px, py, size) = self.cell_rect(pos, 0.0);
            let shade = if (pos.x + pos.y) % 2 == 0 { 40 } else { 50 };
            draw_rectangle(px, py, size, size, Color::from_rgba(shade, shade, shade, 255));

            if grid.is_blocked(pos) {
                let (bx, by, bsize) = self.cell_rect(pos, 2.0);
                draw_rectangle(bx, by, bsize, bsize, Color::from_rgba(139, 69, 19, 255));
                draw_rectangle_lines(bx, by, bsize, bsize, 2.0, Color::from_rgba(160, 82, 45, 255));
            }
        }

        for &pos in self.engine.trail() {
            let (px, py, size) = self.cell_rect(pos, 6.0);
            draw_rectangle(px, py, size, size, Color::from_rgba(100, 149, 237, 255));
        }

        if !self.engine.is_goal_reached() {
            for &pos in self.engine.path() {
                let (px, py, size) = self.cell_rect(pos, 4.0);
                draw_rectangle(px, py, size, size, Color::from_rgba(65, 105, 225, 255));
            }
        }

        let half = self.cell_size / 2.0;
        let goal = self.engine.goal();
        draw_circle(
            goal.x as f32 * self.cell_size + half,
            goal.y as f32 * self.cell_size + half,
            self.cell_size / 3.0,
            Color::from_rgba(220, 20, 60, 255),
        );
        let agent = self.engine.agent_position();
        draw_circle(
            agent.x as f32 * self.cell_size + half,
            agent.y as f32 * self.cell_size + half,
            self.cell_size / 3.0,
            Color::from_rgba(50, 205, 50, 255),
        );

        self.draw_info_panel();

        if self.engine.is_goal_reached() {
            let message = "Goal Reached!";
            let dims = measure_text(message, None, 40, 1.0);
            draw_text(
                message,
                screen_width() / 2.0 - dims.width / 2.0,
                screen_height() / 2.0 - 30.0,
                40.0,
                Color::from_rgba(0, 255, 100, 255),
            );
        }
    }

    fn draw_info_panel(&self) {
        let top = self.engine.grid().rows as f32 * self.cell_size;
        draw_rectangle(0.0, top, screen_width(), PANEL_HEIGHT, Color::from_rgba(20, 20, 20, 255));
        draw_line(0.0, top, screen_width(), top, 2.0, Color::from_rgba(70, 70, 70, 255));

        let stats = self.engine.stats();
        let texts = [
            format!("Steps Taken: {}", stats.steps_taken),
            format!("Obstacles Added: {}", stats.obstacles_added),
            format!("Elapsed Time: {:.1}s", stats.elapsed_ms as f64 / 1000.0),
            "[Space] Obstacle  [C] Copy  [X] Quit".to_string(),
        ];
        for (i, text) in texts.iter().enumerate() {
            draw_text(text, 10.0 + i as f32 * 220.0, top + 35.0, 20.0, Color::from_rgba(230, 230, 230, 255));
        }
    }
}

fn window_conf() -> Conf {
    let config = config();
    Conf {
        window_title: "Dynamic A* Pathfinding - No Stuck Guarantee".to_string(),
        window_width: (config.grid.cols as f32 * config.grid.cell_size) as i32,
        window_height: (config.grid.rows as f32 * config.grid.cell_size + PANEL_HEIGHT) as i32,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let mut state = match VisState::new(config()) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    loop {
        if is_key_pressed(KeyCode::X) || is_key_pressed(KeyCode::Escape) {
            break;
        }

        if is_key_pressed(KeyCode::Space) {
            state.engine.inject_now();
        }

        if is_key_pressed(KeyCode::C) {
            state.copy_to_clipboard();
        }

        let dt_ms = (get_frame_time() * 1000.0).round() as u64;
        state.engine.tick(dt_ms);

        state.draw();

        next_frame().await
    }

    state.save_event_log();
}
