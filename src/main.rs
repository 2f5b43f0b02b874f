//! Snowball Fight entry point
//!
//! Headless native runner: loads an optional JSON config, drives the game at
//! the configured frame rate from a scripted demo sensor, and writes frames
//! into an in-memory LED strip.
//!
//! Usage: `snowball-fight [config.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Snowball Fight v{} starting...", snowball_fight::VERSION);

    let path = std::env::args().nth(1);
    if let Err(e) = native::run(path.as_deref()) {
        log::error!("Startup failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No panel hardware on this target
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::thread;
    use std::time::{Duration, Instant};

    use snowball_fight::renderer::{DisplaySurface, StripBuffer};
    use snowball_fight::sim::{AccelSample, GamePhase};
    use snowball_fight::{ConfigError, Game, GameConfig, Rgb};

    /// Stop the demo after this many simulated seconds even without a winner
    const DEMO_SECONDS: u32 = 300;
    /// Seconds between demo throws
    const THROW_PERIOD: f32 = 2.5;
    /// Ticks each demo gesture is held
    const GESTURE_TICKS: u32 = 12;

    /// Demo throws, cycled: (forward g, vertical g)
    const GESTURES: [(f32, f32); 4] = [(4.0, 2.2), (5.2, 2.6), (3.2, 1.4), (4.6, 3.0)];

    pub fn run(path: Option<&str>) -> Result<(), ConfigError> {
        let config = match path {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };

        let sink = StripBuffer::new(config.display.layout.led_count());
        let mut game = Game::new(&config, demo_sensor(config.fps), sink)?;

        let budget = config.frame_budget();
        let dt = config.frame_dt();
        let max_ticks = u64::from(DEMO_SECONDS) * u64::from(config.fps);
        let mut overruns = 0u64;
        let mut worst = Duration::ZERO;

        for _ in 0..max_ticks {
            let start = Instant::now();
            game.tick(dt);

            let elapsed = start.elapsed();
            worst = worst.max(elapsed);
            if elapsed > budget {
                overruns += 1;
                log::warn!(
                    "Frame took {:.2}ms, budget {:.2}ms",
                    elapsed.as_secs_f64() * 1000.0,
                    budget.as_secs_f64() * 1000.0
                );
            } else {
                thread::sleep(budget - elapsed);
            }

            if game.state().phase() == GamePhase::GameOver {
                break;
            }
        }

        let state = game.state();
        match state.winner() {
            Some(winner) => log::info!(
                "Player {:?} wins {}-{} after {} turns",
                winner,
                state.scores()[0],
                state.scores()[1],
                state.turn()
            ),
            None => log::info!(
                "Demo ended without a winner: {}-{} after {} turns",
                state.scores()[0],
                state.scores()[1],
                state.turn()
            ),
        }
        log::info!(
            "{} ticks, {} over budget, worst frame {:.2}ms",
            state.time_ticks(),
            overruns,
            worst.as_secs_f64() * 1000.0
        );

        println!("{}", snapshot(game.renderer().surface()));
        Ok(())
    }

    /// Periodic synthetic throws separated by rest readings
    fn demo_sensor(fps: u32) -> impl FnMut() -> Option<AccelSample> {
        let period = ((THROW_PERIOD * fps as f32) as u32).max(GESTURE_TICKS + 1);
        let mut tick = 0u32;
        let mut throws = 0usize;
        move || {
            let phase = tick % period;
            tick = tick.wrapping_add(1);
            if phase >= period - GESTURE_TICKS {
                let (forward, up) = GESTURES[throws % GESTURES.len()];
                if phase == period - 1 {
                    throws += 1;
                }
                Some(AccelSample::new(forward, 0.0, up))
            } else {
                Some(AccelSample::REST)
            }
        }
    }

    /// Text rendering of the logical frame, one character per pixel
    fn snapshot(surface: &DisplaySurface<StripBuffer>) -> String {
        let width = surface.width() as usize;
        let mut out = String::with_capacity((width + 1) * surface.height() as usize);
        for row in surface.buffer().chunks(width) {
            out.extend(row.iter().map(glyph));
            out.push('\n');
        }
        out
    }

    fn glyph(color: &Rgb) -> char {
        let level = u16::from(color.r) + u16::from(color.g) + u16::from(color.b);
        match level {
            0 => '.',
            1..=191 => ':',
            192..=447 => '+',
            _ => '#',
        }
    }
}
