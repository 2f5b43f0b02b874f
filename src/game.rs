//! Host-facing game driver
//!
//! Owns the simulation, the renderer and the sensor, and runs them in the
//! fixed per-tick order: sample sensor, simulate, render.

use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::platform::AccelSensor;
use crate::renderer::{OutputSink, Renderer};
use crate::sim::{self, GameState, TickInput};

pub struct Game<A: AccelSensor, S: OutputSink> {
    state: GameState,
    renderer: Renderer<S>,
    sensor: A,
}

impl<A: AccelSensor, S: OutputSink> Game<A, S> {
    /// Validates `config` and builds every subsystem. Nothing is ticked yet.
    pub fn new(config: &GameConfig, sensor: A, sink: S) -> Result<Self, ConfigError> {
        let state = GameState::new(config)?;
        let renderer = Renderer::new(config, sink)?;
        log::info!(
            "Game ready: {}x{} field, {} FPS, seed {:#x}",
            config.game_width(),
            config.game_height(),
            config.fps,
            config.seed
        );
        Ok(Self {
            state,
            renderer,
            sensor,
        })
    }

    /// Run one full tick of `dt` seconds and present the resulting frame
    pub fn tick(&mut self, dt: f32) {
        let input = TickInput {
            sample: self.sensor.poll(),
            reset: false,
        };
        sim::tick(&mut self.state, &input, dt);
        self.renderer.render(&self.state);
    }

    /// Abandon the current game. Takes effect immediately; the panel shows
    /// the cleared field without waiting for the next tick.
    pub fn reset(&mut self) {
        sim::tick(
            &mut self.state,
            &TickInput {
                sample: None,
                reset: true,
            },
            0.0,
        );
        self.renderer.render(&self.state);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn renderer(&self) -> &Renderer<S> {
        &self.renderer
    }

    pub fn sensor_mut(&mut self) -> &mut A {
        &mut self.sensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ScriptedSensor;
    use crate::renderer::StripBuffer;
    use crate::sim::{AccelSample, GameEvent, GamePhase, ImpactCause, Termination, WindZone};
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn game() -> Game<ScriptedSensor, StripBuffer> {
        let mut config = GameConfig::default();
        config.wind.spawn_rate = 0.0;
        let sink = StripBuffer::new(config.display.layout.led_count());
        Game::new(&config, ScriptedSensor::new(), sink).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = GameConfig::default();
        config.fps = 0;
        let result = Game::new(&config, ScriptedSensor::new(), StripBuffer::new(0));
        assert!(result.is_err());
    }

    #[test]
    fn test_tick_presents_each_frame() {
        let mut game = game();
        for _ in 0..3 {
            game.tick(DT);
        }
        assert_eq!(game.renderer().surface().sink().frames(), 3);
        assert_eq!(game.state().phase, GamePhase::Aiming);
    }

    #[test]
    fn test_sensor_throw_launches() {
        let mut game = game();
        game.tick(DT);
        game.sensor_mut()
            .push_gesture(AccelSample::new(4.0, 0.0, 2.0), 12)
            .push_rest(10);
        for _ in 0..12 {
            game.tick(DT);
        }
        assert!(matches!(
            game.state().phase,
            GamePhase::ThrowDetected | GamePhase::InFlight
        ));
        game.tick(DT);
        assert_eq!(game.state().phase, GamePhase::InFlight);
    }

    #[test]
    fn test_reset_is_immediate() {
        let mut game = game();
        game.tick(DT);
        game.state.scores = [3, 1];
        game.reset();
        assert_eq!(game.state().phase, GamePhase::WaitingForPlayer);
        assert_eq!(game.state().scores, [0, 0]);
        assert_eq!(game.state().events(), &[GameEvent::Reset]);
        assert_eq!(game.renderer().surface().sink().frames(), 2);
    }

    /// Lob from player One; returns the reported landing
    fn lob(headwind: Option<Vec2>) -> Termination {
        let mut game = game();
        if let Some(strength) = headwind {
            let zone = WindZone::new(Vec2::new(32.0, 16.0), 100.0, strength, 1000.0);
            assert!(game.state.wind.spawn(zone));
        }
        game.tick(DT);
        game.sensor_mut().push_gesture(AccelSample::new(3.0, 0.0, 1.5), 12);
        for _ in 0..2000 {
            game.tick(DT);
            let impact = game.state().events().iter().find_map(|e| match e {
                GameEvent::Impact(t) => Some(*t),
                _ => None,
            });
            if let Some(t) = impact {
                return t;
            }
        }
        panic!("flight never ended");
    }

    #[test]
    fn test_headwind_shortens_range() {
        let calm = lob(None);
        let windy = lob(Some(Vec2::new(-0.02, 0.0)));
        assert_eq!(calm.cause, ImpactCause::Ground);
        assert_eq!(windy.cause, ImpactCause::Ground);
        assert!(
            windy.pos.x < calm.pos.x,
            "headwind {} vs calm {}",
            windy.pos.x,
            calm.pos.x
        );
    }
}
