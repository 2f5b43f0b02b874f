//! Per-frame composition
//!
//! Reads the simulation after it has finished updating and paints a complete
//! frame: scenery, wind indicators, the projectile, then particles on top.
//! Nothing here mutates game state.

use glam::Vec2;

use super::display::{DisplaySurface, OutputSink};
use super::shapes::{fill_rect, line, plot, ring_dots};
use crate::color::{Rgb, palette};
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::sim::{GamePhase, GameState, Particle, PlayerId, Projectile, WindZone};

/// Dim factor for the fort of the player who is not throwing
const IDLE_FORT_DIM: f32 = 0.35;
/// Minimum indicator brightness for a dying wind zone
const WIND_MIN_FADE: f32 = 0.25;

pub struct Renderer<S: OutputSink> {
    surface: DisplaySurface<S>,
}

impl<S: OutputSink> Renderer<S> {
    pub fn new(config: &GameConfig, sink: S) -> Result<Self, ConfigError> {
        let surface =
            DisplaySurface::new(config.display.layout.clone(), config.display.brightness, sink)?;
        Ok(Self { surface })
    }

    pub fn surface(&self) -> &DisplaySurface<S> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut DisplaySurface<S> {
        &mut self.surface
    }

    /// Paint and present one frame of `state`
    pub fn render(&mut self, state: &GameState) {
        self.surface.clear();
        self.draw_scenery(state);
        for zone in state.wind.iter() {
            self.draw_wind_zone(zone);
        }
        if let Some(projectile) = state.active_projectile() {
            self.draw_projectile(projectile);
        }
        for particle in state.particles.iter() {
            self.draw_particle(particle);
        }
        self.surface.present();
    }

    fn draw_scenery(&mut self, state: &GameState) {
        let field = state.field();
        let width = self.surface.width() as i32;
        let height = self.surface.height() as i32;
        let ground = field.ground_y.floor() as i32;
        for y in ground..height {
            for x in 0..width {
                let color = if y == ground {
                    palette::SNOW
                } else {
                    palette::GROUND
                };
                self.surface.set_pixel(x, y, color);
            }
        }

        for player in PlayerId::ALL {
            let highlighted = match state.phase {
                GamePhase::GameOver => state.winner == Some(player),
                _ => state.current_player == player,
            };
            let base = palette::PLAYER[player.index()];
            let color = if highlighted {
                base
            } else {
                base.scaled(IDLE_FORT_DIM)
            };
            fill_rect(&mut self.surface, field.fort(player), color);
        }

        self.draw_scores(state);
    }

    /// One pip per point along the top row, from each player's side inward
    fn draw_scores(&mut self, state: &GameState) {
        let width = self.surface.width() as i32;
        for player in PlayerId::ALL {
            for i in 0..state.score(player) as i32 {
                let offset = 1 + i * 2;
                let x = match player {
                    PlayerId::One => offset,
                    PlayerId::Two => width - 1 - offset,
                };
                self.surface.set_pixel(x, 0, palette::SCORE_PIP);
            }
        }
    }

    fn draw_wind_zone(&mut self, zone: &WindZone) {
        let fade = zone.vitality().max(WIND_MIN_FADE);
        ring_dots(&mut self.surface, zone.pos, zone.radius, 8, palette::WIND.scaled(fade));

        let direction = zone.strength.normalize_or_zero();
        if direction != Vec2::ZERO {
            let length = (zone.radius * 0.5).min(4.0);
            line(
                &mut self.surface,
                zone.pos,
                zone.pos + direction * length,
                palette::WIND_ARROW.scaled(fade),
            );
        }
    }

    fn draw_projectile(&mut self, projectile: &Projectile) {
        plot(&mut self.surface, projectile.pos, palette::PROJECTILE);
    }

    fn draw_particle(&mut self, particle: &Particle) {
        let color: Rgb = particle.color.scaled(particle.fade());
        if !color.is_black() {
            plot(&mut self.surface, particle.pos, color);
        }
    }
}
