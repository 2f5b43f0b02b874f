//! Projectile flight
//!
//! Semi-implicit Euler over per-frame units: gravity and wind are applied to
//! the velocity first, then the position advances with the new velocity.
//! A tick whose travel would exceed half the smaller fort dimension is split
//! into sub-steps so a fast shot cannot jump over a fort between samples.
//! One projectile at most is ever in the air.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::PlayerId;
use super::throw::ThrowEvent;
use super::wind::WindZoneManager;
use crate::config::{GameConfig, PhysicsConfig};

/// Upper bound on sub-steps within one tick
const MAX_SUBSTEPS: u32 = 32;

/// Axis-aligned rectangle in logical pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

/// Static geometry of the playing field
#[derive(Debug, Clone, PartialEq)]
pub struct PlayField {
    pub width: f32,
    pub height: f32,
    /// Top edge of the ground; anything below has landed
    pub ground_y: f32,
    /// Fort (launch point and hit region) per player
    pub forts: [Rect; 2],
}

impl PlayField {
    pub fn from_config(config: &GameConfig) -> Self {
        let width = config.game_width() as f32;
        let height = config.game_height() as f32;
        let rules = &config.rules;
        let ground_y = height - rules.ground_height as f32;
        let fort_w = rules.fort_width as f32;
        let fort_h = rules.fort_height as f32;
        let inset = rules.fort_inset as f32;

        let left = Rect::new(
            Vec2::new(inset, ground_y - fort_h),
            Vec2::new(inset + fort_w, ground_y),
        );
        let right = Rect::new(
            Vec2::new(width - inset - fort_w, ground_y - fort_h),
            Vec2::new(width - inset, ground_y),
        );

        Self {
            width,
            height,
            ground_y,
            forts: [left, right],
        }
    }

    pub fn fort(&self, player: PlayerId) -> &Rect {
        &self.forts[player.index()]
    }

    /// Where `player`'s snowball leaves from: just above their fort
    pub fn launch_point(&self, player: PlayerId) -> Vec2 {
        let fort = self.fort(player);
        Vec2::new(fort.center().x, fort.min.y - 1.0)
    }
}

/// Initial velocity (pixels/frame) for a throw. Player One throws right,
/// player Two throws left; positive angles go up the screen.
pub fn launch_velocity(player: PlayerId, event: &ThrowEvent, physics: &PhysicsConfig) -> Vec2 {
    let speed = event.power * physics.launch_speed_per_power;
    let angle = event.angle.to_radians();
    Vec2::new(player.facing() * speed * angle.cos(), -speed * angle.sin())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub pos: Vec2,
    /// Pixels/frame
    pub vel: Vec2,
    pub owner: PlayerId,
    pub active: bool,
}

/// Why a flight ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactCause {
    /// Landed on the ground
    Ground,
    /// Left the field horizontally
    OutOfBounds,
    /// Struck the opposing fort
    Hit { target: PlayerId },
}

/// Termination report handed to the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Termination {
    pub cause: ImpactCause,
    pub pos: Vec2,
    pub owner: PlayerId,
}

#[derive(Debug, Clone)]
pub struct PhysicsEngine {
    projectile: Option<Projectile>,
    field: PlayField,
    gravity: f32,
    fps: f32,
    /// Longest distance (pixels) covered by one sub-step
    max_travel: f32,
}

impl PhysicsEngine {
    pub fn new(field: PlayField, physics: &PhysicsConfig, fps: u32) -> Self {
        let smallest = field
            .forts
            .iter()
            .map(|f| (f.max.x - f.min.x).min(f.max.y - f.min.y))
            .fold(f32::INFINITY, f32::min);
        Self {
            projectile: None,
            field,
            gravity: physics.gravity,
            fps: fps as f32,
            max_travel: (smallest * 0.5).max(0.25),
        }
    }

    pub fn field(&self) -> &PlayField {
        &self.field
    }

    /// The projectile currently in the air, if any
    pub fn active_projectile(&self) -> Option<&Projectile> {
        self.projectile.as_ref().filter(|p| p.active)
    }

    pub fn is_active(&self) -> bool {
        self.active_projectile().is_some()
    }

    /// Put a new projectile in the air. Refused while another is active.
    pub fn launch(&mut self, owner: PlayerId, pos: Vec2, vel: Vec2) -> bool {
        if self.is_active() {
            log::warn!("Launch refused: a projectile is already in flight");
            return false;
        }
        self.projectile = Some(Projectile {
            pos,
            vel,
            owner,
            active: true,
        });
        true
    }

    /// Remove any projectile, active or spent
    pub fn clear(&mut self) {
        self.projectile = None;
    }

    /// Advance the active projectile by `dt` seconds. Returns a report when
    /// the flight ends; the projectile is deactivated at that point.
    pub fn integrate(&mut self, dt: f32, wind: &WindZoneManager) -> Option<Termination> {
        let projectile = self.projectile.as_mut().filter(|p| p.active)?;
        let frames = dt * self.fps;

        // Estimate this tick's travel including the velocity gained on the way
        let accel = self.gravity.abs() + wind.force_at(projectile.pos).length();
        let gained = accel * frames;
        let travel = (projectile.vel.length() + gained) * frames;
        let substeps = ((travel / self.max_travel).ceil() as u32).clamp(1, MAX_SUBSTEPS);
        let step = frames / substeps as f32;

        for _ in 0..substeps {
            let prev = projectile.pos;
            projectile.vel.y += self.gravity * step;
            projectile.vel += wind.force_at(projectile.pos) * step;
            projectile.pos += projectile.vel * step;

            let Some(cause) = classify(&self.field, projectile.owner, prev, &mut projectile.pos)
            else {
                continue;
            };
            projectile.active = false;
            log::debug!(
                "Flight ended: {:?} at ({:.1}, {:.1})",
                cause,
                projectile.pos.x,
                projectile.pos.y
            );
            return Some(Termination {
                cause,
                pos: projectile.pos,
                owner: projectile.owner,
            });
        }
        None
    }
}

/// Termination checks in priority order. A ground landing is pulled back
/// onto the ground line along the last step.
fn classify(field: &PlayField, owner: PlayerId, prev: Vec2, pos: &mut Vec2) -> Option<ImpactCause> {
    if pos.y > field.ground_y {
        let dy = pos.y - prev.y;
        if dy > 0.0 && prev.y <= field.ground_y {
            let t = (field.ground_y - prev.y) / dy;
            *pos = prev + (*pos - prev) * t;
        }
        return Some(ImpactCause::Ground);
    }
    if pos.x < 0.0 || pos.x > field.width {
        return Some(ImpactCause::OutOfBounds);
    }
    let target = owner.opponent();
    if field.fort(target).contains(*pos) {
        return Some(ImpactCause::Hit { target });
    }
    None
}
