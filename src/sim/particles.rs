//! Bounded particle effects
//!
//! Particles are purely visual: they never feed back into gameplay. The pool
//! is sized once from config and spawn requests beyond it follow the
//! configured [`OverflowPolicy`].

use glam::Vec2;
use rand::Rng;

use super::pool::FixedPool;
use crate::color::Rgb;
use crate::config::{OverflowPolicy, ParticleConfig, Span};

/// A single visual particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    /// Pixels/frame
    pub vel: Vec2,
    pub color: Rgb,
    /// Seconds since spawn
    pub age: f32,
    /// Seconds until retirement
    pub lifetime: f32,
    /// Spawn order, used to find the oldest particle
    seq: u64,
}

impl Particle {
    /// Remaining brightness in [0, 1], linear over the lifetime
    pub fn fade(&self) -> f32 {
        (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
    }
}

/// Visual parameters for a radial burst
#[derive(Debug, Clone, Copy)]
pub struct BurstStyle {
    pub colors: [Rgb; 2],
    /// Launch speed, pixels/frame
    pub speed: Span,
    /// Seconds
    pub lifetime: Span,
    /// Center of the spray in radians (screen space, -π/2 is straight up)
    pub direction: f32,
    /// Half-angle of the spray cone, radians
    pub spread: f32,
}

#[derive(Debug, Clone)]
pub struct ParticleSystem {
    pool: FixedPool<Particle>,
    overflow: OverflowPolicy,
    gravity: f32,
    fps: f32,
    next_seq: u64,
}

impl ParticleSystem {
    pub fn new(config: &ParticleConfig, fps: u32) -> Self {
        Self {
            pool: FixedPool::new(config.max_particles),
            overflow: config.overflow,
            gravity: config.gravity,
            fps: fps as f32,
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.pool.values()
    }

    /// Spawn one particle. Returns false if it was dropped.
    pub fn spawn(&mut self, pos: Vec2, vel: Vec2, color: Rgb, lifetime: f32) -> bool {
        if !lifetime.is_finite() || lifetime <= 0.0 || !pos.is_finite() || !vel.is_finite() {
            return false;
        }

        let particle = Particle {
            pos,
            vel,
            color,
            age: 0.0,
            lifetime,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        if self.pool.insert(particle.clone()).is_some() {
            return true;
        }

        match self.overflow {
            OverflowPolicy::Drop => {
                log::trace!("Particle pool full ({}), dropping spawn", self.pool.capacity());
                false
            }
            OverflowPolicy::ReplaceOldest => {
                let oldest = self
                    .pool
                    .iter()
                    .min_by_key(|(_, p)| p.seq)
                    .map(|(id, _)| id);
                match oldest {
                    Some(id) => self.pool.replace(id, particle).is_some(),
                    None => false,
                }
            }
        }
    }

    /// Spray up to `count` particles from `pos`; silently truncated when the
    /// pool runs out. Returns how many were spawned.
    pub fn burst<R: Rng + ?Sized>(
        &mut self,
        pos: Vec2,
        count: usize,
        style: &BurstStyle,
        rng: &mut R,
    ) -> usize {
        let mut spawned = 0;
        for i in 0..count {
            if self.overflow == OverflowPolicy::Drop && self.pool.is_full() {
                break;
            }
            let angle = style.direction + rng.random_range(-1.0f32..=1.0) * style.spread;
            let speed = style.speed.sample(rng);
            let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
            let color = style.colors[i % 2];
            if self.spawn(pos, vel, color, style.lifetime.sample(rng)) {
                spawned += 1;
            }
        }
        if spawned < count {
            log::debug!("Burst truncated: {} of {} particles", spawned, count);
        }
        spawned
    }

    /// Advance every particle by `dt` seconds and retire expired ones
    pub fn update(&mut self, dt: f32) {
        let frames = dt * self.fps;
        let gravity = self.gravity;
        self.pool.retain(|p| {
            p.pos += p.vel * frames;
            p.vel.y += gravity * frames;
            p.age += dt;
            p.age < p.lifetime
        });
    }

    pub fn clear(&mut self) {
        self.pool.clear();
    }
}
