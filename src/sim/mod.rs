//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time advances only through the `dt` handed to `tick`
//! - Seeded RNG only
//! - Fixed-capacity pools, no growth after construction
//! - No rendering or platform dependencies

pub mod particles;
pub mod physics;
pub mod pool;
pub mod state;
pub mod throw;
pub mod tick;
pub mod wind;

pub use particles::{BurstStyle, Particle, ParticleSystem};
pub use physics::{ImpactCause, PhysicsEngine, PlayField, Projectile, Rect, Termination, launch_velocity};
pub use pool::{FixedPool, SlotId};
pub use state::{GameEvent, GamePhase, GameState, PlayerId};
pub use throw::{AccelSample, ThrowDetector, ThrowEvent};
pub use tick::{TickInput, tick};
pub use wind::{WindZone, WindZoneManager, falloff};
