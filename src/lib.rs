//! Snowball Fight - a motion-controlled throwing game on LED panels
//!
//! Core modules:
//! - `sim`: Deterministic simulation (gesture detection, physics, wind, particles, turns)
//! - `renderer`: Frame composition and logical-to-panel pixel mapping
//! - `platform`: Hardware-facing input (motion sensor)
//! - `config`: Startup configuration and validation
//! - `game`: Ties one tick of simulation and rendering together

pub mod color;
pub mod config;
pub mod error;
pub mod game;
pub mod platform;
pub mod renderer;
pub mod sim;

pub use color::Rgb;
pub use config::{GameConfig, OverflowPolicy, ScoringPolicy, Span};
pub use error::ConfigError;
pub use game::Game;

/// Default hardware and tuning constants
pub mod consts {
    /// Single panel dimensions (pixels)
    pub const PANEL_WIDTH: u32 = 32;
    pub const PANEL_HEIGHT: u32 = 32;
    /// Panel grid layout
    pub const PANELS_HORIZONTAL: u32 = 2;
    pub const PANELS_VERTICAL: u32 = 1;
    /// 0-255, lower draws less power
    pub const LED_BRIGHTNESS: u8 = 255;

    /// Base throw power
    pub const MAX_THROW_POWER: f32 = 20.0;
    /// ± degrees from horizontal
    pub const MAX_ANGLE: f32 = 60.0;
    /// Gravity, pixels/frame²
    pub const GRAVITY_EARTH: f32 = 0.15;
    /// G-force threshold to trigger a throw
    pub const THROW_DETECTION_G: f32 = 2.5;
    /// Peak g mapped to MAX_THROW_POWER
    pub const THROW_FULL_SCALE_G: f32 = 6.0;
    /// Launch speed (pixels/frame) per unit of power
    pub const LAUNCH_SPEED_PER_POWER: f32 = 0.15;

    pub const MAX_PARTICLES: usize = 32;
    pub const MAX_WIND_ZONES: usize = 4;
    /// Target frames per second
    pub const FPS: u32 = 60;

    pub const DEFAULT_SEED: u64 = 0x5140_ba11;
}

/// Crate version, logged at startup
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
