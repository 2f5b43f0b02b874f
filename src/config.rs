//! Startup configuration
//!
//! Fixed once the engine is built. Loaded from JSON (every section optional,
//! missing fields fall back to the hardware defaults in [`crate::consts`]).

use std::path::Path;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::renderer::PanelLayout;

/// Closed interval used for randomized spawn parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform sample in `[min, max]`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.random_range(self.min..=self.max)
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ConfigError::InvalidValue {
                field,
                value: if self.min.is_finite() { self.max } else { self.min },
            });
        }
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// What the particle pool does when every slot is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// New spawn requests are ignored
    #[default]
    Drop,
    /// The oldest live particle is overwritten
    ReplaceOldest,
}

/// How a finished flight is scored
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Only direct hits score
    #[default]
    HitsOnly,
    /// Direct hits score in full; misses earn up to `max_points` depending on
    /// how close they landed to the opposing fort
    DistanceBonus { max_points: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub layout: PanelLayout,
    /// Global LED brightness (0-255), applied when the frame is presented
    pub brightness: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            layout: PanelLayout::default(),
            brightness: LED_BRIGHTNESS,
        }
    }
}

/// Projectile tuning. Per-frame units (see [`GameConfig::fps`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration, pixels/frame²
    pub gravity: f32,
    pub max_throw_power: f32,
    /// Launch angle clamp, ± degrees from horizontal
    pub max_angle_deg: f32,
    /// Launch speed (pixels/frame) per unit of throw power
    pub launch_speed_per_power: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY_EARTH,
            max_throw_power: MAX_THROW_POWER,
            max_angle_deg: MAX_ANGLE,
            launch_speed_per_power: LAUNCH_SPEED_PER_POWER,
        }
    }
}

/// Gesture recognition tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrowConfig {
    /// Smoothed magnitude (g) that opens a capture window
    pub detection_g: f32,
    /// Peak magnitude (g) mapped to full power
    pub full_scale_g: f32,
    /// Samples averaged into the rolling magnitude
    pub smoothing_samples: usize,
    /// Capture window length, seconds
    pub capture_window: f32,
    /// Time above threshold required for a valid gesture, seconds
    pub min_duration: f32,
    /// Dead time after an emitted throw, seconds
    pub cooldown: f32,
}

impl Default for ThrowConfig {
    fn default() -> Self {
        Self {
            detection_g: THROW_DETECTION_G,
            full_scale_g: THROW_FULL_SCALE_G,
            smoothing_samples: 3,
            capture_window: 0.15,
            min_duration: 0.05,
            cooldown: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    pub max_zones: usize,
    /// Expected spawns per second while below capacity
    pub spawn_rate: f32,
    /// Zone radius, pixels
    pub radius: Span,
    /// Peak force magnitude at the zone center, pixels/frame²
    pub strength: Span,
    /// Zone lifetime, seconds
    pub lifetime: Span,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            max_zones: MAX_WIND_ZONES,
            spawn_rate: 0.25,
            radius: Span::new(6.0, 14.0),
            strength: Span::new(0.004, 0.02),
            lifetime: Span::new(3.0, 8.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub max_particles: usize,
    pub overflow: OverflowPolicy,
    /// Downward acceleration applied to particles, pixels/frame²
    pub gravity: f32,
    pub hit_burst: usize,
    pub ground_burst: usize,
    pub out_of_bounds_burst: usize,
    /// Seconds between trail particles during flight (0 disables the trail)
    pub trail_interval: f32,
    pub trail_lifetime: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            max_particles: MAX_PARTICLES,
            overflow: OverflowPolicy::Drop,
            gravity: GRAVITY_EARTH * 0.5,
            hit_burst: 24,
            ground_burst: 12,
            out_of_bounds_burst: 6,
            trail_interval: 0.05,
            trail_lifetime: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub win_score: u32,
    pub points_per_hit: u32,
    pub scoring: ScoringPolicy,
    /// Seconds spent in Impact before scoring
    pub impact_hold: f32,
    /// Seconds spent in RoundScoring before the next turn
    pub score_hold: f32,
    /// Rows of ground at the bottom of the field
    pub ground_height: u32,
    pub fort_width: u32,
    pub fort_height: u32,
    /// Distance from the field edge to each fort
    pub fort_inset: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            win_score: 5,
            points_per_hit: 1,
            scoring: ScoringPolicy::HitsOnly,
            impact_hold: 0.75,
            score_hold: 1.0,
            ground_height: 2,
            fort_width: 4,
            fort_height: 6,
            fort_inset: 3,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub display: DisplayConfig,
    pub physics: PhysicsConfig,
    pub throw: ThrowConfig,
    pub wind: WindConfig,
    pub particles: ParticleConfig,
    pub rules: RulesConfig,
    /// Target frame rate; also the unit conversion for per-frame physics
    pub fps: u32,
    /// RNG seed for wind and particle jitter
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            physics: PhysicsConfig::default(),
            throw: ThrowConfig::default(),
            wind: WindConfig::default(),
            particles: ParticleConfig::default(),
            rules: RulesConfig::default(),
            fps: FPS,
            seed: DEFAULT_SEED,
        }
    }
}

impl GameConfig {
    /// Parse a JSON document; absent fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Play-field width in logical pixels
    pub fn game_width(&self) -> u32 {
        self.display.layout.width()
    }

    /// Play-field height in logical pixels
    pub fn game_height(&self) -> u32 {
        self.display.layout.height()
    }

    /// Nominal frame period in seconds
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }

    /// Wall-clock budget for one tick
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }

    /// Reject configurations the engine cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.display.layout.validate()?;

        if self.fps == 0 {
            return Err(ConfigError::InvalidDimension {
                field: "fps",
                value: 0,
            });
        }

        let p = &self.physics;
        positive("physics.gravity", p.gravity)?;
        positive("physics.max_throw_power", p.max_throw_power)?;
        positive("physics.launch_speed_per_power", p.launch_speed_per_power)?;
        if !p.max_angle_deg.is_finite() || p.max_angle_deg <= 0.0 || p.max_angle_deg >= 90.0 {
            return Err(ConfigError::InvalidValue {
                field: "physics.max_angle_deg",
                value: p.max_angle_deg,
            });
        }

        let t = &self.throw;
        positive("throw.detection_g", t.detection_g)?;
        positive("throw.full_scale_g", t.full_scale_g)?;
        positive("throw.capture_window", t.capture_window)?;
        non_negative("throw.min_duration", t.min_duration)?;
        non_negative("throw.cooldown", t.cooldown)?;
        if t.smoothing_samples == 0 {
            return Err(ConfigError::ZeroCapacity("throw.smoothing_samples"));
        }
        if t.min_duration > t.capture_window {
            return Err(ConfigError::InvertedRange {
                field: "throw.min_duration..capture_window",
                min: t.min_duration,
                max: t.capture_window,
            });
        }

        let w = &self.wind;
        if w.max_zones == 0 {
            return Err(ConfigError::ZeroCapacity("wind.max_zones"));
        }
        non_negative("wind.spawn_rate", w.spawn_rate)?;
        w.radius.validate("wind.radius")?;
        w.strength.validate("wind.strength")?;
        w.lifetime.validate("wind.lifetime")?;
        positive("wind.radius.min", w.radius.min)?;
        positive("wind.lifetime.min", w.lifetime.min)?;

        let pc = &self.particles;
        if pc.max_particles == 0 {
            return Err(ConfigError::ZeroCapacity("particles.max_particles"));
        }
        non_negative("particles.gravity", pc.gravity)?;
        non_negative("particles.trail_interval", pc.trail_interval)?;
        non_negative("particles.trail_lifetime", pc.trail_lifetime)?;

        let r = &self.rules;
        if r.win_score == 0 {
            return Err(ConfigError::InvalidDimension {
                field: "rules.win_score",
                value: 0,
            });
        }
        non_negative("rules.impact_hold", r.impact_hold)?;
        non_negative("rules.score_hold", r.score_hold)?;
        for (field, value) in [
            ("rules.fort_width", r.fort_width),
            ("rules.fort_height", r.fort_height),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidDimension { field, value });
            }
        }
        // Both forts and the ground have to fit inside the field
        let width = self.game_width();
        let height = self.game_height();
        if 2 * (r.fort_inset + r.fort_width) >= width {
            return Err(ConfigError::InvalidDimension {
                field: "rules.fort_width",
                value: r.fort_width,
            });
        }
        if r.ground_height + r.fort_height >= height {
            return Err(ConfigError::InvalidDimension {
                field: "rules.fort_height",
                value: r.fort_height,
            });
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_hardware_header() {
        let config = GameConfig::default();
        assert_eq!(config.game_width(), 64);
        assert_eq!(config.game_height(), 32);
        assert_eq!(config.particles.max_particles, 32);
        assert_eq!(config.wind.max_zones, 4);
        assert_eq!(config.fps, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = GameConfig::from_json_str(
            r#"{ "fps": 30, "display": { "layout": { "panels_horizontal": 4 } } }"#,
        )
        .unwrap();
        assert_eq!(config.fps, 30);
        assert_eq!(config.game_width(), 128);
        assert_eq!(config.physics.max_throw_power, MAX_THROW_POWER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_policy_serialization() {
        let config = GameConfig::from_json_str(
            r#"{
                "particles": { "overflow": "replace_oldest" },
                "rules": { "scoring": { "kind": "distance_bonus", "max_points": 2 } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.particles.overflow, OverflowPolicy::ReplaceOldest);
        assert_eq!(
            config.rules.scoring,
            ScoringPolicy::DistanceBonus { max_points: 2 }
        );
    }

    #[test]
    fn test_rejects_zero_capacities() {
        let mut config = GameConfig::default();
        config.particles.max_particles = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroCapacity("particles.max_particles"))
        ));

        let mut config = GameConfig::default();
        config.wind.max_zones = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroCapacity("wind.max_zones"))
        ));
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        let mut config = GameConfig::default();
        config.display.layout.panel_width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimension { .. })
        ));

        let mut config = GameConfig::default();
        config.fps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_physics() {
        let mut config = GameConfig::default();
        config.physics.gravity = -1.0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.physics.max_throw_power = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.wind.radius = Span::new(10.0, 2.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            GameConfig::from_json_str("{ fps: "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_frame_budget() {
        let config = GameConfig::default();
        let budget = config.frame_budget();
        assert!((budget.as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
    }
}
