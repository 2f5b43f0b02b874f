//! 24-bit LED colors

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// One LED's color, laid out as the strip expects it on the wire
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale all channels by `factor` in [0, 1]
    pub fn scaled(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * f).round() as u8,
            g: (self.g as f32 * f).round() as u8,
            b: (self.b as f32 * f).round() as u8,
        }
    }

    /// Apply an 8-bit brightness level (255 = unchanged)
    pub fn with_brightness(self, brightness: u8) -> Self {
        let scale = |c: u8| ((c as u16 * brightness as u16 + 127) / 255) as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }

    pub fn is_black(self) -> bool {
        self == Self::BLACK
    }
}

/// Colors for game elements
pub mod palette {
    use super::Rgb;

    pub const SNOW: Rgb = Rgb::new(230, 240, 255);
    pub const GROUND: Rgb = Rgb::new(90, 100, 120);
    pub const PROJECTILE: Rgb = Rgb::new(255, 255, 255);
    pub const TRAIL: Rgb = Rgb::new(120, 160, 220);
    pub const WIND: Rgb = Rgb::new(20, 60, 70);
    pub const WIND_ARROW: Rgb = Rgb::new(40, 120, 140);
    pub const HIT_HOT: Rgb = Rgb::new(255, 140, 40);
    pub const HIT_WARM: Rgb = Rgb::new(255, 220, 80);
    pub const MISS: Rgb = Rgb::new(150, 150, 170);
    /// Fort colors, indexed by player
    pub const PLAYER: [Rgb; 2] = [Rgb::new(220, 40, 40), Rgb::new(40, 90, 230)];
    pub const SCORE_PIP: Rgb = Rgb::new(255, 200, 0);
}
