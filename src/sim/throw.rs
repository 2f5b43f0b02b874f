//! Throw gesture recognition
//!
//! Turns a stream of raw 3-axis accelerometer samples into one-shot
//! [`ThrowEvent`]s. A capture window opens when a sample's magnitude crosses
//! the detection threshold. Time above threshold and the peak are measured on
//! the raw per-sample magnitude; the rolling mean of recent magnitudes only
//! decides whether a gesture has decayed, so a single low reading inside a
//! throw does not end it. A gesture needs a minimum time above threshold
//! within the fixed capture window. After each emitted throw a cooldown
//! suppresses detection so a single physical throw cannot fire twice.
//!
//! Mapping (both monotonic in their inputs):
//! - `power = peak_g * max_power / full_scale_g`, clamped to `[0, max_power]`
//! - `angle = atan2(vertical, horizontal)` of the raw sample at the peak, in
//!   degrees, clamped to `[-max_angle, max_angle]`. Horizontal is the length
//!   of the forward/lateral components so sensor yaw does not matter.

use serde::{Deserialize, Serialize};

use crate::config::{PhysicsConfig, ThrowConfig};

/// Float slack when comparing accumulated frame times against durations
const TIME_EPSILON: f32 = 1e-4;

/// One accelerometer reading in g. `x` forward, `y` lateral, `z` vertical (up).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccelSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl AccelSample {
    /// Sensor at rest: gravity only
    pub const REST: AccelSample = AccelSample::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// A detected throw, ready to be turned into a launch
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThrowEvent {
    /// `[0, max_throw_power]`
    pub power: f32,
    /// Degrees above horizontal, `[-max_angle, max_angle]`
    pub angle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Capture {
    /// Seconds since the window opened
    elapsed: f32,
    /// Seconds spent above threshold
    above: f32,
    peak: f32,
    peak_sample: AccelSample,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DetectorState {
    Idle,
    Capturing(Capture),
    Cooldown { remaining: f32 },
}

#[derive(Debug, Clone)]
pub struct ThrowDetector {
    config: ThrowConfig,
    max_power: f32,
    max_angle: f32,
    /// Ring buffer of recent magnitudes
    history: Box<[f32]>,
    head: usize,
    filled: usize,
    state: DetectorState,
}

impl ThrowDetector {
    pub fn new(config: &ThrowConfig, physics: &PhysicsConfig) -> Self {
        Self {
            config: config.clone(),
            max_power: physics.max_throw_power,
            max_angle: physics.max_angle_deg,
            history: vec![0.0; config.smoothing_samples.max(1)].into_boxed_slice(),
            head: 0,
            filled: 0,
            state: DetectorState::Idle,
        }
    }

    /// Rolling mean of the most recent magnitudes (0 before any sample)
    pub fn rolling_magnitude(&self) -> f32 {
        if self.filled == 0 {
            return 0.0;
        }
        self.history[..self.filled].iter().sum::<f32>() / self.filled as f32
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, DetectorState::Capturing(_))
    }

    pub fn in_cooldown(&self) -> bool {
        matches!(self.state, DetectorState::Cooldown { .. })
    }

    /// Clear any capture, cooldown, and magnitude history
    pub fn arm(&mut self) {
        self.state = DetectorState::Idle;
        self.head = 0;
        self.filled = 0;
    }

    /// Feed one tick. `sample` is `None` when the sensor had nothing new; the
    /// detector's timers still advance but the gesture is neither extended
    /// nor broken by a missing read.
    pub fn update(&mut self, sample: Option<AccelSample>, dt: f32) -> Option<ThrowEvent> {
        let reading = sample.filter(AccelSample::is_finite).map(|s| {
            let magnitude = s.magnitude();
            (magnitude, self.push(magnitude), s)
        });
        let threshold = self.config.detection_g;

        if let DetectorState::Cooldown { remaining } = &mut self.state {
            *remaining -= dt;
            if *remaining > 0.0 {
                return None;
            }
            // The expiring tick's reading is evaluated below
            self.state = DetectorState::Idle;
        }

        match &mut self.state {
            DetectorState::Cooldown { .. } => None,
            DetectorState::Idle => {
                let (magnitude, _, raw) = reading?;
                if magnitude <= threshold {
                    return None;
                }
                log::trace!("Capture opened at {:.2}g", magnitude);
                self.state = DetectorState::Capturing(Capture {
                    elapsed: dt,
                    above: dt,
                    peak: magnitude,
                    peak_sample: raw,
                });
                self.check_window_close()
            }
            DetectorState::Capturing(capture) => {
                capture.elapsed += dt;
                match reading {
                    Some((magnitude, _, raw)) if magnitude > threshold => {
                        capture.above += dt;
                        if magnitude > capture.peak {
                            capture.peak = magnitude;
                            capture.peak_sample = raw;
                        }
                    }
                    Some((_, smoothed, _))
                        if smoothed <= threshold
                            && capture.above + TIME_EPSILON < self.config.min_duration =>
                    {
                        log::debug!(
                            "Gesture discarded: {:.3}s above threshold, need {:.3}s",
                            capture.above,
                            self.config.min_duration
                        );
                        self.state = DetectorState::Idle;
                        return None;
                    }
                    _ => {}
                }
                self.check_window_close()
            }
        }
    }

    fn check_window_close(&mut self) -> Option<ThrowEvent> {
        let DetectorState::Capturing(capture) = self.state else {
            return None;
        };
        if capture.elapsed + TIME_EPSILON < self.config.capture_window {
            return None;
        }

        if capture.above + TIME_EPSILON < self.config.min_duration {
            self.state = DetectorState::Idle;
            return None;
        }

        let event = self.map_gesture(capture.peak, capture.peak_sample);
        log::debug!(
            "Throw detected: peak {:.2}g -> power {:.1}, angle {:.1}°",
            capture.peak,
            event.power,
            event.angle
        );
        self.state = DetectorState::Cooldown {
            remaining: self.config.cooldown,
        };
        Some(event)
    }

    fn map_gesture(&self, peak: f32, sample: AccelSample) -> ThrowEvent {
        let power = (peak * self.max_power / self.config.full_scale_g).clamp(0.0, self.max_power);
        let horizontal = (sample.x * sample.x + sample.y * sample.y).sqrt();
        let angle = sample
            .z
            .atan2(horizontal)
            .to_degrees()
            .clamp(-self.max_angle, self.max_angle);
        ThrowEvent { power, angle }
    }

    fn push(&mut self, magnitude: f32) -> f32 {
        self.history[self.head] = magnitude;
        self.head = (self.head + 1) % self.history.len();
        self.filled = (self.filled + 1).min(self.history.len());
        self.rolling_magnitude()
    }
}
