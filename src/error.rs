//! Startup error types
//!
//! Configuration is the only fallible stage: once the tick loop runs, every
//! failure degrades to "skip the effect" instead of surfacing an error.

use thiserror::Error;

/// Errors raised while loading or validating a [`GameConfig`](crate::GameConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A geometric dimension was zero.
    #[error("invalid dimension: {field} must be positive (got {value})")]
    InvalidDimension {
        /// Offending field.
        field: &'static str,
        /// Value supplied.
        value: u32,
    },

    /// A pool capacity was zero.
    #[error("zero capacity: {0} must hold at least one entry")]
    ZeroCapacity(&'static str),

    /// A numeric setting was non-finite or out of its allowed domain.
    #[error("invalid value for {field}: {value}")]
    InvalidValue {
        /// Offending field.
        field: &'static str,
        /// Value supplied.
        value: f32,
    },

    /// A min/max pair was inverted.
    #[error("inverted range for {field}: min {min} > max {max}")]
    InvertedRange {
        /// Offending range.
        field: &'static str,
        /// Lower bound supplied.
        min: f32,
        /// Upper bound supplied.
        max: f32,
    },

    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config document was malformed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
