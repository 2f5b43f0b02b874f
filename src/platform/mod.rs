//! Platform abstraction layer
//!
//! Hardware-facing inputs the simulation polls each tick.

pub mod sensor;

pub use sensor::{AccelSensor, ScriptedSensor};
