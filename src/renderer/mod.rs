//! LED panel rendering module
//!
//! Composes each frame into a logical pixel buffer and maps it onto the
//! physical panel chain.

pub mod display;
pub mod frame;
pub mod shapes;

pub use display::{DisplaySurface, Origin, OutputSink, PanelLayout, PhysicalPixel, StripBuffer};
pub use frame::Renderer;
