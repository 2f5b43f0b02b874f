//! Logical pixel buffer and panel mapping
//!
//! The game draws into a `width x height` logical buffer. On present, each
//! logical pixel is translated to its physical position on the panel chain
//! (which panel, where inside it, and the LED's index along the data line)
//! and handed to an [`OutputSink`].

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::consts::*;
use crate::error::ConfigError;

/// Corner of a panel where its first LED sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// How panels are tiled and wired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelLayout {
    pub panel_width: u32,
    pub panel_height: u32,
    pub panels_horizontal: u32,
    pub panels_vertical: u32,
    /// First LED position inside each panel
    pub origin: Origin,
    /// Rows inside a panel alternate direction
    pub pixel_zigzag: bool,
    /// Panel rows alternate direction along the chain
    pub panel_zigzag: bool,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            panel_width: PANEL_WIDTH,
            panel_height: PANEL_HEIGHT,
            panels_horizontal: PANELS_HORIZONTAL,
            panels_vertical: PANELS_VERTICAL,
            origin: Origin::TopLeft,
            pixel_zigzag: false,
            panel_zigzag: false,
        }
    }
}

/// Where a logical pixel lives in hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhysicalPixel {
    /// Panel position along the chain
    pub panel: u32,
    /// Column inside the panel (logical orientation)
    pub local_x: u32,
    /// Row inside the panel (logical orientation)
    pub local_y: u32,
    /// LED index along the whole chain
    pub index: u32,
}

impl PanelLayout {
    pub fn width(&self) -> u32 {
        self.panel_width * self.panels_horizontal
    }

    pub fn height(&self) -> u32 {
        self.panel_height * self.panels_vertical
    }

    pub fn panel_count(&self) -> u32 {
        self.panels_horizontal * self.panels_vertical
    }

    pub fn led_count(&self) -> usize {
        (self.width() * self.height()) as usize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("display.layout.panel_width", self.panel_width),
            ("display.layout.panel_height", self.panel_height),
            ("display.layout.panels_horizontal", self.panels_horizontal),
            ("display.layout.panels_vertical", self.panels_vertical),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidDimension { field, value });
            }
        }
        Ok(())
    }

    /// Map a logical coordinate to hardware; `None` outside the display
    pub fn map(&self, x: u32, y: u32) -> Option<PhysicalPixel> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let (pw, ph) = (self.panel_width, self.panel_height);
        let (panel_x, panel_y) = (x / pw, y / ph);
        let (local_x, local_y) = (x % pw, y % ph);

        let chain_col = if self.panel_zigzag && panel_y % 2 == 1 {
            self.panels_horizontal - 1 - panel_x
        } else {
            panel_x
        };
        let panel = panel_y * self.panels_horizontal + chain_col;

        let (ox, oy) = match self.origin {
            Origin::TopLeft => (local_x, local_y),
            Origin::TopRight => (pw - 1 - local_x, local_y),
            Origin::BottomLeft => (local_x, ph - 1 - local_y),
            Origin::BottomRight => (pw - 1 - local_x, ph - 1 - local_y),
        };
        let col = if self.pixel_zigzag && oy % 2 == 1 {
            pw - 1 - ox
        } else {
            ox
        };

        Some(PhysicalPixel {
            panel,
            local_x,
            local_y,
            index: panel * pw * ph + oy * pw + col,
        })
    }
}

/// Physical output: receives mapped pixels, then a flush per frame
pub trait OutputSink {
    fn write(&mut self, pixel: PhysicalPixel, color: Rgb);
    fn flush(&mut self);
}

/// In-memory LED chain image, in data-line order
#[derive(Debug, Clone)]
pub struct StripBuffer {
    leds: Vec<Rgb>,
    frames: u64,
}

impl StripBuffer {
    pub fn new(led_count: usize) -> Self {
        Self {
            leds: vec![Rgb::BLACK; led_count],
            frames: 0,
        }
    }

    pub fn leds(&self) -> &[Rgb] {
        &self.leds
    }

    /// Raw RGB bytes in chain order
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.leds)
    }

    /// Number of flushed frames
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl OutputSink for StripBuffer {
    fn write(&mut self, pixel: PhysicalPixel, color: Rgb) {
        if let Some(led) = self.leds.get_mut(pixel.index as usize) {
            *led = color;
        }
    }

    fn flush(&mut self) {
        self.frames += 1;
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write(&mut self, pixel: PhysicalPixel, color: Rgb) {
        (**self).write(pixel, color);
    }

    fn flush(&mut self) {
        (**self).flush();
    }
}

/// Frame buffer plus the mapping to a physical sink
#[derive(Debug)]
pub struct DisplaySurface<S: OutputSink> {
    layout: PanelLayout,
    width: u32,
    height: u32,
    buffer: Box<[Rgb]>,
    /// Precomputed logical -> physical table, row-major
    mapping: Box<[PhysicalPixel]>,
    brightness: u8,
    sink: S,
}

impl<S: OutputSink> DisplaySurface<S> {
    pub fn new(layout: PanelLayout, brightness: u8, sink: S) -> Result<Self, ConfigError> {
        layout.validate()?;
        let (width, height) = (layout.width(), layout.height());
        let mapping: Vec<PhysicalPixel> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter_map(|(x, y)| layout.map(x, y))
            .collect();

        Ok(Self {
            width,
            height,
            buffer: vec![Rgb::BLACK; layout.led_count()].into_boxed_slice(),
            mapping: mapping.into_boxed_slice(),
            brightness,
            layout,
            sink,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Logical buffer, row-major
    pub fn buffer(&self) -> &[Rgb] {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.fill(Rgb::BLACK);
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Write one logical pixel; off-screen writes are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        if let Some(i) = self.offset(x, y) {
            self.buffer[i] = color;
        }
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        self.offset(x, y).map(|i| self.buffer[i])
    }

    /// Push the whole buffer through the panel mapping and flush
    pub fn present(&mut self) {
        for (pixel, color) in self.mapping.iter().zip(self.buffer.iter()) {
            self.sink.write(*pixel, color.with_brightness(self.brightness));
        }
        self.sink.flush();
    }
}
