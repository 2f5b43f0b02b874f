//! Raster primitives for the logical pixel grid

use glam::Vec2;

use super::display::{DisplaySurface, OutputSink};
use crate::color::Rgb;
use crate::sim::Rect;

/// Pixel cell containing a continuous position
#[inline]
pub fn cell(pos: Vec2) -> (i32, i32) {
    (pos.x.floor() as i32, pos.y.floor() as i32)
}

pub fn plot<S: OutputSink>(surface: &mut DisplaySurface<S>, pos: Vec2, color: Rgb) {
    if !pos.is_finite() {
        return;
    }
    let (x, y) = cell(pos);
    surface.set_pixel(x, y, color);
}

/// Fill every cell covered by `rect` (max edge exclusive)
pub fn fill_rect<S: OutputSink>(surface: &mut DisplaySurface<S>, rect: &Rect, color: Rgb) {
    let x0 = rect.min.x.floor() as i32;
    let y0 = rect.min.y.floor() as i32;
    let x1 = rect.max.x.ceil() as i32;
    let y1 = rect.max.y.ceil() as i32;
    for y in y0..y1 {
        for x in x0..x1 {
            surface.set_pixel(x, y, color);
        }
    }
}

/// Bresenham line between two cells, endpoints included
pub fn line<S: OutputSink>(surface: &mut DisplaySurface<S>, from: Vec2, to: Vec2, color: Rgb) {
    if !from.is_finite() || !to.is_finite() {
        return;
    }
    let (mut x, mut y) = cell(from);
    let (x1, y1) = cell(to);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        surface.set_pixel(x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// `count` evenly spaced dots on a circle
pub fn ring_dots<S: OutputSink>(
    surface: &mut DisplaySurface<S>,
    center: Vec2,
    radius: f32,
    count: usize,
    color: Rgb,
) {
    for i in 0..count {
        let theta = std::f32::consts::TAU * (i as f32 / count as f32);
        plot(surface, center + Vec2::from_angle(theta) * radius, color);
    }
}
