//! Hard-edged raster primitives.
//!
//! Every primitive samples pixel centers and goes through [`PixelBuffer::paint`],
//! so an active wedge clip bounds it automatically.

use crate::canvas::surface::{Paint, PixelBuffer};
use crate::utils::vector::{Vec2, distance, distance_to_segment};

/// Integer bounds of a box around `min..max`, padded by `pad`.
fn padded_bounds(min: Vec2, max: Vec2, pad: f32) -> (i32, i32, i32, i32) {
    (
        (min.x - pad).floor() as i32,
        (min.y - pad).floor() as i32,
        (max.x + pad).ceil() as i32 + 1,
        (max.y + pad).ceil() as i32 + 1,
    )
}

fn min_max(a: Vec2, b: Vec2) -> (Vec2, Vec2) {
    (
        Vec2::new(a.x.min(b.x), a.y.min(b.y)),
        Vec2::new(a.x.max(b.x), a.y.max(b.y)),
    )
}

/// Thick line with round caps and joins: every pixel within `width / 2` of the segment.
pub fn stroke_line(buffer: &mut PixelBuffer, from: Vec2, to: Vec2, width: f32, paint: Paint) {
    let half = (width * 0.5).max(0.5);
    let (min, max) = min_max(from, to);
    let (x0, y0, x1, y1) = padded_bounds(min, max, half);
    buffer.paint(x0, y0, x1, y1, paint, |x, y| {
        distance_to_segment(Vec2::new(x, y), from, to) <= half
    });
}

/// Circle outline of radius `radius` centered on `center`.
pub fn stroke_circle(buffer: &mut PixelBuffer, center: Vec2, radius: f32, width: f32, paint: Paint) {
    let half = (width * 0.5).max(0.5);
    let reach = Vec2::new(radius, radius);
    let (x0, y0, x1, y1) = padded_bounds(center - reach, center + reach, half);
    buffer.paint(x0, y0, x1, y1, paint, |x, y| {
        (distance(Vec2::new(x, y), center) - radius).abs() <= half
    });
}

/// Axis-aligned rectangle outline spanning the two corners.
pub fn stroke_rect(buffer: &mut PixelBuffer, a: Vec2, b: Vec2, width: f32, paint: Paint) {
    let half = (width * 0.5).max(0.5);
    let (min, max) = min_max(a, b);
    let (x0, y0, x1, y1) = padded_bounds(min, max, half);
    buffer.paint(x0, y0, x1, y1, paint, |x, y| {
        let in_outer =
            x >= min.x - half && x <= max.x + half && y >= min.y - half && y <= max.y + half;
        let in_inner =
            x > min.x + half && x < max.x - half && y > min.y + half && y < max.y - half;
        in_outer && !in_inner
    });
}

/// Arc outline from `start` sweeping clockwise (screen space) by `sweep` radians.
pub fn stroke_arc(
    buffer: &mut PixelBuffer,
    center: Vec2,
    radius: f32,
    start: f32,
    sweep: f32,
    width: f32,
    paint: Paint,
) {
    let half = (width * 0.5).max(0.5);
    let reach = Vec2::new(radius, radius);
    let (x0, y0, x1, y1) = padded_bounds(center - reach, center + reach, half);
    let tau = std::f32::consts::TAU;
    buffer.paint(x0, y0, x1, y1, paint, |x, y| {
        let d = Vec2::new(x, y) - center;
        if (d.length() - radius).abs() > half {
            return false;
        }
        sweep >= tau || (d.angle() - start).rem_euclid(tau) <= sweep
    });
}
