use std::f32::consts::{FRAC_PI_2, TAU};

use crate::canvas::surface::{ClipGuard, PixelBuffer};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::utils::vector::Vec2;

/// Slack for boundary tests so points computed by rotation still land inside.
const ANGLE_EPSILON: f32 = 1e-5;
const RADIUS_EPSILON: f32 = 1e-3;

/// Persistent inputs from which the wedge is derived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentSettings {
    pub count: usize,
    /// Offset of the wedge center from the canvas center.
    pub offset: Vec2,
    /// Radius as a fraction of half the smaller canvas side.
    pub radius_factor: f32,
}

impl SegmentSettings {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            count: config.segment_count,
            offset: Vec2::new(config.segment_offset[0], config.segment_offset[1]),
            radius_factor: config.radius_factor,
        }
    }

    pub fn set_count(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            return Err(EngineError::InvalidSegmentCount(count));
        }
        self.count = count;
        Ok(())
    }

    /// Derive the wedge for a canvas of the given size.
    pub fn wedge(&self, width: usize, height: usize) -> Wedge {
        let center = Vec2::new(width as f32 / 2.0, height as f32 / 2.0) + self.offset;
        let radius = width.min(height) as f32 * 0.5 * self.radius_factor;
        Wedge::new(self.count, center, radius)
    }
}

/// One circular sector of the kaleidoscope. Recomputed on demand, never edited.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wedge {
    pub count: usize,
    pub center: Vec2,
    pub radius: f32,
    pub angle_per_segment: f32,
    pub start_angle: f32,
}

impl Wedge {
    /// Wedge starting straight up (`-PI/2`) and sweeping clockwise on screen.
    pub fn new(count: usize, center: Vec2, radius: f32) -> Self {
        Self::with_start(count, center, radius, -FRAC_PI_2)
    }

    pub fn with_start(count: usize, center: Vec2, radius: f32, start_angle: f32) -> Self {
        let count = count.max(1);
        Self {
            count,
            center,
            radius: radius.max(0.0),
            angle_per_segment: TAU / count as f32,
            start_angle,
        }
    }

    pub fn end_angle(&self) -> f32 {
        self.start_angle + self.angle_per_segment
    }

    /// Angle halfway through the sector.
    pub fn bisector(&self) -> f32 {
        self.start_angle + self.angle_per_segment * 0.5
    }

    /// Angle of `p` around the center, measured from `start_angle` into `[0, TAU)`.
    pub fn relative_angle(&self, p: Vec2) -> f32 {
        ((p - self.center).angle() - self.start_angle).rem_euclid(TAU)
    }

    /// Inclusive membership test: the radius and both straight edges count as inside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let p = Vec2::new(x, y);
        let d = p - self.center;
        let dist = d.length();
        if dist > self.radius + RADIUS_EPSILON {
            return false;
        }
        if self.count == 1 || dist == 0.0 {
            return true;
        }
        let rel = self.relative_angle(p);
        rel <= self.angle_per_segment + ANGLE_EPSILON || rel >= TAU - ANGLE_EPSILON
    }

    /// Membership of the pixel at column `x`, row `y`, judged by its center.
    pub fn contains_pixel(&self, x: usize, y: usize) -> bool {
        self.contains(x as f32 + 0.5, y as f32 + 0.5)
    }

    /// Point on the arc at `angle`.
    pub fn point_at(&self, angle: f32) -> Vec2 {
        self.center + Vec2::from_angle(angle) * self.radius
    }

    /// Integer bounding box `(x0, y0, x1, y1)` of the full circle, exclusive at the far end.
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        (
            (self.center.x - self.radius).floor() as i32,
            (self.center.y - self.radius).floor() as i32,
            (self.center.x + self.radius).ceil() as i32 + 1,
            (self.center.y + self.radius).ceil() as i32 + 1,
        )
    }

    /// Limit drawing on `buffer` to this wedge until the guard drops.
    pub fn clip<'a>(&self, buffer: &'a mut PixelBuffer) -> ClipGuard<'a> {
        buffer.push_clip(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn wedge(count: usize) -> Wedge {
        Wedge::new(count, Vec2::new(100.0, 100.0), 80.0)
    }

    #[test]
    fn settings_derive_radius_and_offset_center() {
        let settings = SegmentSettings {
            count: 8,
            offset: Vec2::new(-50.0, 100.0),
            radius_factor: 1.0,
        };
        let w = settings.wedge(800, 600);
        assert_eq!(w.center, Vec2::new(350.0, 400.0));
        assert_eq!(w.radius, 300.0);
        assert!((w.angle_per_segment - PI / 4.0).abs() < 1e-6);
        assert_eq!(w.start_angle, -FRAC_PI_2);
    }

    #[test]
    fn zero_count_is_rejected() {
        let mut settings = SegmentSettings::from_config(&EngineConfig::default());
        assert!(matches!(
            settings.set_count(0),
            Err(EngineError::InvalidSegmentCount(0))
        ));
        assert_eq!(settings.count, 8);
    }

    #[test]
    fn boundaries_are_inclusive() {
        let w = wedge(4);
        // Exactly on the radius along the bisector.
        let on_arc = w.point_at(w.bisector());
        assert!(w.contains(on_arc.x, on_arc.y));
        // On both straight edges.
        let start_edge = w.center + Vec2::from_angle(w.start_angle) * 40.0;
        let end_edge = w.center + Vec2::from_angle(w.end_angle()) * 40.0;
        assert!(w.contains(start_edge.x, start_edge.y));
        assert!(w.contains(end_edge.x, end_edge.y));
        assert!(w.contains(w.center.x, w.center.y));
        // Just past the radius.
        let outside = w.center + Vec2::from_angle(w.bisector()) * 80.5;
        assert!(!w.contains(outside.x, outside.y));
    }

    #[test]
    fn rotated_samples_land_in_exactly_one_sector() {
        for n in 1..=12usize {
            let w = wedge(n);
            let aps = w.angle_per_segment;
            for k in 0..16 {
                let base = w.start_angle + (k as f32 + 0.37) * TAU / 16.0;
                let r = 10.0 + k as f32 * 4.0;
                let hits = (0..n)
                    .filter(|&i| {
                        let p = w.center + Vec2::from_angle(base + i as f32 * aps) * r;
                        w.contains(p.x, p.y)
                    })
                    .count();
                assert_eq!(hits, 1, "n={n} sample={k}");
            }
        }
    }

    #[test]
    fn single_segment_is_the_full_disc() {
        let w = wedge(1);
        assert!(w.contains(100.0, 179.0));
        assert!(w.contains(21.0, 100.0));
        assert!(!w.contains(100.0, 181.0));
    }

    #[test]
    fn clip_scope_is_released() {
        let w = wedge(8);
        let mut buf = PixelBuffer::new(10, 10);
        {
            let guard = w.clip(&mut buf);
            assert_eq!(guard.clip_depth(), 1);
        }
        assert_eq!(buf.clip_depth(), 0);
    }
}
