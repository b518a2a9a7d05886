use std::f32::consts::TAU;

use eframe::egui::Color32;

use crate::canvas::segment::Wedge;
use crate::canvas::surface::PixelBuffer;
use crate::utils::profiler::{FRAME_BUDGET, ScopeTimer};
use crate::utils::vector::Vec2;

/// Renders the kaleidoscope: `count` copies of the wedge around the destination center.
///
/// Even sectors are the wedge rotated into place; odd sectors are additionally mirrored
/// about their bisector, so neighbouring copies meet edge-to-edge without a seam.
/// Rendering is inverse-mapped: each destination pixel looks up the composite pixel it
/// came from, nearest neighbour.
#[derive(Clone, Debug)]
pub struct PreviewRenderer {
    width: usize,
    height: usize,
    background: Color32,
}

impl PreviewRenderer {
    pub fn new(width: usize, height: usize, background: Color32) -> Self {
        Self {
            width,
            height,
            background,
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Change the destination size; the fit scale follows on the next render.
    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.width, self.height) {
            log::debug!("preview resized to {width}x{height}");
            self.width = width;
            self.height = height;
        }
    }

    pub fn set_background(&mut self, background: Color32) {
        self.background = background;
    }

    /// Scale that makes the full wedge circle fit the smaller destination side.
    pub fn fit_scale(&self, wedge: &Wedge) -> f32 {
        let half = self.width.min(self.height) as f32 / 2.0;
        if wedge.radius > 0.0 { half / wedge.radius } else { 1.0 }
    }

    fn dest_center(&self) -> Vec2 {
        Vec2::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// Composite-space point shown at destination point `dest`, or `None` outside the disc.
    pub fn source_point(&self, wedge: &Wedge, dest: Vec2) -> Option<Vec2> {
        let fit = self.fit_scale(wedge);
        let d = dest - self.dest_center();
        let r = d.length() / fit;
        if r > wedge.radius {
            return None;
        }

        let aps = wedge.angle_per_segment;
        let theta = (d.angle() - wedge.start_angle).rem_euclid(TAU);
        let sector = ((theta / aps) as usize).min(wedge.count - 1);
        let mut t = theta - sector as f32 * aps;
        if sector % 2 == 1 {
            t = aps - t;
        }
        Some(wedge.center + Vec2::from_angle(wedge.start_angle + t) * r)
    }

    /// Render from a guide-free composite.
    pub fn render(&self, composite: &PixelBuffer, wedge: &Wedge) -> PixelBuffer {
        let _timer = ScopeTimer::with_budget("preview", FRAME_BUDGET);
        let mut out = PixelBuffer::filled(self.width, self.height, self.background);
        let width = self.width;
        let pixels = out.pixels_mut();

        for y in 0..self.height {
            for x in 0..width {
                let dest = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let Some(src) = self.source_point(wedge, dest) else {
                    continue;
                };
                if let Some(color) = composite.get(src.x.floor() as i32, src.y.floor() as i32) {
                    pixels[y * width + x] = color;
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    /// Composite colored by angle inside the wedge: red for the first half, blue after.
    fn split_composite(wedge: &Wedge) -> PixelBuffer {
        let mut buf = PixelBuffer::filled(100, 100, Color32::GREEN);
        for y in 0..100 {
            for x in 0..100 {
                let rel = wedge.relative_angle(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                let color = if rel < wedge.angle_per_segment / 2.0 {
                    Color32::RED
                } else if rel <= wedge.angle_per_segment {
                    Color32::BLUE
                } else {
                    continue;
                };
                buf.pixels_mut()[y * 100 + x] = color;
            }
        }
        buf
    }

    fn setup() -> (Wedge, PixelBuffer, PixelBuffer) {
        let wedge = Wedge::new(4, Vec2::new(50.0, 50.0), 40.0);
        let composite = split_composite(&wedge);
        let renderer = PreviewRenderer::new(80, 80, Color32::WHITE);
        let preview = renderer.render(&composite, &wedge);
        (wedge, composite, preview)
    }

    fn relative_deg(p: (usize, usize)) -> f32 {
        let d = Vec2::new(p.0 as f32 + 0.5 - 40.0, p.1 as f32 + 0.5 - 40.0);
        (d.angle() + std::f32::consts::FRAC_PI_2).rem_euclid(TAU).to_degrees()
    }

    #[test]
    fn sector_zero_is_the_wedge_itself() {
        let (_, _, preview) = setup();
        // Straight up from the center is the start edge; a bit clockwise is red.
        let red = Vec2::new(40.0, 40.0) + Vec2::from_angle(-FRAC_PI_4 - 0.6) * 20.0;
        let blue = Vec2::new(40.0, 40.0) + Vec2::from_angle(-FRAC_PI_4 + 0.6) * 20.0;
        assert_eq!(preview.get(red.x as i32, red.y as i32), Some(Color32::RED));
        assert_eq!(preview.get(blue.x as i32, blue.y as i32), Some(Color32::BLUE));
    }

    #[test]
    fn shared_edge_between_sector_zero_and_one_has_no_seam() {
        let (_, _, preview) = setup();
        // The boundary runs along the +x axis from the center: row 39 is sector 0,
        // row 40 is sector 1.
        for x in 41..78 {
            let above = preview.get(x, 39).unwrap();
            let below = preview.get(x, 40).unwrap();
            assert_eq!(above, Color32::BLUE, "x={x}");
            assert_eq!(above, below, "seam at x={x}");
        }
    }

    #[test]
    fn odd_sector_is_mirrored() {
        let (_, _, preview) = setup();
        // Sector 1 spans 90..180 degrees; mirrored, its far half is red.
        let near = Vec2::new(40.0, 40.0) + Vec2::from_angle(0.6) * 20.0;
        let far = Vec2::new(40.0, 40.0) + Vec2::from_angle(std::f32::consts::FRAC_PI_2 - 0.6) * 20.0;
        assert_eq!(preview.get(near.x as i32, near.y as i32), Some(Color32::BLUE));
        assert_eq!(preview.get(far.x as i32, far.y as i32), Some(Color32::RED));
    }

    #[test]
    fn sector_two_is_sector_zero_rotated_half_a_turn() {
        let (_, _, preview) = setup();
        for y in 0..40usize {
            for x in 40..80usize {
                let deg = relative_deg((x, y));
                let r = Vec2::new(x as f32 + 0.5 - 40.0, y as f32 + 0.5 - 40.0).length();
                let clear_of_edges = (10.0..35.0).contains(&deg) || (55.0..80.0).contains(&deg);
                if !clear_of_edges || r > 38.0 {
                    continue;
                }
                let opposite = (79 - x as i32, 79 - y as i32);
                assert_eq!(
                    preview.get(x as i32, y as i32),
                    preview.get(opposite.0, opposite.1),
                    "({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn outside_the_disc_is_background() {
        let (_, _, preview) = setup();
        assert_eq!(preview.get(0, 0), Some(Color32::WHITE));
        assert_eq!(preview.get(79, 79), Some(Color32::WHITE));
    }

    #[test]
    fn fit_scale_follows_destination_size() {
        let wedge = Wedge::new(6, Vec2::new(50.0, 50.0), 40.0);
        let mut renderer = PreviewRenderer::new(80, 80, Color32::WHITE);
        assert_eq!(renderer.fit_scale(&wedge), 1.0);
        renderer.resize(200, 100);
        assert_eq!(renderer.fit_scale(&wedge), 1.25);
        let out = renderer.render(&PixelBuffer::new(100, 100), &wedge);
        assert_eq!((out.width(), out.height()), (200, 100));
        // The disc is centred and spans the full height.
        assert!(renderer.source_point(&wedge, Vec2::new(100.0, 1.0)).is_some());
        assert!(renderer.source_point(&wedge, Vec2::new(30.0, 50.0)).is_none());
    }
}
