use eframe::egui::Color32;

use crate::canvas::segment::Wedge;
use crate::canvas::surface::PixelBuffer;
use crate::config::EngineConfig;
use crate::utils::color::ColorManipulation;
use crate::utils::profiler::ScopeTimer;

/// Why a fill did not start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillRejection {
    OutOfBounds,
    /// The seed pixel is already painted (alpha above the threshold).
    SeedOpaque { alpha: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillOutcome {
    Rejected(FillRejection),
    /// `truncated` is set when the pixel cap stopped the fill early.
    Filled { pixels: usize, truncated: bool },
}

/// Boundary fill bounded by the wedge and by already-painted pixels.
#[derive(Clone, Copy, Debug)]
pub struct FloodFill {
    /// Pixels with alpha at or below this are fillable.
    pub threshold: u8,
    /// Hard cap on filled pixels per operation.
    pub max_pixels: usize,
}

impl FloodFill {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            threshold: config.fill_alpha_threshold,
            max_pixels: config.fill_max_pixels,
        }
    }

    /// Check the seed without touching the buffer.
    pub fn check_seed(&self, buffer: &PixelBuffer, x: i32, y: i32) -> Result<(), FillRejection> {
        let px = buffer.get(x, y).ok_or(FillRejection::OutOfBounds)?;
        if px.a() > self.threshold {
            return Err(FillRejection::SeedOpaque { alpha: px.a() });
        }
        Ok(())
    }

    /// 4-connected fill from `(x, y)` writing opaque `color`.
    pub fn fill(
        &self,
        buffer: &mut PixelBuffer,
        wedge: &Wedge,
        x: i32,
        y: i32,
        color: Color32,
    ) -> FillOutcome {
        if let Err(reason) = self.check_seed(buffer, x, y) {
            log::debug!("flood fill at ({x}, {y}) rejected: {reason:?}");
            return FillOutcome::Rejected(reason);
        }
        let _timer = ScopeTimer::new("flood_fill");

        let width = buffer.width();
        let height = buffer.height();
        let [r, g, b] = color.rgb();
        let fill_color = Color32::from_rgb(r, g, b);
        let threshold = self.threshold;

        let mut visited = vec![false; width * height];
        let mut stack = vec![(x as usize, y as usize)];
        let mut filled = 0usize;
        let mut truncated = false;
        let pixels = buffer.pixels_mut();

        while let Some((px, py)) = stack.pop() {
            let idx = py * width + px;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;

            if pixels[idx].a() > threshold || !wedge.contains_pixel(px, py) {
                continue;
            }
            if filled >= self.max_pixels {
                truncated = true;
                break;
            }
            pixels[idx] = fill_color;
            filled += 1;

            if px > 0 {
                stack.push((px - 1, py));
            }
            if px + 1 < width {
                stack.push((px + 1, py));
            }
            if py > 0 {
                stack.push((px, py - 1));
            }
            if py + 1 < height {
                stack.push((px, py + 1));
            }
        }

        if truncated {
            log::warn!(
                "flood fill at ({x}, {y}) hit the {} pixel cap; result truncated",
                self.max_pixels
            );
        } else {
            log::debug!("flood fill at ({x}, {y}) filled {filled} pixels");
        }
        FillOutcome::Filled {
            pixels: filled,
            truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::surface::Paint;
    use crate::canvas::raster::stroke_line;
    use crate::utils::vector::Vec2;
    use std::f32::consts::PI;

    const FILL: FloodFill = FloodFill {
        threshold: 200,
        max_pixels: 200_000,
    };

    #[test]
    fn fills_exactly_the_sixty_degree_sector() {
        let mut buf = PixelBuffer::new(100, 100);
        let wedge = Wedge::new(6, Vec2::new(50.0, 50.0), 40.0);
        assert!((wedge.angle_per_segment - PI / 3.0).abs() < 1e-6);

        let seed = wedge.center + Vec2::from_angle(wedge.bisector()) * 20.0;
        let outcome = FILL.fill(&mut buf, &wedge, seed.x as i32, seed.y as i32, Color32::RED);
        assert!(matches!(outcome, FillOutcome::Filled { truncated: false, .. }));

        for y in 0..100 {
            for x in 0..100 {
                let filled = buf.get(x as i32, y as i32) == Some(Color32::RED);
                if filled {
                    assert!(wedge.contains_pixel(x, y), "({x}, {y}) outside the wedge");
                }
            }
        }
        // One unit past the radius along the bisector stays empty.
        let past = wedge.center + Vec2::from_angle(wedge.bisector()) * 41.0;
        assert_eq!(buf.get(past.x as i32, past.y as i32), Some(Color32::TRANSPARENT));
        // Just outside the angular span.
        let beside = wedge.center + Vec2::from_angle(wedge.end_angle() + 0.2) * 20.0;
        assert_eq!(buf.get(beside.x as i32, beside.y as i32), Some(Color32::TRANSPARENT));
        // Inside, near the arc, got filled.
        let near_arc = wedge.center + Vec2::from_angle(wedge.bisector()) * 38.0;
        assert_eq!(buf.get(near_arc.x as i32, near_arc.y as i32), Some(Color32::RED));
    }

    #[test]
    fn opaque_seed_is_a_noop() {
        let mut buf = PixelBuffer::filled(10, 10, Color32::BLUE);
        let wedge = Wedge::new(1, Vec2::new(5.0, 5.0), 10.0);
        let before = buf.clone();
        let outcome = FILL.fill(&mut buf, &wedge, 5, 5, Color32::RED);
        assert_eq!(
            outcome,
            FillOutcome::Rejected(FillRejection::SeedOpaque { alpha: 255 })
        );
        assert_eq!(buf, before);
        assert_eq!(
            FILL.fill(&mut buf, &wedge, -1, 3, Color32::RED),
            FillOutcome::Rejected(FillRejection::OutOfBounds)
        );
    }

    #[test]
    fn painted_lines_are_boundaries() {
        let mut buf = PixelBuffer::new(30, 30);
        let wedge = Wedge::new(1, Vec2::new(15.0, 15.0), 30.0);
        stroke_line(
            &mut buf,
            Vec2::new(15.0, 0.0),
            Vec2::new(15.0, 30.0),
            2.0,
            Paint::Replace(Color32::BLACK),
        );
        FILL.fill(&mut buf, &wedge, 3, 3, Color32::RED);
        assert_eq!(buf.get(3, 20), Some(Color32::RED));
        assert_eq!(buf.get(25, 3), Some(Color32::TRANSPARENT));
        assert_eq!(buf.get(15, 3), Some(Color32::BLACK));
    }

    #[test]
    fn translucent_pixels_below_threshold_are_filled() {
        let mut buf = PixelBuffer::filled(4, 4, Color32::from_rgba_unmultiplied(0, 0, 0, 100));
        let wedge = Wedge::new(1, Vec2::new(2.0, 2.0), 10.0);
        let outcome = FILL.fill(&mut buf, &wedge, 0, 0, Color32::GREEN);
        assert_eq!(
            outcome,
            FillOutcome::Filled {
                pixels: 16,
                truncated: false
            }
        );
        assert!(buf.pixels().iter().all(|p| *p == Color32::GREEN));
    }

    #[test]
    fn cap_truncates_instead_of_running_away() {
        let mut buf = PixelBuffer::new(50, 50);
        let wedge = Wedge::new(1, Vec2::new(25.0, 25.0), 100.0);
        let capped = FloodFill {
            threshold: 200,
            max_pixels: 100,
        };
        let outcome = capped.fill(&mut buf, &wedge, 25, 25, Color32::RED);
        assert_eq!(
            outcome,
            FillOutcome::Filled {
                pixels: 100,
                truncated: true
            }
        );
        let painted = buf.pixels().iter().filter(|p| **p == Color32::RED).count();
        assert_eq!(painted, 100);
    }
}
