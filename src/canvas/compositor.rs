use eframe::egui::Color32;

use crate::canvas::layers::LayerStack;
use crate::canvas::raster::{stroke_arc, stroke_line};
use crate::canvas::segment::Wedge;
use crate::canvas::surface::{Paint, PixelBuffer, opacity_to_u8};
use crate::utils::profiler::{FRAME_BUDGET, ScopeTimer};

/// How the layer stack is flattened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositeOptions {
    pub background: Color32,
    /// Show only the current layer, at full alpha.
    pub isolate: bool,
}

/// Flatten the stack bottom-to-top over an opaque background.
///
/// Hidden layers are skipped. In isolate mode visibility and opacity are ignored and
/// only the current layer is drawn.
pub fn compose(stack: &LayerStack, options: CompositeOptions) -> PixelBuffer {
    let _timer = ScopeTimer::with_budget("compose", FRAME_BUDGET);
    let mut out = PixelBuffer::filled(stack.width(), stack.height(), options.background);

    if options.isolate {
        if let Some(layer) = stack.current() {
            out.blend_from(&layer.pixels, 255);
        }
        return out;
    }

    for layer in stack.layers().iter().filter(|l| l.visible) {
        out.blend_from(&layer.pixels, opacity_to_u8(layer.opacity));
    }
    out
}

/// Wedge outline: both straight edges and the arc. Display only.
pub fn draw_guides(buffer: &mut PixelBuffer, wedge: &Wedge, color: Color32, width: f32) {
    let paint = Paint::Over(color);
    stroke_line(buffer, wedge.center, wedge.point_at(wedge.start_angle), width, paint);
    stroke_line(buffer, wedge.center, wedge.point_at(wedge.end_angle()), width, paint);
    stroke_arc(
        buffer,
        wedge.center,
        wedge.radius,
        wedge.start_angle,
        wedge.angle_per_segment,
        width,
        paint,
    );
}
