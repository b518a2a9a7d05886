use crate::config::ViewConfig;
use crate::utils::vector::{Vec2, distance};

/// Clamp `value` into `[min - tolerance, max + tolerance]`: inside the range nothing
/// changes, past it the overshoot grows until `tolerance` and then stops.
pub fn soft_clamp(value: f32, min: f32, max: f32, tolerance: f32) -> f32 {
    if value < min {
        min - (min - value).min(tolerance)
    } else if value > max {
        max + (value - max).min(tolerance)
    } else {
        value
    }
}

#[derive(Clone, Copy, Debug)]
struct PanAnchor {
    pointer: Vec2,
    offset: Vec2,
}

#[derive(Clone, Copy, Debug)]
struct PinchAnchor {
    distance: f32,
    midpoint: Vec2,
    scale: f32,
    offset: Vec2,
    /// Canvas point under the midpoint when the pinch started.
    canvas_point: Vec2,
}

/// Pan/zoom of the drawing canvas inside its viewport.
///
/// `offset` is the screen position of the canvas' top-left corner relative to the
/// viewport; one canvas pixel covers `base_scale * scale` screen pixels, where
/// `base_scale` fits the canvas into the viewport at zoom 1.
#[derive(Clone, Debug)]
pub struct ViewTransform {
    scale: f32,
    offset: Vec2,
    base_scale: f32,
    viewport: Vec2,
    canvas: Vec2,
    config: ViewConfig,
    pan: Option<PanAnchor>,
    pinch: Option<PinchAnchor>,
}

impl ViewTransform {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            scale: config.min_scale,
            offset: Vec2::ZERO,
            base_scale: 1.0,
            viewport: Vec2::ZERO,
            canvas: Vec2::ZERO,
            config,
            pan: None,
            pinch: None,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Screen pixels per canvas pixel.
    pub fn effective_scale(&self) -> f32 {
        self.base_scale * self.scale
    }

    /// On-screen size of the whole canvas.
    pub fn displayed_size(&self) -> Vec2 {
        self.canvas * self.effective_scale()
    }

    /// Tell the transform how big the viewport and canvas are. Keeps the canvas point at
    /// the viewport center fixed when the base fit changes.
    pub fn set_viewport(&mut self, viewport: Vec2, canvas: Vec2) {
        if viewport == self.viewport && canvas == self.canvas {
            return;
        }
        let first = self.viewport == Vec2::ZERO;
        let anchor = self.screen_to_canvas(self.viewport * 0.5);

        self.viewport = viewport;
        self.canvas = canvas;
        self.base_scale = if canvas.x > 0.0 && canvas.y > 0.0 {
            (viewport.x / canvas.x).min(viewport.y / canvas.y)
        } else {
            1.0
        };
        if !first {
            self.offset = viewport * 0.5 - anchor * self.effective_scale();
        }
        self.clamp();
    }

    pub fn screen_to_canvas(&self, screen: Vec2) -> Vec2 {
        (screen - self.offset) / self.effective_scale()
    }

    pub fn canvas_to_screen(&self, canvas: Vec2) -> Vec2 {
        canvas * self.effective_scale() + self.offset
    }

    fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.config.min_scale, self.config.max_scale)
    }

    /// Multiply the zoom by `factor`, keeping the canvas point under `screen` in place.
    pub fn zoom_at(&mut self, screen: Vec2, factor: f32) {
        let anchor = self.screen_to_canvas(screen);
        self.scale = self.clamp_scale(self.scale * factor);
        self.offset = screen - anchor * self.effective_scale();
        self.clamp();
    }

    /// Wheel zoom. Positive `notches` zoom in by `zoom_step` per notch.
    pub fn wheel(&mut self, screen: Vec2, notches: f32) {
        if notches == 0.0 {
            return;
        }
        self.zoom_at(screen, self.config.zoom_step.powf(notches));
    }

    pub fn begin_pan(&mut self, pointer: Vec2) {
        self.pan = Some(PanAnchor {
            pointer,
            offset: self.offset,
        });
    }

    pub fn update_pan(&mut self, pointer: Vec2) {
        if let Some(anchor) = self.pan {
            self.offset = anchor.offset + (pointer - anchor.pointer);
            self.clamp();
        }
    }

    pub fn end_pan(&mut self) {
        self.pan = None;
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    pub fn begin_pinch(&mut self, a: Vec2, b: Vec2) {
        let midpoint = a.midpoint(b);
        self.pinch = Some(PinchAnchor {
            distance: distance(a, b).max(1.0),
            midpoint,
            scale: self.scale,
            offset: self.offset,
            canvas_point: self.screen_to_canvas(midpoint),
        });
    }

    /// Scale by the finger-distance ratio; the canvas point first under the midpoint
    /// follows the midpoint.
    pub fn update_pinch(&mut self, a: Vec2, b: Vec2) {
        let Some(anchor) = self.pinch else {
            return;
        };
        let midpoint = a.midpoint(b);
        self.scale = self.clamp_scale(anchor.scale * distance(a, b) / anchor.distance);
        let correction = anchor.canvas_point * (self.base_scale * (self.scale - anchor.scale));
        self.offset = anchor.offset + (midpoint - anchor.midpoint) - correction;
        self.clamp();
    }

    pub fn end_pinch(&mut self) {
        self.pinch = None;
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    /// Center the canvas on an axis where it fits, otherwise soft-clamp the offset.
    fn clamp(&mut self) {
        let displayed = self.displayed_size();
        let tolerance = self.config.pan_tolerance;
        let axis = |offset: f32, view: f32, shown: f32| {
            if shown <= view {
                (view - shown) / 2.0
            } else {
                soft_clamp(offset, view - shown, 0.0, tolerance)
            }
        };
        self.offset = Vec2::new(
            axis(self.offset.x, self.viewport.x, displayed.x),
            axis(self.offset.y, self.viewport.y, displayed.y),
        );
    }

    /// Back to zoom 1, centered.
    pub fn reset(&mut self) {
        self.scale = self.config.min_scale;
        self.offset = Vec2::ZERO;
        self.pan = None;
        self.pinch = None;
        self.clamp();
    }
}
