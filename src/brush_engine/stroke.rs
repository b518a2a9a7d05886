use crate::brush_engine::tool::Tool;
use crate::canvas::raster::{stroke_circle, stroke_line, stroke_rect};
use crate::canvas::segment::Wedge;
use crate::canvas::surface::{Paint, PixelBuffer};
use crate::utils::{profiler::ScopeTimer, vector::Vec2};

/// Tracks one pointer gesture: where it started, the last sample and, for shape tools,
/// the layer pixels as they were before the gesture.
pub struct StrokeState {
    tool: Tool,
    start_pos: Vec2,
    pub last_pos: Option<Vec2>,
    base: Option<PixelBuffer>,
    stroke_timer: Option<ScopeTimer>,
}

impl StrokeState {
    /// Start a gesture at `pos` on a layer whose pixels are `layer`.
    pub fn new(tool: Tool, pos: Vec2, layer: &PixelBuffer) -> Self {
        Self {
            tool,
            start_pos: pos,
            last_pos: Some(pos),
            base: tool.is_shape().then(|| layer.clone()),
            stroke_timer: Some(ScopeTimer::new("stroke")),
        }
    }

    /// Add a pointer sample, drawing into `buffer` clipped to `wedge`.
    ///
    /// Freehand tools draw a round-capped segment from the previous sample. Shape tools
    /// put the pre-gesture pixels back and draw the shape from the press point.
    pub fn add_point(&mut self, buffer: &mut PixelBuffer, wedge: &Wedge, pos: Vec2) {
        if let Some(base) = &self.base {
            *buffer = base.clone();
        }
        let mut clipped = wedge.clip(buffer);
        let start = self.start_pos;

        match self.tool {
            Tool::Brush { width, color } => {
                let from = self.last_pos.unwrap_or(pos);
                stroke_line(&mut clipped, from, pos, width, Paint::Over(color));
            }
            Tool::Eraser { width } => {
                let from = self.last_pos.unwrap_or(pos);
                stroke_line(&mut clipped, from, pos, width, Paint::Erase);
            }
            Tool::Line { width, color } => {
                stroke_line(&mut clipped, start, pos, width, Paint::Over(color));
            }
            Tool::Circle { width, color } => {
                let radius = (pos - start).length();
                stroke_circle(&mut clipped, start, radius, width, Paint::Over(color));
            }
            Tool::Rectangle { width, color } => {
                stroke_rect(&mut clipped, start, pos, width, Paint::Over(color));
            }
            Tool::Bucket { .. } => {}
        }

        self.last_pos = Some(pos);
    }

    /// Reset the stroke state and emit the profiling metric.
    pub fn end(&mut self) {
        self.last_pos = None;
        self.base = None;
        // Dropping the timer reports the stroke duration.
        self.stroke_timer.take();
    }
}
