use eframe::egui::Color32;

use crate::brush_engine::stroke::StrokeState;
use crate::brush_engine::tool::Tool;
use crate::canvas::compositor::{CompositeOptions, compose, draw_guides};
use crate::canvas::flood_fill::{FillOutcome, FloodFill};
use crate::canvas::history::{History, Snapshot};
use crate::canvas::layers::{Layer, LayerInfo, LayerStack, NewLayer};
use crate::canvas::preview::PreviewRenderer;
use crate::canvas::segment::{SegmentSettings, Wedge};
use crate::canvas::surface::PixelBuffer;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::utils::color::ColorManipulation;
use crate::utils::vector::Vec2;

/// Change notifications queued for the UI; drained with [`Engine::take_events`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// Layer list, order, selection or metadata changed.
    LayersChanged,
    /// Some layer's pixels changed.
    PixelsChanged,
    SegmentsChanged,
    HistoryChanged,
    /// Background, guides or isolate toggled.
    ViewSettingsChanged,
}

/// The document and everything that edits it.
///
/// Every mutating command validates first, then records a history snapshot, then
/// mutates, so a refused command leaves both the layers and the history untouched.
/// Accepted layer commands also close any open stroke, so a gesture never continues
/// onto a layer it did not start on.
pub struct Engine {
    config: EngineConfig,
    segments: SegmentSettings,
    layers: LayerStack,
    history: History,
    stroke: Option<StrokeState>,
    renderer: PreviewRenderer,
    options: CompositeOptions,
    show_guides: bool,

    composite: Option<PixelBuffer>,
    display: Option<PixelBuffer>,
    preview: Option<PixelBuffer>,
    events: Vec<EngineEvent>,
}

impl Engine {
    /// Create an engine holding one freshly filled layer and an empty history.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let segments = SegmentSettings::from_config(&config);
        let layers = LayerStack::empty(
            config.canvas_width,
            config.canvas_height,
            config.layer_hue_start,
            config.layer_hue_step,
        );
        let mut engine = Self {
            segments,
            layers,
            history: History::new(config.max_history),
            stroke: None,
            renderer: PreviewRenderer::new(
                config.preview_width,
                config.preview_height,
                config.background_color(),
            ),
            options: CompositeOptions {
                background: config.background_color(),
                isolate: false,
            },
            show_guides: config.show_guides,
            composite: None,
            display: None,
            preview: None,
            events: Vec::new(),
            config,
        };

        let wedge = engine.wedge();
        let first = NewLayer {
            opacity: engine.config.default_layer_opacity,
            ..NewLayer::default()
        };
        engine.layers.add_layer(first, &wedge);
        log::info!(
            "engine ready: {}x{} canvas, {} segments",
            engine.config.canvas_width,
            engine.config.canvas_height,
            engine.segments.count
        );
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn canvas_size(&self) -> (usize, usize) {
        (self.layers.width(), self.layers.height())
    }

    pub fn segment_count(&self) -> usize {
        self.segments.count
    }

    /// The wedge all drawing is clipped to.
    pub fn wedge(&self) -> Wedge {
        self.segments.wedge(self.layers.width(), self.layers.height())
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn current_layer(&self) -> Option<&Layer> {
        self.layers.current()
    }

    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: EngineEvent) {
        if !self.events.contains(&event) {
            self.events.push(event);
        }
    }

    fn invalidate(&mut self) {
        self.composite = None;
        self.display = None;
        self.preview = None;
    }

    fn pixels_changed(&mut self) {
        self.invalidate();
        self.emit(EngineEvent::PixelsChanged);
    }

    fn layers_changed(&mut self) {
        self.invalidate();
        self.emit(EngineEvent::LayersChanged);
    }

    // ---- history ---------------------------------------------------------

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            segment_count: self.segments.count,
            current_index: self.layers.current_index(),
            layers: self.layers.layers().to_vec(),
        }
    }

    /// Record the current state as an undo step.
    pub fn save(&mut self) {
        let snapshot = self.snapshot();
        self.history.push(snapshot);
        self.emit(EngineEvent::HistoryChanged);
    }

    fn restore(&mut self, snapshot: Snapshot) {
        let segments_changed = snapshot.segment_count != self.segments.count;
        if let Err(err) = self.segments.set_count(snapshot.segment_count) {
            log::error!("history entry has a bad segment count: {err}");
            return;
        }
        if let Err(err) = self.layers.replace_all(snapshot.layers, snapshot.current_index) {
            log::error!("history entry could not be restored: {err}");
            return;
        }
        if segments_changed {
            self.emit(EngineEvent::SegmentsChanged);
        }
        self.layers_changed();
        self.pixels_changed();
    }

    /// Step back one snapshot. Returns `false` (and does nothing) when there is none.
    pub fn undo(&mut self) -> bool {
        self.cancel_stroke();
        let current = self.snapshot();
        let Some(previous) = self.history.undo(current) else {
            return false;
        };
        log::debug!("undo");
        self.restore(previous);
        self.emit(EngineEvent::HistoryChanged);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_stroke();
        let current = self.snapshot();
        let Some(next) = self.history.redo(current) else {
            return false;
        };
        log::debug!("redo");
        self.restore(next);
        self.emit(EngineEvent::HistoryChanged);
        true
    }

    /// `(undo, redo)` step counts.
    pub fn history_depth(&self) -> (usize, usize) {
        self.history.depth()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.emit(EngineEvent::HistoryChanged);
    }

    // ---- layer commands --------------------------------------------------

    /// Append a layer and make it current. Returns its index.
    pub fn add_layer(&mut self, params: NewLayer) -> Result<usize> {
        if let Some(pixels) = &params.pixels {
            let (w, h) = self.canvas_size();
            if (pixels.width(), pixels.height()) != (w, h) {
                return Err(EngineError::MalformedProject(format!(
                    "layer pixels are {}x{}, canvas is {w}x{h}",
                    pixels.width(),
                    pixels.height()
                )));
            }
        }
        self.cancel_stroke();
        self.save();
        let wedge = self.wedge();
        self.layers.add_layer(params, &wedge);
        self.layers_changed();
        Ok(self.layers.current_index())
    }

    /// Add a layer with the configured defaults.
    pub fn add_default_layer(&mut self) -> Result<usize> {
        self.add_layer(NewLayer {
            opacity: self.config.default_layer_opacity,
            ..NewLayer::default()
        })
    }

    pub fn delete_layer(&mut self) -> Result<()> {
        if self.layers.len() <= 1 {
            log::warn!("refusing to delete the last layer");
            return Err(EngineError::LastLayer);
        }
        self.cancel_stroke();
        self.save();
        let removed = self.layers.delete_current()?;
        log::debug!("deleted layer `{}`", removed.name);
        self.layers_changed();
        Ok(())
    }

    pub fn copy_layer(&mut self) -> Result<usize> {
        self.layers.check_index(self.layers.current_index())?;
        self.cancel_stroke();
        self.save();
        self.layers.copy_current()?;
        self.layers_changed();
        Ok(self.layers.current_index())
    }

    pub fn move_layer(&mut self, from: usize, to: usize) -> Result<()> {
        self.layers.check_index(from)?;
        self.layers.check_index(to)?;
        if from == to {
            return Ok(());
        }
        self.cancel_stroke();
        self.save();
        self.layers.move_layer(from, to)?;
        self.layers_changed();
        Ok(())
    }

    /// Make `index` the layer that receives drawing. Not an undo step.
    pub fn select_layer(&mut self, index: usize) -> Result<()> {
        self.layers.check_index(index)?;
        self.cancel_stroke();
        self.layers.select(index)?;
        self.layers_changed();
        Ok(())
    }

    pub fn set_layer_opacity(&mut self, index: usize, value: f32) -> Result<()> {
        self.layers.check_index(index)?;
        if !value.is_finite() {
            return Err(EngineError::InvalidConfig(format!("opacity {value} is not finite")));
        }
        self.cancel_stroke();
        self.save();
        self.layers.set_opacity(index, value)?;
        self.layers_changed();
        Ok(())
    }

    pub fn toggle_layer_visibility(&mut self, index: usize, visible: bool) -> Result<()> {
        self.layers.check_index(index)?;
        self.cancel_stroke();
        self.save();
        self.layers.set_visibility(index, visible)?;
        self.layers_changed();
        Ok(())
    }

    /// Parse `#rrggbb` and recolor the layer's painted pixels.
    pub fn set_layer_color(&mut self, index: usize, hex: &str) -> Result<()> {
        let color = Color32::from_hex_rgb(hex)?;
        self.layers.check_index(index)?;
        self.cancel_stroke();
        self.save();
        self.layers.set_color(index, color)?;
        self.layers_changed();
        self.pixels_changed();
        Ok(())
    }

    /// Change the number of segments. Destructive: every layer is cleared and its new
    /// wedge refilled with its color.
    pub fn set_segment_count(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            return Err(EngineError::InvalidSegmentCount(count));
        }
        if count == self.segments.count {
            return Ok(());
        }
        self.cancel_stroke();
        self.save();
        self.segments.set_count(count)?;
        let wedge = self.wedge();
        self.layers.refill_wedges(&wedge);
        log::info!("segment count set to {count}; all layers refilled");
        self.emit(EngineEvent::SegmentsChanged);
        self.pixels_changed();
        Ok(())
    }

    pub fn clear_current_layer(&mut self) -> Result<()> {
        self.layers.check_index(self.layers.current_index())?;
        self.cancel_stroke();
        self.save();
        self.layers.clear_current()?;
        self.pixels_changed();
        Ok(())
    }

    /// Install a complete layer list at once, without recording an undo step.
    /// Nothing changes if the list is rejected.
    pub fn replace_all_layers(
        &mut self,
        layers: Vec<Layer>,
        current: usize,
        segment_count: usize,
    ) -> Result<()> {
        if segment_count == 0 {
            return Err(EngineError::InvalidSegmentCount(segment_count));
        }
        self.cancel_stroke();
        self.layers.replace_all(layers, current)?;
        if self.segments.count != segment_count {
            // Count was validated above.
            self.segments.set_count(segment_count)?;
            self.emit(EngineEvent::SegmentsChanged);
        }
        self.layers_changed();
        self.pixels_changed();
        Ok(())
    }

    // ---- drawing ---------------------------------------------------------

    /// Start a pointer gesture at canvas point `point`. The bucket fills immediately
    /// and leaves no gesture open.
    pub fn stroke_begin(&mut self, point: Vec2, tool: Tool) -> Result<()> {
        self.cancel_stroke();
        if let Tool::Bucket { threshold, color } = tool {
            let fill = FloodFill {
                threshold,
                max_pixels: self.config.fill_max_pixels,
            };
            self.fill_with(fill, point, color)?;
            return Ok(());
        }

        let Some(layer) = self.layers.current() else {
            return Err(EngineError::LayerIndexOutOfRange {
                index: self.layers.current_index(),
                len: self.layers.len(),
            });
        };
        let stroke = StrokeState::new(tool, point, &layer.pixels);
        self.save();
        self.stroke = Some(stroke);
        Ok(())
    }

    /// Extend the open gesture to `point`. Ignored without one.
    pub fn stroke_update(&mut self, point: Vec2) {
        let wedge = self.wedge();
        let (Some(stroke), Some(layer)) = (self.stroke.as_mut(), self.layers.current_mut()) else {
            return;
        };
        stroke.add_point(&mut layer.pixels, &wedge, point);
        self.pixels_changed();
    }

    /// Close the open gesture. Whatever was drawn stays; undo is the way back.
    pub fn stroke_end(&mut self) {
        if let Some(mut stroke) = self.stroke.take() {
            stroke.end();
        }
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    fn cancel_stroke(&mut self) {
        self.stroke_end();
    }

    /// Bucket fill at `point` (rounded to the nearest pixel) with the configured threshold.
    pub fn flood_fill(&mut self, point: Vec2, color: Color32) -> Result<FillOutcome> {
        let fill = FloodFill::from_config(&self.config);
        self.fill_with(fill, point, color)
    }

    fn fill_with(&mut self, fill: FloodFill, point: Vec2, color: Color32) -> Result<FillOutcome> {
        let (x, y) = (point.x.round() as i32, point.y.round() as i32);
        let index = self.layers.current_index();
        let Some(layer) = self.layers.current() else {
            return Err(EngineError::LayerIndexOutOfRange {
                index,
                len: self.layers.len(),
            });
        };
        if let Err(reason) = fill.check_seed(&layer.pixels, x, y) {
            log::debug!("bucket at ({x}, {y}) ignored: {reason:?}");
            return Ok(FillOutcome::Rejected(reason));
        }

        self.save();
        let wedge = self.wedge();
        let Some(layer) = self.layers.current_mut() else {
            return Err(EngineError::LayerIndexOutOfRange {
                index,
                len: self.layers.len(),
            });
        };
        let outcome = fill.fill(&mut layer.pixels, &wedge, x, y, color);
        self.pixels_changed();
        Ok(outcome)
    }

    // ---- view settings ---------------------------------------------------

    pub fn isolate(&self) -> bool {
        self.options.isolate
    }

    pub fn set_isolate(&mut self, isolate: bool) {
        if self.options.isolate != isolate {
            self.options.isolate = isolate;
            self.invalidate();
            self.emit(EngineEvent::ViewSettingsChanged);
        }
    }

    pub fn show_guides(&self) -> bool {
        self.show_guides
    }

    pub fn set_show_guides(&mut self, show: bool) {
        if self.show_guides != show {
            self.show_guides = show;
            self.display = None;
            self.emit(EngineEvent::ViewSettingsChanged);
        }
    }

    pub fn background(&self) -> Color32 {
        self.options.background
    }

    pub fn set_background(&mut self, color: Color32) {
        if self.options.background != color {
            self.options.background = color;
            self.renderer.set_background(color);
            self.invalidate();
            self.emit(EngineEvent::ViewSettingsChanged);
        }
    }

    /// Refit the preview to a new destination size. Zero sizes are ignored.
    pub fn resize_preview(&mut self, width: usize, height: usize) {
        if self.renderer.size() != (width, height) && width > 0 && height > 0 {
            log::debug!("preview resized to {width}x{height}");
            self.renderer.resize(width, height);
            self.preview = None;
            self.emit(EngineEvent::ViewSettingsChanged);
        }
    }

    // ---- queries ---------------------------------------------------------

    /// Flattened layers over the background, without guides.
    pub fn composite(&mut self) -> &PixelBuffer {
        let options = self.options;
        self.composite
            .get_or_insert_with(|| compose(&self.layers, options))
    }

    /// What the drawing view shows: the composite plus guides when enabled.
    pub fn display_composite(&mut self) -> &PixelBuffer {
        let display = match self.display.take() {
            Some(display) => display,
            None => {
                let mut display = self.composite().clone();
                if self.show_guides {
                    let wedge = self.wedge();
                    draw_guides(
                        &mut display,
                        &wedge,
                        self.config.guide_color32(),
                        self.config.guide_width,
                    );
                }
                display
            }
        };
        self.display.insert(display)
    }

    /// The kaleidoscope view of the composite.
    pub fn preview(&mut self) -> &PixelBuffer {
        let preview = match self.preview.take() {
            Some(preview) => preview,
            None => {
                let wedge = self.wedge();
                let composite = self.composite().clone();
                self.renderer.render(&composite, &wedge)
            }
        };
        self.preview.insert(preview)
    }

    /// Ordered metadata for the layers panel.
    pub fn layer_list(&self) -> Vec<LayerInfo> {
        self.layers.infos()
    }
}
