use crate::brush_engine::tool::{Tool, ToolKind};
use crate::canvas::engine::Engine;
use crate::canvas::view::ViewTransform;
use crate::config::ViewConfig;
use crate::error::Result;
use crate::utils::vector::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Other,
}

/// The single pointer interaction in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Gesture {
    #[default]
    Idle,
    Drawing,
    Panning,
    Pinching,
}

/// Interactive state around an [`Engine`]: selected tool, brush size, view transform and
/// the active gesture. Screen points are relative to the drawing viewport.
pub struct Session {
    pub engine: Engine,
    pub view: ViewTransform,
    pub tool: ToolKind,
    pub brush_size: f32,
    gesture: Gesture,
    touches: Vec<(u64, Vec2)>,
}

impl Session {
    pub fn new(engine: Engine, view_config: ViewConfig) -> Self {
        Self {
            engine,
            view: ViewTransform::new(view_config),
            tool: ToolKind::Brush,
            brush_size: 10.0,
            gesture: Gesture::Idle,
            touches: Vec::new(),
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Selected tool bound to the brush size and the current layer's color.
    pub fn active_tool(&self) -> Tool {
        let color = self
            .engine
            .current_layer()
            .map(|layer| layer.color)
            .unwrap_or(eframe::egui::Color32::BLACK);
        self.tool
            .with(self.brush_size, color, self.engine.config().fill_alpha_threshold)
    }

    fn begin_drawing(&mut self, screen: Vec2) -> Result<()> {
        let point = self.view.screen_to_canvas(screen);
        let tool = self.active_tool();
        self.engine.stroke_begin(point, tool)?;
        if self.engine.is_stroking() {
            self.gesture = Gesture::Drawing;
        }
        Ok(())
    }

    fn stop(&mut self) {
        match self.gesture {
            Gesture::Drawing => self.engine.stroke_end(),
            Gesture::Panning => self.view.end_pan(),
            Gesture::Pinching => self.view.end_pinch(),
            Gesture::Idle => {}
        }
        self.gesture = Gesture::Idle;
    }

    /// Primary button draws, middle button pans. Ignored while another gesture runs.
    pub fn pointer_down(&mut self, screen: Vec2, button: PointerButton) -> Result<()> {
        if self.gesture != Gesture::Idle {
            return Ok(());
        }
        match button {
            PointerButton::Middle => {
                self.view.begin_pan(screen);
                self.gesture = Gesture::Panning;
                Ok(())
            }
            PointerButton::Primary => self.begin_drawing(screen),
            PointerButton::Other => Ok(()),
        }
    }

    pub fn pointer_move(&mut self, screen: Vec2) {
        match self.gesture {
            Gesture::Drawing => {
                let point = self.view.screen_to_canvas(screen);
                self.engine.stroke_update(point);
            }
            Gesture::Panning => self.view.update_pan(screen),
            Gesture::Pinching | Gesture::Idle => {}
        }
    }

    pub fn pointer_up(&mut self, button: PointerButton) {
        match (self.gesture, button) {
            (Gesture::Drawing, PointerButton::Primary) | (Gesture::Panning, PointerButton::Middle) => {
                self.stop()
            }
            _ => {}
        }
    }

    /// Leaving the drawing surface cancels a stroke; painted pixels stay.
    pub fn pointer_leave(&mut self) {
        if self.gesture == Gesture::Drawing {
            self.stop();
        }
    }

    /// One finger draws; a second finger cancels the stroke and starts a pinch.
    pub fn touch_start(&mut self, id: u64, screen: Vec2) -> Result<()> {
        self.touches.retain(|(tid, _)| *tid != id);
        self.touches.push((id, screen));
        match self.touches.len() {
            1 if self.gesture == Gesture::Idle => self.begin_drawing(screen),
            2 => {
                self.stop();
                let (a, b) = (self.touches[0].1, self.touches[1].1);
                self.view.begin_pinch(a, b);
                self.gesture = Gesture::Pinching;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn touch_move(&mut self, id: u64, screen: Vec2) {
        let Some(slot) = self.touches.iter_mut().find(|(tid, _)| *tid == id) else {
            return;
        };
        slot.1 = screen;
        match self.gesture {
            Gesture::Drawing => self.pointer_move(screen),
            Gesture::Pinching if self.touches.len() >= 2 => {
                let (a, b) = (self.touches[0].1, self.touches[1].1);
                self.view.update_pinch(a, b);
            }
            _ => {}
        }
    }

    /// Lifting any finger ends the gesture; drawing does not resume until a new touch.
    pub fn touch_end(&mut self, id: u64) {
        self.touches.retain(|(tid, _)| *tid != id);
        if self.gesture == Gesture::Pinching && self.touches.len() >= 2 {
            return;
        }
        self.stop();
    }

    /// Wheel zoom toward the pointer. Not a gesture; works at any time.
    pub fn wheel(&mut self, screen: Vec2, notches: f32) {
        self.view.wheel(screen, notches);
    }
}
