use eframe::egui;

use crate::PainterApp;
use crate::canvas::session::PointerButton;
use crate::utils::vector::Vec2;

/// Wheel deltas in points are converted to notches at this rate.
const POINTS_PER_NOTCH: f32 = 50.0;

/// Ctrl+Z undo, Ctrl+Y / Ctrl+Shift+Z redo.
pub fn handle_shortcuts(app: &mut PainterApp, ctx: &egui::Context) {
    if ctx.wants_keyboard_input() {
        return;
    }
    let (redo, undo) = ctx.input_mut(|i| {
        let redo = i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::Z)
            || i.consume_key(egui::Modifiers::COMMAND, egui::Key::Y);
        let undo = !redo && i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z);
        (redo, undo)
    });
    if redo && !app.session.engine.redo() {
        log::debug!("nothing to redo");
    }
    if undo && !app.session.engine.undo() {
        log::debug!("nothing to undo");
    }
}

fn map_button(button: egui::PointerButton) -> PointerButton {
    match button {
        egui::PointerButton::Primary => PointerButton::Primary,
        egui::PointerButton::Middle => PointerButton::Middle,
        _ => PointerButton::Other,
    }
}

/// Route this frame's raw pointer, wheel and touch events on the canvas area into the
/// session. Positions are made relative to `rect`.
pub fn handle_canvas_input(
    app: &mut PainterApp,
    ctx: &egui::Context,
    response: &egui::Response,
    rect: egui::Rect,
) {
    let local = |pos: egui::Pos2| Vec2::from(pos - rect.min);
    let events = ctx.input(|i| i.events.clone());
    // egui mirrors the first finger as pointer events; touches are handled on their own.
    let has_touch = events.iter().any(|e| matches!(e, egui::Event::Touch { .. }));
    let hovered = response.hovered();

    for event in events {
        match event {
            egui::Event::PointerButton {
                pos,
                button,
                pressed,
                ..
            } if !has_touch => {
                if pressed {
                    if rect.contains(pos) && hovered {
                        let result = app.session.pointer_down(local(pos), map_button(button));
                        app.ui.report("Drawing", result);
                    }
                } else {
                    app.session.pointer_up(map_button(button));
                }
            }
            egui::Event::PointerMoved(pos) if !has_touch => {
                if rect.contains(pos) {
                    app.session.pointer_move(local(pos));
                } else {
                    app.session.pointer_leave();
                }
            }
            egui::Event::PointerGone if !has_touch => app.session.pointer_leave(),
            egui::Event::MouseWheel { unit, delta, .. } => {
                let Some(pos) = ctx.input(|i| i.pointer.hover_pos()) else {
                    continue;
                };
                if !rect.contains(pos) {
                    continue;
                }
                let notches = match unit {
                    egui::MouseWheelUnit::Line => delta.y,
                    egui::MouseWheelUnit::Point => delta.y / POINTS_PER_NOTCH,
                    egui::MouseWheelUnit::Page => delta.y * 3.0,
                };
                app.session.wheel(local(pos), notches);
            }
            egui::Event::Touch { id, phase, pos, .. } => match phase {
                egui::TouchPhase::Start => {
                    if rect.contains(pos) {
                        let result = app.session.touch_start(id.0, local(pos));
                        app.ui.report("Drawing", result);
                    }
                }
                egui::TouchPhase::Move => app.session.touch_move(id.0, local(pos)),
                egui::TouchPhase::End | egui::TouchPhase::Cancel => app.session.touch_end(id.0),
            },
            _ => {}
        }
    }
}
