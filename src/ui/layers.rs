use crate::PainterApp;
use eframe::egui;

/// Sidebar that manages the layer stack. Every edit goes through the engine so it lands
/// in the undo history.
pub fn layers_window(ctx: &egui::Context, app: &mut PainterApp) {
    let mut open = app.ui.show_layers;
    egui::Window::new("Layers")
        .open(&mut open)
        .default_width(240.0)
        .show(ctx, |ui| {
            let engine = &mut app.session.engine;
            let current = engine.layers().current_index();
            let count = engine.layers().len();

            ui.horizontal(|ui| {
                if ui.button("New Layer").clicked() {
                    let result = engine.add_default_layer();
                    app.ui.report("Add layer", result);
                }
                if ui.button("Copy").clicked() {
                    let result = engine.copy_layer();
                    app.ui.report("Copy layer", result);
                }
                if ui.add_enabled(count > 1, egui::Button::new("Delete")).clicked() {
                    let result = engine.delete_layer();
                    app.ui.report("Delete layer", result);
                }
                if ui.button("Clear").clicked() {
                    let result = engine.clear_current_layer();
                    app.ui.report("Clear layer", result);
                }
            });
            ui.horizontal(|ui| {
                if ui.add_enabled(current + 1 < count, egui::Button::new("Up")).clicked() {
                    let result = engine.move_layer(current, current + 1);
                    app.ui.report("Move layer", result);
                }
                if ui.add_enabled(current > 0, egui::Button::new("Down")).clicked() {
                    let result = engine.move_layer(current, current - 1);
                    app.ui.report("Move layer", result);
                }
            });
            ui.separator();

            // Top layers first.
            for info in engine.layer_list().into_iter().rev() {
                ui.horizontal(|ui| {
                    let mut visible = info.visible;
                    if ui.checkbox(&mut visible, "").changed() {
                        let result = engine.toggle_layer_visibility(info.index, visible);
                        app.ui.report("Toggle visibility", result);
                    }

                    let mut rgb = [info.color.r(), info.color.g(), info.color.b()];
                    if egui::color_picker::color_edit_button_srgb(ui, &mut rgb).changed() {
                        let hex = format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]);
                        let result = engine.set_layer_color(info.index, &hex);
                        app.ui.report("Layer color", result);
                    }

                    if ui.selectable_label(info.is_current, &info.name).clicked() {
                        let result = engine.select_layer(info.index);
                        app.ui.report("Select layer", result);
                    }

                    // Applied on release so a drag is one undo step.
                    let id = ui.id().with(("opacity", info.index));
                    let mut opacity = ui
                        .data(|d| d.get_temp::<f32>(id))
                        .unwrap_or(info.opacity);
                    let response =
                        ui.add(egui::Slider::new(&mut opacity, 0.0..=1.0).show_value(false));
                    if response.dragged() {
                        ui.data_mut(|d| d.insert_temp(id, opacity));
                    } else if response.drag_stopped() || response.changed() {
                        ui.data_mut(|d| d.remove::<f32>(id));
                        if opacity != info.opacity {
                            let result = engine.set_layer_opacity(info.index, opacity);
                            app.ui.report("Layer opacity", result);
                        }
                    }
                });
            }
        });
    app.ui.show_layers = open;
}
