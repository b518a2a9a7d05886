use std::path::PathBuf;

use crate::PainterApp;
use crate::brush_engine::tool::ToolKind;
use crate::utils::exporter::{ExportFormat, export_layer_grid, export_preview};
use crate::utils::project::ProjectFile;
use eframe::egui;

const MAX_SEGMENTS: usize = 64;

fn pick_save(default_name: &str, filter: (&str, &[&str])) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_file_name(default_name)
        .add_filter(filter.0, filter.1)
        .save_file()
}

fn pick_open(filter: (&str, &[&str])) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(filter.0, filter.1)
        .pick_file()
}

pub fn top_bar(app: &mut PainterApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("quick_settings").show(ctx, |ui| {
        ui.horizontal_wrapped(|ui| {
            for kind in ToolKind::ALL {
                ui.selectable_value(&mut app.session.tool, kind, kind.label());
            }
            ui.separator();

            ui.label("Size");
            ui.add(egui::Slider::new(&mut app.session.brush_size, 1.0..=100.0));
            ui.separator();

            ui.label("Segments");
            let field = ui.add(
                egui::DragValue::new(&mut app.ui.segments_input).range(1..=MAX_SEGMENTS),
            );
            let requested = app.ui.segments_input;
            let commit = field.lost_focus() || field.drag_stopped();
            if commit && requested != app.session.engine.segment_count() {
                app.ui.pending_segments = Some(requested);
            }
            ui.separator();

            let engine = &mut app.session.engine;
            if ui
                .add_enabled(engine.can_undo(), egui::Button::new("Undo"))
                .clicked()
            {
                engine.undo();
            }
            if ui
                .add_enabled(engine.can_redo(), egui::Button::new("Redo"))
                .clicked()
            {
                engine.redo();
            }
            ui.separator();

            let mut guides = engine.show_guides();
            if ui.checkbox(&mut guides, "Guides").changed() {
                engine.set_show_guides(guides);
            }
            let mut isolate = engine.isolate();
            if ui.checkbox(&mut isolate, "Isolate").changed() {
                engine.set_isolate(isolate);
            }
            let mut background = engine.background();
            if egui::color_picker::color_edit_button_srgba(
                ui,
                &mut background,
                egui::color_picker::Alpha::Opaque,
            )
            .changed()
            {
                engine.set_background(background);
            }
            ui.checkbox(&mut app.ui.show_layers, "Layers");
            ui.checkbox(&mut app.ui.show_preview, "Preview");
            ui.separator();

            ui.menu_button("File", |ui| file_menu(app, ui));
        });
    });
}

fn file_menu(app: &mut PainterApp, ui: &mut egui::Ui) {
    const PROJECT: (&str, &[&str]) = ("Project", &["json"]);
    const PNG: (&str, &[&str]) = ("PNG", &["png"]);

    if ui.button("Save project...").clicked() {
        ui.close_menu();
        if let Some(path) = pick_save("kaleidoscope.json", PROJECT) {
            let result = ProjectFile::capture(&app.session.engine).and_then(|p| p.save(&path));
            if app.ui.report("Save project", result).is_some() {
                app.ui.status = Some(format!("Saved {}", path.display()));
            }
        }
    }
    if ui.button("Open project...").clicked() {
        ui.close_menu();
        if let Some(path) = pick_open(PROJECT) {
            let result =
                ProjectFile::load(&path).and_then(|p| p.apply(&mut app.session.engine));
            if app.ui.report("Open project", result).is_some() {
                app.ui.status = Some(format!("Opened {}", path.display()));
            }
        }
    }
    ui.separator();
    let format = ExportFormat::PNG;
    if ui.button("Export preview...").clicked() {
        ui.close_menu();
        let name = format!("kaleidoscope.{}", format.extension());
        if let Some(path) = pick_save(&name, PNG) {
            let result = export_preview(&mut app.session.engine, &path, format);
            if app.ui.report("Export preview", result).is_some() {
                app.ui.status = Some(format!("Exported {}", path.display()));
            }
        }
    }
    if ui.button("Export layers...").clicked() {
        ui.close_menu();
        let name = format!("layers.{}", format.extension());
        if let Some(path) = pick_save(&name, PNG) {
            let result = export_layer_grid(&app.session.engine, &path, format);
            if app.ui.report("Export layers", result).is_some() {
                app.ui.status = Some(format!("Exported {}", path.display()));
            }
        }
    }
}

/// Changing the segment count wipes every layer, so ask first.
pub fn segment_confirm_dialog(app: &mut PainterApp, ctx: &egui::Context) {
    let Some(count) = app.ui.pending_segments else {
        return;
    };
    let mut decision = None;
    egui::Window::new("Change segments?")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.label(format!(
                "Switching to {count} segments clears every layer and refills it with its color."
            ));
            ui.label("The change can be undone.");
            ui.horizontal(|ui| {
                if ui.button("Change").clicked() {
                    decision = Some(true);
                }
                if ui.button("Cancel").clicked() {
                    decision = Some(false);
                }
            });
        });

    match decision {
        Some(true) => {
            app.ui.pending_segments = None;
            let result = app.session.engine.set_segment_count(count);
            app.ui.report("Change segments", result);
        }
        Some(false) => {
            app.ui.pending_segments = None;
            app.ui.segments_input = app.session.engine.segment_count();
        }
        None => {}
    }
}
