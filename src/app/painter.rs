use eframe::egui;
use eframe::egui::{ColorImage, TextureHandle, TextureOptions};

use crate::app::input_handler;
use crate::app::state::UiState;
use crate::canvas::{Engine, EngineEvent, Session};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::ui;
use crate::utils::vector::Vec2;

const MIN_PREVIEW_SIDE: f32 = 64.0;

/// Keeps an egui texture in sync with a pixel buffer that is re-uploaded only when marked
/// dirty.
struct SyncedTexture {
    name: &'static str,
    handle: Option<TextureHandle>,
    dirty: bool,
}

impl SyncedTexture {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            handle: None,
            dirty: true,
        }
    }

    fn upload(&mut self, ctx: &egui::Context, image: impl FnOnce() -> ColorImage) -> &TextureHandle {
        let handle = match self.handle.take() {
            Some(mut handle) => {
                if self.dirty {
                    handle.set(image(), TextureOptions::NEAREST);
                }
                handle
            }
            None => ctx.load_texture(self.name, image(), TextureOptions::NEAREST),
        };
        self.dirty = false;
        self.handle.insert(handle)
    }
}

pub struct PainterApp {
    pub(crate) session: Session,
    pub(crate) ui: UiState,
    canvas_texture: SyncedTexture,
    preview_texture: SyncedTexture,
}

impl PainterApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: EngineConfig) -> Result<Self> {
        let view = config.view.clone();
        let engine = Engine::new(config)?;
        let ui = UiState::new(engine.segment_count());
        Ok(Self {
            session: Session::new(engine, view),
            ui,
            canvas_texture: SyncedTexture::new("canvas"),
            preview_texture: SyncedTexture::new("preview"),
        })
    }

    fn drain_events(&mut self) {
        for event in self.session.engine.take_events() {
            match event {
                EngineEvent::PixelsChanged
                | EngineEvent::LayersChanged
                | EngineEvent::ViewSettingsChanged => {
                    self.canvas_texture.dirty = true;
                    self.preview_texture.dirty = true;
                }
                EngineEvent::SegmentsChanged => {
                    self.ui.segments_input = self.session.engine.segment_count();
                    self.canvas_texture.dirty = true;
                    self.preview_texture.dirty = true;
                }
                EngineEvent::HistoryChanged => {}
            }
        }
    }

    fn canvas_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::from_gray(40)))
            .show(ctx, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
                let (w, h) = self.session.engine.canvas_size();
                self.session.view.set_viewport(
                    Vec2::new(rect.width(), rect.height()),
                    Vec2::new(w as f32, h as f32),
                );

                input_handler::handle_canvas_input(self, ctx, &response, rect);
                self.drain_events();

                let engine = &mut self.session.engine;
                let texture = self
                    .canvas_texture
                    .upload(ctx, || engine.display_composite().to_color_image());

                let offset = self.session.view.offset();
                let size = self.session.view.displayed_size();
                let image_rect = egui::Rect::from_min_size(
                    rect.min + egui::vec2(offset.x, offset.y),
                    egui::vec2(size.x, size.y),
                );
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                ui.painter_at(rect)
                    .image(texture.id(), image_rect, uv, egui::Color32::WHITE);
            });
    }

    fn preview_window(&mut self, ctx: &egui::Context) {
        let mut open = self.ui.show_preview;
        egui::Window::new("Preview")
            .open(&mut open)
            .default_width(320.0)
            .show(ctx, |ui| {
                let largest = self.session.engine.config().preview_width as f32;
                let side = ui
                    .available_width()
                    .round()
                    .clamp(MIN_PREVIEW_SIDE, largest.max(MIN_PREVIEW_SIDE))
                    as usize;
                self.session.engine.resize_preview(side, side);
                self.drain_events();

                let engine = &mut self.session.engine;
                let texture = self
                    .preview_texture
                    .upload(ctx, || engine.preview().to_color_image());
                ui.image((texture.id(), texture.size_vec2()));
            });
        self.ui.show_preview = open;
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let (undo, redo) = self.session.engine.history_depth();
                ui.label(format!(
                    "{} segments | zoom {:.0}% | undo {undo} / redo {redo}",
                    self.session.engine.segment_count(),
                    self.session.view.scale() * 100.0,
                ));
                let mut dismissed = false;
                if let Some(status) = &self.ui.status {
                    ui.separator();
                    ui.label(status);
                    dismissed = ui.small_button("x").clicked();
                }
                if dismissed {
                    self.ui.status = None;
                }
            });
        });
    }
}

impl eframe::App for PainterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        input_handler::handle_shortcuts(self, ctx);

        ui::top_bar::top_bar(self, ctx);
        ui::top_bar::segment_confirm_dialog(self, ctx);
        self.status_bar(ctx);
        if self.ui.show_layers {
            ui::layers::layers_window(ctx, self);
        }
        self.drain_events();
        self.preview_window(ctx);
        self.canvas_panel(ctx);

        if self.session.engine.is_stroking() {
            ctx.request_repaint();
        }
    }
}
