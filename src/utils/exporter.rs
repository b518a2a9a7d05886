use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, ScaleFont, point};
use eframe::egui::{Color32, FontDefinitions};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::canvas::Engine;
use crate::canvas::layers::LayerStack;
use crate::canvas::surface::PixelBuffer;
use crate::error::{EngineError, Result};
use crate::utils::color::ColorManipulation;

/// Height of the name strip under each cell of the layer grid.
const LABEL_HEIGHT: u32 = 28;
const LABEL_SIZE: f32 = 18.0;
const LABEL_FONT: &str = "Ubuntu-Light";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    PNG,
    JPEG,
}

impl ExportFormat {
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::PNG => "PNG",
            ExportFormat::JPEG => "JPEG",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::PNG => "png",
            ExportFormat::JPEG => "jpg",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            ExportFormat::PNG => ImageFormat::Png,
            ExportFormat::JPEG => ImageFormat::Jpeg,
        }
    }
}

/// Unpremultiplied RGBA copy of a pixel buffer.
pub fn to_rgba_image(buffer: &PixelBuffer) -> Result<RgbaImage> {
    RgbaImage::from_raw(
        buffer.width() as u32,
        buffer.height() as u32,
        buffer.to_rgba_unmultiplied(),
    )
    .ok_or_else(|| EngineError::InvalidConfig("buffer size overflows an image".into()))
}

/// Save an image to disk. JPEG drops the alpha channel.
pub fn save_image(img: &RgbaImage, path: impl Into<PathBuf>, format: ExportFormat) -> Result<()> {
    let path = path.into();
    match format {
        ExportFormat::PNG => img.save_with_format(&path, format.image_format())?,
        ExportFormat::JPEG => image::DynamicImage::ImageRgba8(img.clone())
            .to_rgb8()
            .save_with_format(&path, format.image_format())?,
    }
    log::info!("exported {}x{} image to {}", img.width(), img.height(), path.display());
    Ok(())
}

/// Export the kaleidoscope preview.
pub fn export_preview(engine: &mut Engine, path: &Path, format: ExportFormat) -> Result<()> {
    let img = to_rgba_image(engine.preview())?;
    save_image(&img, path, format)
}

/// Export every layer side by side with its name burned in underneath.
pub fn export_layer_grid(engine: &Engine, path: &Path, format: ExportFormat) -> Result<()> {
    let font = label_font();
    let img = layer_grid(engine.layers(), engine.background(), font.as_ref());
    save_image(&img, path, format)
}

/// egui's bundled UI font, reused for labels.
pub fn label_font() -> Option<FontArc> {
    let defs = FontDefinitions::default();
    let data = defs.font_data.get(LABEL_FONT)?;
    match FontArc::try_from_vec(data.font.to_vec()) {
        Ok(font) => Some(font),
        Err(err) => {
            log::warn!("label font unusable, exporting without names: {err}");
            None
        }
    }
}

/// Tile all layers (bottom layer first, row-major) into one image. Each cell shows the
/// layer at full alpha over `background`; visibility and opacity are ignored.
pub fn layer_grid(stack: &LayerStack, background: Color32, font: Option<&FontArc>) -> RgbaImage {
    let count = stack.len().max(1) as u32;
    let cols = (count as f32).sqrt().ceil() as u32;
    let rows = count.div_ceil(cols);
    let cell_w = stack.width() as u32;
    let cell_h = stack.height() as u32 + LABEL_HEIGHT;

    let [br, bg, bb] = background.rgb();
    let mut out = RgbaImage::from_pixel(cols * cell_w, rows * cell_h, Rgba([br, bg, bb, 255]));
    let text_color = if background.rgb().iter().map(|&c| c as u32).sum::<u32>() > 382 {
        [0, 0, 0]
    } else {
        [255, 255, 255]
    };

    for (i, layer) in stack.layers().iter().enumerate() {
        let (col, row) = (i as u32 % cols, i as u32 / cols);
        let (x0, y0) = (col * cell_w, row * cell_h);

        let mut cell = PixelBuffer::filled(stack.width(), stack.height(), background);
        cell.blend_from(&layer.pixels, 255);
        for (idx, px) in cell.pixels().iter().enumerate() {
            let x = x0 + (idx % stack.width()) as u32;
            let y = y0 + (idx / stack.width()) as u32;
            out.put_pixel(x, y, Rgba(px.to_srgba_unmultiplied()));
        }

        if let Some(font) = font {
            let baseline = (y0 + stack.height() as u32) as f32 + LABEL_HEIGHT as f32 * 0.75;
            draw_text(&mut out, font, &layer.name, x0 as f32 + 6.0, baseline, text_color);
        }
    }
    out
}

/// Rasterize `text` with its baseline at `y`, blending by glyph coverage.
pub fn draw_text(img: &mut RgbaImage, font: &FontArc, text: &str, x: f32, y: f32, rgb: [u8; 3]) {
    let scaled = font.as_scaled(LABEL_SIZE);
    let mut cx = x;
    let mut prev = None;
    for ch in text.chars() {
        let gid = font.glyph_id(ch);
        if let Some(prev) = prev {
            cx += scaled.kern(prev, gid);
        }
        let glyph = gid.with_scale_and_position(LABEL_SIZE, point(cx, y));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;
                if px < 0 || py < 0 || px >= img.width() as i64 || py >= img.height() as i64 {
                    return;
                }
                let dst = img.get_pixel_mut(px as u32, py as u32);
                let a = coverage.clamp(0.0, 1.0);
                for c in 0..3 {
                    let blended = rgb[c] as f32 * a + dst.0[c] as f32 * (1.0 - a);
                    dst.0[c] = blended.round() as u8;
                }
            });
        }
        cx += scaled.h_advance(gid);
        prev = Some(gid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::layers::NewLayer;
    use crate::canvas::segment::Wedge;
    use crate::utils::vector::Vec2;

    fn stack(n: usize) -> LayerStack {
        let mut stack = LayerStack::empty(20, 20, 60.0, 15.0);
        let wedge = Wedge::new(1, Vec2::new(10.0, 10.0), 100.0);
        for _ in 0..n {
            stack.add_layer(NewLayer::default(), &wedge);
        }
        stack
    }

    #[test]
    fn grid_is_square_ish_with_label_strips() {
        let img = layer_grid(&stack(5), Color32::WHITE, None);
        assert_eq!(img.width(), 3 * 20);
        assert_eq!(img.height(), 2 * (20 + LABEL_HEIGHT));
        // First cell shows the first layer at full alpha.
        assert_eq!(img.get_pixel(5, 5).0, [255, 255, 0, 255]);
        // Empty sixth cell keeps the background.
        assert_eq!(img.get_pixel(45, 55).0, [255, 255, 255, 255]);
    }

    #[test]
    fn labels_are_burned_in() {
        let Some(font) = label_font() else {
            return;
        };
        let img = layer_grid(&stack(1), Color32::WHITE, Some(&font));
        let strip_has_ink = (0..20)
            .flat_map(|x| (20..20 + LABEL_HEIGHT).map(move |y| (x, y)))
            .any(|(x, y)| img.get_pixel(x, y).0[0] < 128);
        assert!(strip_has_ink);
    }

    #[test]
    fn png_export_writes_a_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.png");
        let img = layer_grid(&stack(2), Color32::BLACK, None);
        save_image(&img, &path, ExportFormat::PNG).unwrap();
        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back.dimensions(), img.dimensions());
    }
}
