//! Saved-project format: JSON with every layer embedded as a PNG data URL.

use std::io::Cursor;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use eframe::egui::Color32;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};

use crate::canvas::Engine;
use crate::canvas::layers::Layer;
use crate::canvas::surface::PixelBuffer;
use crate::error::{EngineError, Result};
use crate::utils::color::ColorManipulation;
use crate::utils::exporter::to_rgba_image;

/// Newest schema this build reads and the one it writes.
pub const PROJECT_VERSION: u32 = 1;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub version: u32,
    pub segments: usize,
    pub layers: Vec<ProjectLayer>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectLayer {
    pub name: String,
    pub opacity: f32,
    pub visible: bool,
    /// `#rrggbb`
    pub color: String,
    /// Self-contained image data URL.
    pub image: String,
}

impl ProjectFile {
    /// Snapshot the engine's document.
    pub fn capture(engine: &Engine) -> Result<Self> {
        let layers = engine
            .layers()
            .layers()
            .iter()
            .map(|layer| {
                Ok(ProjectLayer {
                    name: layer.name.clone(),
                    opacity: layer.opacity,
                    visible: layer.visible,
                    color: layer.color.to_hex_rgb(),
                    image: encode_data_url(&layer.pixels)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            version: PROJECT_VERSION,
            segments: engine.segment_count(),
            layers,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("saved project ({} layers) to {}", self.layers.len(), path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Decode every layer for a `width` × `height` canvas. Fails as a whole on the first
    /// bad layer. Images of another size are resampled to fit.
    pub fn into_layers(self, width: usize, height: usize) -> Result<(Vec<Layer>, usize)> {
        if self.version > PROJECT_VERSION {
            return Err(EngineError::UnsupportedVersion(self.version));
        }
        if self.segments == 0 {
            return Err(EngineError::InvalidSegmentCount(0));
        }
        if self.layers.is_empty() {
            return Err(EngineError::MalformedProject("project has no layers".into()));
        }

        let layers = self
            .layers
            .into_iter()
            .map(|layer| {
                let color = Color32::from_hex_rgb(&layer.color)?;
                let pixels = decode_data_url(&layer.image, width, height).map_err(|err| {
                    EngineError::MalformedProject(format!("layer `{}`: {err}", layer.name))
                })?;
                Ok(Layer {
                    name: layer.name,
                    opacity: layer.opacity.clamp(0.0, 1.0),
                    visible: layer.visible,
                    color,
                    pixels,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((layers, self.segments))
    }

    /// Replace the engine's document with this project. The engine is untouched on error.
    /// History is cleared on success.
    pub fn apply(self, engine: &mut Engine) -> Result<()> {
        let (width, height) = engine.canvas_size();
        let (layers, segments) = self.into_layers(width, height)?;
        let count = layers.len();
        engine.replace_all_layers(layers, 0, segments)?;
        engine.clear_history();
        log::info!("loaded project with {count} layers, {segments} segments");
        Ok(())
    }
}

/// Encode pixels as a `data:image/png;base64,` URL.
pub fn encode_data_url(buffer: &PixelBuffer) -> Result<String> {
    let img = to_rgba_image(buffer)?;
    let mut png = Vec::new();
    DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(format!("{DATA_URL_PREFIX}{}", STANDARD.encode(png)))
}

/// Decode an image data URL (any raster format `image` understands) to a buffer of the
/// requested size.
pub fn decode_data_url(url: &str, width: usize, height: usize) -> Result<PixelBuffer> {
    let payload = match url.split_once(";base64,") {
        Some((mime, payload)) if mime.starts_with("data:image/") => payload,
        _ => return Err(EngineError::MalformedProject("image is not a base64 data URL".into())),
    };
    let bytes = STANDARD.decode(payload.trim())?;
    let mut img = image::load_from_memory(&bytes)?.to_rgba8();
    if img.dimensions() != (width as u32, height as u32) {
        log::debug!(
            "resampling {}x{} layer image to {width}x{height}",
            img.width(),
            img.height()
        );
        img = image::imageops::resize(&img, width as u32, height as u32, FilterType::Triangle);
    }
    PixelBuffer::from_rgba_unmultiplied(width, height, img.as_raw())
        .ok_or_else(|| EngineError::MalformedProject("decoded image has the wrong size".into()))
}
