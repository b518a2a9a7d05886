use std::path::Path;

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Pan/zoom limits for the drawing viewport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    /// Scale multiplier applied per wheel notch.
    pub zoom_step: f32,
    /// How far (in screen px) the canvas may be dragged past its bounds.
    pub pan_tolerance: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_scale: 1.0,
            max_scale: 4.0,
            zoom_step: 1.12,
            pan_tolerance: 200.0,
        }
    }
}

/// Engine-wide settings. Every field has a default so partial JSON files load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub canvas_width: usize,
    pub canvas_height: usize,
    pub preview_width: usize,
    pub preview_height: usize,

    pub segment_count: usize,
    /// Offset of the wedge center from the canvas center.
    pub segment_offset: [f32; 2],
    /// Wedge radius as a fraction of half the smaller canvas side.
    pub radius_factor: f32,

    pub max_history: usize,
    pub fill_alpha_threshold: u8,
    pub fill_max_pixels: usize,

    pub layer_hue_start: f32,
    pub layer_hue_step: f32,
    pub default_layer_opacity: f32,

    pub background: [u8; 3],
    pub guide_color: [u8; 3],
    pub guide_width: f32,
    pub show_guides: bool,

    pub view: ViewConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 800,
            preview_width: 600,
            preview_height: 600,
            segment_count: 8,
            segment_offset: [-50.0, 100.0],
            radius_factor: 1.0,
            max_history: 50,
            fill_alpha_threshold: 200,
            fill_max_pixels: 200_000,
            layer_hue_start: 60.0,
            layer_hue_step: 15.0,
            default_layer_opacity: 0.5,
            background: [255, 255, 255],
            guide_color: [0, 0, 0],
            guide_width: 2.0,
            show_guides: true,
            view: ViewConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        log::info!("loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(EngineError::InvalidConfig("canvas size must be non-zero".into()));
        }
        if self.preview_width == 0 || self.preview_height == 0 {
            return Err(EngineError::InvalidConfig("preview size must be non-zero".into()));
        }
        if self.segment_count == 0 {
            return Err(EngineError::InvalidSegmentCount(0));
        }
        if !(self.radius_factor > 0.0) {
            return Err(EngineError::InvalidConfig("radius_factor must be positive".into()));
        }
        if self.max_history == 0 {
            return Err(EngineError::InvalidConfig("max_history must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.default_layer_opacity) {
            return Err(EngineError::InvalidConfig(
                "default_layer_opacity must lie in 0..=1".into(),
            ));
        }
        let view = &self.view;
        if !(view.min_scale > 0.0) || view.min_scale > view.max_scale {
            return Err(EngineError::InvalidConfig(format!(
                "view scale range {}..{} is empty",
                view.min_scale, view.max_scale
            )));
        }
        if view.zoom_step <= 1.0 {
            return Err(EngineError::InvalidConfig("zoom_step must exceed 1".into()));
        }
        Ok(())
    }

    pub fn background_color(&self) -> Color32 {
        let [r, g, b] = self.background;
        Color32::from_rgb(r, g, b)
    }

    pub fn guide_color32(&self) -> Color32 {
        let [r, g, b] = self.guide_color;
        Color32::from_rgb(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "segment_count": 6, "view": { "max_scale": 8.0 } }"#)
                .unwrap();
        assert_eq!(config.segment_count, 6);
        assert_eq!(config.view.max_scale, 8.0);
        assert_eq!(config.view.min_scale, 1.0);
        assert_eq!(config.max_history, 50);
    }

    #[test]
    fn zero_segments_are_rejected() {
        let config = EngineConfig {
            segment_count: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidSegmentCount(0))
        ));
    }

    #[test]
    fn inverted_scale_range_is_rejected() {
        let mut config = EngineConfig::default();
        config.view.min_scale = 5.0;
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn load_reads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "canvas_width": 320, "canvas_height": 240 }}"#).unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!((config.canvas_width, config.canvas_height), (320, 240));
    }
}
