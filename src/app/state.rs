use std::path::PathBuf;

use clap::Parser;

use crate::config::EngineConfig;
use crate::error::Result;

/// Command line options. Anything given here overrides the config file.
#[derive(Clone, Debug, Default, Parser)]
#[command(name = "kaleido-painter", version, about = "Kaleidoscope raster editor")]
pub struct AppArgs {
    /// JSON engine config to start from.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Canvas width in pixels.
    #[arg(long)]
    pub width: Option<usize>,
    /// Canvas height in pixels.
    #[arg(long)]
    pub height: Option<usize>,
    /// Initial number of mirrored segments.
    #[arg(long)]
    pub segments: Option<usize>,
}

impl AppArgs {
    /// Load the config file (or defaults) and apply the overrides.
    pub fn into_config(self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(width) = self.width {
            config.canvas_width = width;
        }
        if let Some(height) = self.height {
            config.canvas_height = height;
        }
        if let Some(segments) = self.segments {
            config.segment_count = segments;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Dialog and status state of the shell, separate from the document.
#[derive(Default)]
pub struct UiState {
    pub status: Option<String>,
    /// Segment count waiting for the user to confirm the destructive change.
    pub pending_segments: Option<usize>,
    /// Value of the segment count field in the top bar.
    pub segments_input: usize,
    pub show_layers: bool,
    pub show_preview: bool,
}

impl UiState {
    pub fn new(segments: usize) -> Self {
        Self {
            segments_input: segments,
            show_layers: true,
            show_preview: true,
            ..Self::default()
        }
    }

    /// Log `result` and surface failures in the status line.
    pub fn report<T>(&mut self, what: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("{what} failed: {err}");
                self.status = Some(format!("{what} failed: {err}"));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn flags_override_defaults() {
        let args = AppArgs::parse_from(["kaleido-painter", "--width", "320", "--segments", "6"]);
        let config = args.into_config().unwrap();
        assert_eq!(config.canvas_width, 320);
        assert_eq!(config.canvas_height, EngineConfig::default().canvas_height);
        assert_eq!(config.segment_count, 6);
    }

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "canvas_width": 100, "canvas_height": 90 }"#).unwrap();
        let args = AppArgs::parse_from([
            "kaleido-painter",
            "--config",
            path.to_str().unwrap(),
            "--height",
            "120",
        ]);
        let config = args.into_config().unwrap();
        assert_eq!((config.canvas_width, config.canvas_height), (100, 120));
    }

    #[test]
    fn zero_segments_is_rejected() {
        let args = AppArgs::parse_from(["kaleido-painter", "--segments", "0"]);
        assert!(matches!(
            args.into_config(),
            Err(EngineError::InvalidSegmentCount(0))
        ));
    }

    #[test]
    fn failures_land_in_the_status_line() {
        let mut ui = UiState::new(8);
        let out: Option<()> = ui.report("Delete layer", Err(EngineError::LastLayer));
        assert!(out.is_none());
        assert!(ui.status.unwrap().starts_with("Delete layer failed"));
    }
}
