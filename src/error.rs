use thiserror::Error;

/// Every way an engine command can be refused.
///
/// None of these are fatal: a failed command leaves the layer stack exactly as it was.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("at least one layer must remain")]
    LastLayer,

    #[error("layer index {index} is out of range (stack has {len} layers)")]
    LayerIndexOutOfRange { index: usize, len: usize },

    #[error("segment count must be at least 1, got {0}")]
    InvalidSegmentCount(usize),

    #[error("invalid color `{0}`, expected #rrggbb")]
    InvalidColor(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed project: {0}")]
    MalformedProject(String),

    #[error("project schema version {0} is newer than this build supports")]
    UnsupportedVersion(u32),

    #[error("project json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    #[error("base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// True for refusals caused by the caller breaking a layer-stack invariant.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            EngineError::LastLayer
                | EngineError::LayerIndexOutOfRange { .. }
                | EngineError::InvalidSegmentCount(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
