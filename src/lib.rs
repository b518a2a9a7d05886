pub mod app;
pub mod brush_engine;
pub mod canvas;
pub mod config;
pub mod error;
pub mod ui;
pub mod utils;

pub use app::PainterApp;
pub use app::state::AppArgs;
pub use canvas::{Engine, EngineEvent, Session};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
