pub mod compositor;
pub mod engine;
pub mod flood_fill;
pub mod history;
pub mod layers;
pub mod preview;
pub mod raster;
pub mod segment;
pub mod session;
pub mod surface;
pub mod view;

pub use engine::{Engine, EngineEvent};
pub use session::Session;
