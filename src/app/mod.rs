pub mod input_handler;
pub mod painter;
pub mod state;

pub use painter::PainterApp;
pub use state::AppArgs;
