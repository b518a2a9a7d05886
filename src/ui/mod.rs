//! egui panels for the toolbar and the layer stack.
pub mod layers;
pub mod top_bar;
