pub mod stroke;
pub mod tool;
