pub mod color;
pub mod exporter;
pub mod profiler;
pub mod project;
pub mod vector;
