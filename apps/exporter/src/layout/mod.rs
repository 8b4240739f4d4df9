// Layout model: the ordered line sequence both renderers consume, the builders
// that produce it, and the shared configuration and font metrics.
// Measurement here is pure; the document renderer owns pagination.

pub mod builder;
pub mod config;
pub mod font_metrics;
pub mod model;
pub mod text;

// Re-exported for startup logging in main.
pub use config::LayoutConfig;
