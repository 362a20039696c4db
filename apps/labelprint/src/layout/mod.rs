// Label layout core: barcode encoding, text measurement, and the fitting engine.
// Everything here is synchronous and pure; the HTTP layer runs it via
// tokio::task::spawn_blocking.

pub mod barcode;
pub mod commands;
pub mod engine;
pub mod error;
pub mod font_metrics;
pub mod geometry;
pub mod label;
pub mod measure;

// Re-export the public API consumed by the service layer.
pub use commands::LayoutResult;
pub use engine::LayoutEngine;
pub use error::LayoutError;
pub use font_metrics::{FontFamily, MetricMeasurer};
pub use label::{LabelSpec, Margins};
