//! Label job ingestion: the structured job message and the two-field text format.
//!
//! Text format:
//! ```text
//! 12345              <- barcode payload (may be empty)
//! Shelf 4            <- label text, one printed line per input line
//! Screws M4 x 20
//! ```
//! Every line is trimmed. Lines are never joined or wrapped.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::AppError;
use crate::layout::LabelSpec;

/// One label to lay out, as submitted by a client or read from a text file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelJob {
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub text: Vec<String>,
    /// Label stock width. Falls back to the configured default.
    #[serde(default)]
    pub width_mm: Option<f64>,
}

impl LabelJob {
    /// Parses the two-field text format: first line is the payload, the rest is text.
    pub fn parse_text(raw: &str) -> Self {
        let mut lines = raw.lines().map(str::trim);
        let barcode = lines.next().unwrap_or_default().to_string();
        let text = lines.map(str::to_string).collect();
        LabelJob {
            barcode,
            text,
            width_mm: None,
        }
    }

    /// Builds the layout input using the configured margins.
    ///
    /// Rejects widths that leave no printable area. Payload characters are checked
    /// later by the barcode encoder.
    pub fn into_spec(self, config: &Config) -> Result<LabelSpec, AppError> {
        let width_mm = self.width_mm.unwrap_or(config.default_width_mm);
        let side_margins = config.margins.horizontal_mm();
        if !width_mm.is_finite() || width_mm <= side_margins {
            return Err(AppError::Validation(format!(
                "width_mm must be a number greater than the side margins ({side_margins} mm), got {width_mm}"
            )));
        }

        let barcode = (!self.barcode.is_empty()).then_some(self.barcode);
        Ok(LabelSpec::new(width_mm, self.text, barcode).with_margins(config.margins))
    }
}

/// Reads a two-field text job from disk.
pub async fn load_text_job(path: impl AsRef<Path>) -> Result<LabelJob> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read label job from {}", path.display()))?;
    Ok(LabelJob::parse_text(&raw))
}
