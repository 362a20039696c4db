//! Layout input: one physical label.

use serde::{Deserialize, Serialize};

/// Default label-printer margins in millimetres.
pub const DEFAULT_LEFT_MARGIN_MM: f64 = 1.0;
pub const DEFAULT_RIGHT_MARGIN_MM: f64 = 1.0;
pub const DEFAULT_TOP_MARGIN_MM: f64 = 2.0;
pub const DEFAULT_BOTTOM_MARGIN_MM: f64 = 1.0;

/// Unprintable border of the label stock. A printer constant, not a per-label choice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left_mm: f64,
    pub right_mm: f64,
    pub top_mm: f64,
    pub bottom_mm: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left_mm: DEFAULT_LEFT_MARGIN_MM,
            right_mm: DEFAULT_RIGHT_MARGIN_MM,
            top_mm: DEFAULT_TOP_MARGIN_MM,
            bottom_mm: DEFAULT_BOTTOM_MARGIN_MM,
        }
    }
}

impl Margins {
    pub fn horizontal_mm(&self) -> f64 {
        self.left_mm + self.right_mm
    }
}

/// Everything one layout computation needs. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub width_mm: f64,
    pub margins: Margins,
    /// One entry per printed line. Lines are never wrapped.
    pub text: Vec<String>,
    pub barcode_payload: Option<String>,
}

impl LabelSpec {
    pub fn new(width_mm: f64, text: Vec<String>, barcode_payload: Option<String>) -> Self {
        Self {
            width_mm,
            margins: Margins::default(),
            text,
            barcode_payload,
        }
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Printable width between the side margins, never negative.
    pub fn usable_width_mm(&self) -> f64 {
        (self.width_mm - self.margins.horizontal_mm()).max(0.0)
    }

    /// Lines joined for measurement, or `None` when there is nothing to print.
    pub fn joined_text(&self) -> Option<String> {
        let joined = self.text.join("\n");
        if joined.trim().is_empty() {
            None
        } else {
            Some(joined)
        }
    }

    /// The barcode payload, or `None` when absent or empty.
    pub fn payload(&self) -> Option<&str> {
        self.barcode_payload.as_deref().filter(|p| !p.is_empty())
    }
}
