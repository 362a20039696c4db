//! Text measurement seam consumed by the layout engine.
//!
//! Implementations must be deterministic: the engine's single-pass font fit relies on
//! getting identical numbers for identical input.

use serde::{Deserialize, Serialize};

use crate::layout::error::LayoutError;
use crate::layout::geometry::Size;

/// Ink bounding box of a measured text block, relative to the top of its layout box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkExtents {
    /// Distance from the top of the layout box down to the topmost inked pixel.
    pub top_bearing_px: f64,
    /// Distance from the topmost to the bottommost inked pixel.
    pub ink_height_px: f64,
}

impl InkExtents {
    /// Distance from the top of the layout box down to the lowest inked pixel.
    pub fn bottom_px(&self) -> f64 {
        self.top_bearing_px + self.ink_height_px
    }
}

/// Measures text in one fixed font family, centered, with no width constraint.
///
/// Multi-line text (`\n`-separated) is stacked at the family's normal line spacing.
pub trait TextMeasurer: Send + Sync {
    /// Logical size of `text` at `font_pt`: widest line × stacked line heights.
    fn measure(&self, text: &str, font_pt: f64) -> Result<Size, LayoutError>;

    /// Ink box of `text` at `font_pt`.
    fn extents(&self, text: &str, font_pt: f64) -> Result<InkExtents, LayoutError>;

    /// Distance from the top of a line box to its baseline at `font_pt`.
    fn ascent(&self, font_pt: f64) -> Result<f64, LayoutError>;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, text: &str, font_pt: f64) -> Result<Size, LayoutError> {
        (**self).measure(text, font_pt)
    }

    fn extents(&self, text: &str, font_pt: f64) -> Result<InkExtents, LayoutError> {
        (**self).extents(text, font_pt)
    }

    fn ascent(&self, font_pt: f64) -> Result<f64, LayoutError> {
        (**self).ascent(font_pt)
    }
}
