//! Backend-agnostic drawing vocabulary produced by the layout engine.
//!
//! A renderer needs exactly three capabilities: white filled rectangles, centered text
//! runs at a point size, and integer-scaled bitmap blits with nearest-neighbor
//! sampling. Output is monochrome: text and set bitmap pixels are black.

use std::sync::Arc;

use serde::Serialize;

use crate::layout::barcode::Bitmap;
use crate::layout::geometry::{Point, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlignment {
    Center,
}

/// What a text run is for. Renderers may ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRole {
    Body,
    BarcodeCaption,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Multi-line text, each line centered on `baseline_origin_px.x`.
    /// `baseline_origin_px.y` is the baseline of the first line; subsequent lines
    /// follow at `line_height_px` intervals.
    TextRun {
        role: TextRole,
        content: String,
        baseline_origin_px: Point,
        font_pt: f64,
        line_height_px: f64,
        alignment: TextAlignment,
    },
    /// Bitmap scaled horizontally by the integer `scale` (nearest neighbor, no
    /// antialiasing) and stretched vertically to `size_px.height`. Every row of a
    /// barcode raster is identical, so the vertical stretch cannot alter bar widths.
    ImageBlit {
        bitmap: Arc<Bitmap>,
        origin_px: Point,
        scale: u32,
        size_px: Size,
    },
    /// White rectangle. Only used as the quiet zone behind the barcode caption.
    FilledRect { origin_px: Point, size_px: Size },
}

/// Non-fatal observations about a layout. The result is valid regardless.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutNotice {
    /// The barcode raster did not fit the printable width and was left out.
    BarcodeOmitted {
        raster_width_px: u32,
        available_width_px: u32,
    },
}

/// Output of one layout call.
///
/// Canvas coordinates cover the printable area only: x = 0 is the inside of the left
/// margin, y = 0 the inside of the top margin. `height_mm` and `width_mm` describe
/// the full physical label including margins and are the only values a renderer may
/// use to size its page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    pub width_mm: f64,
    pub height_mm: f64,
    /// Point size of the main text. 0 when the label has no text.
    pub text_font_pt: f64,
    /// Point size of the barcode caption, present iff a barcode is drawn.
    pub caption_font_pt: Option<f64>,
    pub canvas_width_px: u32,
    pub canvas_height_px: u32,
    pub commands: Vec<DrawCommand>,
    pub notices: Vec<LayoutNotice>,
}

impl LayoutResult {
    pub fn has_barcode(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, DrawCommand::ImageBlit { .. }))
    }
}
