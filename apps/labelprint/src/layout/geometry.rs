//! Millimetre ↔ pixel conversion and the small geometry types shared by the layout
//! engine and its draw commands.
//!
//! Every pixel coordinate in a layout is derived from millimetres through
//! [`DOTS_PER_MM`]. No other resolution is ever mixed in: text is measured in the
//! same 72 dpi space (1 pt = 1 px), so font sizes and canvas pixels agree.

use serde::{Deserialize, Serialize};

/// Layout resolution: 72 dots per inch expressed per millimetre.
pub const DOTS_PER_MM: f64 = 72.0 / 25.4;

/// Pixels per typographic point at [`DOTS_PER_MM`]. Exactly 1.0 at 72 dpi.
pub const PX_PER_PT: f64 = DOTS_PER_MM * 25.4 / 72.0;

/// Converts millimetres to (fractional) pixels.
pub fn mm_to_px(mm: f64) -> f64 {
    mm * DOTS_PER_MM
}

/// Converts (fractional) pixels back to millimetres.
pub fn px_to_mm(px: f64) -> f64 {
    px / DOTS_PER_MM
}

/// Whole pixels needed to cover `mm` millimetres. Negative or non-finite input covers nothing.
pub fn mm_to_px_ceil(mm: f64) -> u32 {
    let px = mm_to_px(mm);
    if px.is_finite() && px > 0.0 {
        px.ceil() as u32
    } else {
        0
    }
}

/// A point on the label canvas, in pixels from the top-left corner of the printable area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}
