//! Code 128 barcode encoder.
//!
//! Every payload is encoded with code set B, which covers the full printable ASCII
//! range accepted here (32..=127, DEL included). One module is exactly one pixel, so
//! every bar and space in the raster is a whole number of pixels and integer scaling
//! by the layout engine keeps the bar/space ratios exact.
//!
//! The raster carries no human-readable text and no quiet zone; the caption and the
//! surrounding whitespace are laid out by the engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::layout::error::LayoutError;

/// Rows in the native raster. Code 128 is one-dimensional, so every row is identical
/// and the engine is free to stretch the symbol vertically.
pub const NATIVE_BAR_HEIGHT_PX: u32 = 32;

const START_B: u8 = 104;
const STOP: usize = 106;

/// Bar/space module widths for symbol values 0..=106 (106 = stop, 7 elements).
#[rustfmt::skip]
static PATTERNS: [&str; 107] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312",
    "132212", "221213", "221312", "231212", "112232", "122132", "122231", "113222",
    "123122", "123221", "223211", "221132", "221231", "213212", "223112", "312131",
    "311222", "321122", "321221", "312212", "322112", "322211", "212123", "212321",
    "232121", "111323", "131123", "131321", "112313", "132113", "132311", "211313",
    "231113", "231311", "112133", "112331", "132131", "113123", "113321", "133121",
    "313121", "211331", "231131", "213113", "213311", "213131", "311123", "311321",
    "331121", "312113", "312311", "332111", "314111", "221411", "431111", "111224",
    "111422", "121124", "121421", "141122", "141221", "112214", "112412", "122114",
    "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111",
    "111242", "121142", "121241", "114212", "124112", "124211", "411212", "421112",
    "421211", "212141", "214121", "412121", "111143", "111341", "131141", "114113",
    "114311", "411113", "411311", "113141", "114131", "311141", "411131", "211412",
    "211214", "211232", "2331112",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Symbology {
    Code128,
}

/// A 1-bit raster, rows packed MSB-first, each row padded to a whole byte.
/// A set bit is a black pixel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub row_stride: usize,
    pub data: Vec<u8>,
}

impl Bitmap {
    /// An all-white raster.
    pub fn new(width: u32, height: u32) -> Self {
        let row_stride = (width as usize).div_ceil(8);
        Self {
            width,
            height,
            row_stride,
            data: vec![0; row_stride * height as usize],
        }
    }

    #[cfg(test)]
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.data[y as usize * self.row_stride + (x / 8) as usize];
        byte & (0x80 >> (x % 8)) != 0
    }

    pub fn set(&mut self, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.data[y as usize * self.row_stride + (x / 8) as usize] |= 0x80 >> (x % 8);
    }
}

/// An encoded barcode raster at native resolution (1 px per module).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarcodeSymbol {
    pub encoding: Symbology,
    pub bitmap: Arc<Bitmap>,
    pub width_px: u32,
    pub height_px: u32,
}

/// Checks that every character is printable ASCII (code point 32..=127).
pub fn validate_payload(payload: &str) -> Result<(), LayoutError> {
    match payload
        .chars()
        .enumerate()
        .find(|(_, c)| !(32..=127).contains(&(*c as u32)))
    {
        Some((position, c)) => Err(LayoutError::InvalidPayload {
            payload: payload.to_string(),
            position,
            code_point: c as u32,
        }),
        None => Ok(()),
    }
}

/// Encodes `payload` as Code 128 and rasterizes it.
pub fn encode(payload: &str) -> Result<BarcodeSymbol, LayoutError> {
    validate_payload(payload)?;

    let values = symbol_values(payload);
    let modules = modules_for(&values);
    let width: u32 = modules.iter().map(|&(w, _)| w as u32).sum();

    let mut bitmap = Bitmap::new(width, NATIVE_BAR_HEIGHT_PX);
    let mut x = 0u32;
    for (run, black) in modules {
        if black {
            for dx in x..x + run as u32 {
                for y in 0..NATIVE_BAR_HEIGHT_PX {
                    bitmap.set(dx, y);
                }
            }
        }
        x += run as u32;
    }

    Ok(BarcodeSymbol {
        encoding: Symbology::Code128,
        width_px: width,
        height_px: NATIVE_BAR_HEIGHT_PX,
        bitmap: Arc::new(bitmap),
    })
}

/// Start B, one value per character, modulo-103 check value, stop.
fn symbol_values(payload: &str) -> Vec<u8> {
    let mut values = Vec::with_capacity(payload.len() + 3);
    values.push(START_B);
    // Validation guarantees every char is 32..=127.
    values.extend(payload.chars().map(|c| (c as u32 - 32) as u8));

    let checksum = values
        .iter()
        .enumerate()
        .map(|(i, &v)| i.max(1) as u32 * v as u32)
        .sum::<u32>()
        % 103;
    values.push(checksum as u8);
    values.push(STOP as u8);
    values
}

/// Expands symbol values into (run width, is_bar) pairs. Every pattern starts with a bar.
fn modules_for(values: &[u8]) -> Vec<(u8, bool)> {
    values
        .iter()
        .flat_map(|&v| {
            PATTERNS[v as usize]
                .bytes()
                .enumerate()
                .map(|(i, b)| (b - b'0', i % 2 == 0))
        })
        .collect()
}
