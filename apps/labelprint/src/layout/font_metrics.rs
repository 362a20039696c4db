//! Static font-metric tables for the label sans family.
//!
//! Widths and ink heights are in em units (relative to font size) and approximate
//! DejaVu Sans, the stock "Sans" face on the label workstations. At the layout
//! resolution one point is one pixel, so em × font_pt is a pixel distance.
//!
//! Tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32. Anything else falls back to `average_char_width`
//! and a cap-height ink box.

use serde::{Deserialize, Serialize};

use crate::layout::error::LayoutError;
use crate::layout::geometry::{Size, PX_PER_PT};
use crate::layout::measure::{InkExtents, TextMeasurer};

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    /// Regular-width sans-serif.
    Sans,
    /// Condensed cut of the same face; fits more characters per label width.
    SansCondensed,
}

impl std::str::FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sans" => Ok(FontFamily::Sans),
            "sans-condensed" | "sans_condensed" => Ok(FontFamily::SansCondensed),
            other => Err(format!("unknown font family '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static metric table for a font family.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub font: FontFamily,
    widths: &'static [f32; 95],
    /// Horizontal compression applied to every advance width.
    pub width_scale: f32,
    /// Fallback advance for non-ASCII characters.
    pub average_char_width: f32,
    /// Baseline distance below the top of the line box.
    pub ascent: f32,
    /// Line box extent below the baseline.
    pub descent: f32,
}

impl FontMetricTable {
    /// Normal line spacing in em.
    pub fn line_height(&self) -> f32 {
        self.ascent + self.descent
    }

    /// Advance width of a single line in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum::<f32>()
            * self.width_scale
    }
}

/// Vertical ink span of a glyph in em, measured upward from the baseline:
/// `(top, bottom)`, with `bottom` negative for descenders. `None` for blank glyphs.
fn glyph_ink(c: char) -> Option<(f32, f32)> {
    const CAP: f32 = 0.73;
    const ASC: f32 = 0.76;
    const X: f32 = 0.55;
    const DESC: f32 = -0.21;

    let span = match c {
        ' ' => return None,
        c if c.is_whitespace() || c.is_control() => return None,
        'A'..='Z' | '0'..='9' | '#' | '%' | '&' | '?' | '!' => (CAP, 0.0),
        'b' | 'd' | 'f' | 'h' | 'k' | 'l' | 'i' => (ASC, 0.0),
        't' => (0.68, 0.0),
        'a' | 'c' | 'e' | 'm' | 'n' | 'o' | 'r' | 's' | 'u' | 'v' | 'w' | 'x' | 'z' => (X, 0.0),
        'g' | 'p' | 'q' | 'y' => (X, DESC),
        'j' => (ASC, DESC),
        '$' => (ASC, -0.15),
        '@' => (CAP, -0.17),
        '(' | ')' | '[' | ']' | '{' | '}' => (ASC, -0.13),
        '|' => (ASC, -0.236),
        '/' | '\\' => (CAP, -0.09),
        ',' => (0.12, -0.12),
        ';' => (X, -0.12),
        '.' => (0.12, 0.0),
        ':' => (X, 0.0),
        '-' => (0.31, 0.24),
        '_' => (-0.18, -0.236),
        '"' | '\'' | '`' | '^' | '*' => (CAP, 0.45),
        '+' | '<' | '=' | '>' => (0.58, 0.05),
        '~' => (0.38, 0.20),
        _ => (CAP, 0.0),
    };
    Some(span)
}

// ────────────────────────────────────────────────────────────────────────────
// Static width table
// ────────────────────────────────────────────────────────────────────────────

#[rustfmt::skip]
static SANS_WIDTHS: [f32; 95] = [
    // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
    0.318, 0.401, 0.460, 0.838, 0.636, 0.950, 0.780, 0.275, 0.390, 0.390, 0.500, 0.838, 0.318, 0.361, 0.318, 0.337,
    // 0      1      2      3      4      5      6      7      8      9
    0.636, 0.636, 0.636, 0.636, 0.636, 0.636, 0.636, 0.636, 0.636, 0.636,
    // :      ;      <      =      >      ?      @
    0.337, 0.337, 0.838, 0.838, 0.838, 0.531, 1.000,
    // A      B      C      D      E      F      G      H      I      J      K      L      M
    0.684, 0.686, 0.698, 0.770, 0.632, 0.575, 0.775, 0.752, 0.295, 0.295, 0.656, 0.557, 0.863,
    // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
    0.748, 0.787, 0.603, 0.787, 0.695, 0.635, 0.611, 0.732, 0.684, 0.989, 0.685, 0.611, 0.685,
    // [      \      ]      ^      _      `
    0.390, 0.337, 0.390, 0.838, 0.500, 0.500,
    // a      b      c      d      e      f      g      h      i      j      k      l      m
    0.613, 0.635, 0.550, 0.635, 0.615, 0.352, 0.635, 0.634, 0.278, 0.278, 0.579, 0.278, 0.974,
    // n      o      p      q      r      s      t      u      v      w      x      y      z
    0.634, 0.612, 0.635, 0.635, 0.411, 0.521, 0.392, 0.634, 0.592, 0.818, 0.592, 0.592, 0.525,
    // {      |      }      ~
    0.636, 0.337, 0.636, 0.838,
];

static SANS_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Sans,
    widths: &SANS_WIDTHS,
    width_scale: 1.0,
    average_char_width: 0.62,
    ascent: 0.928,
    descent: 0.236,
};

/// Condensed cut: same outlines squeezed horizontally to ~82%.
static SANS_CONDENSED_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::SansCondensed,
    widths: &SANS_WIDTHS,
    width_scale: 0.82,
    average_char_width: 0.62,
    ascent: 0.928,
    descent: 0.236,
};

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: &FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Sans => &SANS_TABLE,
        FontFamily::SansCondensed => &SANS_CONDENSED_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Table-driven measurer
// ────────────────────────────────────────────────────────────────────────────

/// [`TextMeasurer`] backed by a static metric table. Pure arithmetic, never unavailable.
#[derive(Clone, Copy)]
pub struct MetricMeasurer {
    table: &'static FontMetricTable,
}

impl MetricMeasurer {
    pub fn new(font: FontFamily) -> Self {
        Self {
            table: get_metrics(&font),
        }
    }

    fn em_to_px(em: f32, font_pt: f64) -> f64 {
        em as f64 * font_pt * PX_PER_PT
    }
}

impl std::fmt::Debug for MetricMeasurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricMeasurer")
            .field("font", &self.table.font)
            .finish()
    }
}

impl TextMeasurer for MetricMeasurer {
    fn measure(&self, text: &str, font_pt: f64) -> Result<Size, LayoutError> {
        let mut widest = 0.0_f32;
        let mut lines = 0u32;
        for line in text.split('\n') {
            widest = widest.max(self.table.measure_str(line));
            lines += 1;
        }
        Ok(Size::new(
            Self::em_to_px(widest, font_pt),
            Self::em_to_px(self.table.line_height() * lines as f32, font_pt),
        ))
    }

    fn extents(&self, text: &str, font_pt: f64) -> Result<InkExtents, LayoutError> {
        let line_height = self.table.line_height();
        let mut top = f32::INFINITY;
        let mut bottom = f32::NEG_INFINITY;

        for (i, line) in text.split('\n').enumerate() {
            let baseline = self.table.ascent + line_height * i as f32;
            for (glyph_top, glyph_bottom) in line.chars().filter_map(glyph_ink) {
                top = top.min(baseline - glyph_top);
                bottom = bottom.max(baseline - glyph_bottom);
            }
        }

        if !top.is_finite() {
            return Ok(InkExtents {
                top_bearing_px: 0.0,
                ink_height_px: 0.0,
            });
        }
        Ok(InkExtents {
            top_bearing_px: Self::em_to_px(top, font_pt),
            ink_height_px: Self::em_to_px(bottom - top, font_pt),
        })
    }

    fn ascent(&self, font_pt: f64) -> Result<f64, LayoutError> {
        Ok(Self::em_to_px(self.table.ascent, font_pt))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
