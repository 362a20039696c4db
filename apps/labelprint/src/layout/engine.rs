//! Label layout engine: fits text and barcode to a fixed label width.
//!
//! # Algorithm
//! 1. Encode the barcode payload (if any). Encoding failures abort the layout.
//! 2. Printable width in pixels = ceil(usable width × dots per mm).
//! 3. A barcode raster wider than the printable width is dropped, never scaled down.
//! 4. Main text is measured once at [`REFERENCE_FONT_PT`] and scaled proportionally
//!    to the printable width, with [`FIT_SAFETY_FACTOR`] of headroom. One corrective
//!    re-measurement at the chosen size gives the placement metrics.
//! 5. The barcode is scaled by the largest integer factor that fits and given a
//!    block of `width_mm / 5`, followed by its caption.
//! 6. The label length is the sum of every block plus the vertical margins.
//!
//! The fit is a single pass by construction. A font whose glyph widths do not scale
//! linearly with point size may overflow the printable width by a small residual;
//! the engine accepts that rather than iterating.

use tracing::{debug, warn};

use crate::layout::barcode::{self, BarcodeSymbol};
use crate::layout::commands::{DrawCommand, LayoutNotice, LayoutResult, TextAlignment, TextRole};
use crate::layout::error::LayoutError;
use crate::layout::geometry::{mm_to_px, mm_to_px_ceil, px_to_mm, Point, Size};
use crate::layout::label::LabelSpec;
use crate::layout::measure::{InkExtents, TextMeasurer};

/// Trial size for the proportional font fit.
pub const REFERENCE_FONT_PT: f64 = 200.0;
/// Headroom against measurement rounding and antialiasing bleed.
pub const FIT_SAFETY_FACTOR: f64 = 0.95;
/// Vertical gap between the text block and the barcode, only when both are present.
pub const TEXT_BARCODE_GAP_MM: f64 = 0.3;
/// The barcode block is `width_mm / BARCODE_BLOCK_DIVISOR` tall.
pub const BARCODE_BLOCK_DIVISOR: f64 = 5.0;
/// The caption may be at most `barcode width / CAPTION_WIDTH_DIVISOR` wide.
pub const CAPTION_WIDTH_DIVISOR: f64 = 1.2;
/// The caption may be at most `barcode block height / CAPTION_HEIGHT_DIVISOR` tall.
pub const CAPTION_HEIGHT_DIVISOR: f64 = 3.0;
/// White border around the caption ink box.
pub const CAPTION_PADDING_PX: f64 = 1.0;
/// Appended before measuring ink extents so the last line reports its full descent.
pub const FILLER_GLYPH: char = '|';

// ────────────────────────────────────────────────────────────────────────────
// Internal fit results
// ────────────────────────────────────────────────────────────────────────────

struct FittedText {
    content: String,
    font_pt: f64,
    line_height_px: f64,
    ascent_px: f64,
    block_height_px: f64,
}

struct FittedCaption {
    font_pt: f64,
    size: Size,
    ink: InkExtents,
    ascent_px: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Stateless layout engine. Each [`LayoutEngine::layout`] call is independent, so one
/// engine may serve any number of threads.
#[derive(Debug, Clone)]
pub struct LayoutEngine<M> {
    measurer: M,
}

impl<M: TextMeasurer> LayoutEngine<M> {
    pub fn new(measurer: M) -> Self {
        Self { measurer }
    }

    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    /// Lays out one label.
    ///
    /// Fails only on an invalid barcode payload or an unavailable text measurer.
    pub fn layout(&self, spec: &LabelSpec) -> Result<LayoutResult, LayoutError> {
        let symbol = spec.payload().map(barcode::encode).transpose()?;

        let width_px = mm_to_px_ceil(spec.usable_width_mm());
        let center_x = width_px as f64 / 2.0;
        let mut notices = Vec::new();

        let symbol = match symbol {
            Some(symbol) if symbol.width_px > width_px => {
                warn!(
                    raster_width_px = symbol.width_px,
                    available_width_px = width_px,
                    "barcode wider than label, omitting it"
                );
                notices.push(LayoutNotice::BarcodeOmitted {
                    raster_width_px: symbol.width_px,
                    available_width_px: width_px,
                });
                None
            }
            other => other,
        };

        let mut commands = Vec::new();
        // Running offset below the top margin.
        let mut offset_mm = 0.0_f64;

        let text = match spec.joined_text() {
            Some(joined) => self.fit_text(joined, width_px)?,
            None => None,
        };
        let text_font_pt = text.as_ref().map_or(0.0, |t| t.font_pt);

        if let Some(text) = &text {
            commands.push(DrawCommand::TextRun {
                role: TextRole::Body,
                content: text.content.clone(),
                baseline_origin_px: Point::new(center_x, text.ascent_px),
                font_pt: text.font_pt,
                line_height_px: text.line_height_px,
                alignment: TextAlignment::Center,
            });
            offset_mm += px_to_mm(text.block_height_px);
        }

        let mut caption_font_pt = None;
        if let (Some(symbol), Some(payload)) = (symbol, spec.payload()) {
            if text.is_some() {
                offset_mm += TEXT_BARCODE_GAP_MM;
            }
            let caption_start_pt = text.as_ref().map_or(REFERENCE_FONT_PT, |t| t.font_pt);
            let (block_mm, caption_pt) = self.place_barcode(
                &symbol,
                payload,
                spec.width_mm,
                width_px,
                offset_mm,
                caption_start_pt,
                &mut commands,
            )?;
            offset_mm += block_mm;
            caption_font_pt = Some(caption_pt);
        }

        let height_mm = spec.margins.top_mm + offset_mm + spec.margins.bottom_mm;
        debug!(
            height_mm,
            text_font_pt,
            commands = commands.len(),
            "label laid out"
        );

        Ok(LayoutResult {
            width_mm: spec.width_mm,
            height_mm,
            text_font_pt,
            caption_font_pt,
            canvas_width_px: width_px,
            canvas_height_px: mm_to_px_ceil(offset_mm),
            commands,
            notices,
        })
    }

    /// Single-pass proportional fit of `text` to `width_px`.
    ///
    /// Returns `None` when there is no room or the text has no width to scale.
    fn fit_text(&self, text: String, width_px: u32) -> Result<Option<FittedText>, LayoutError> {
        if width_px == 0 {
            return Ok(None);
        }
        let reference = self.measurer.measure(&text, REFERENCE_FONT_PT)?;
        if reference.width <= 0.0 {
            return Ok(None);
        }

        let font_pt = REFERENCE_FONT_PT * width_px as f64 / reference.width * FIT_SAFETY_FACTOR;
        let size = self.measurer.measure(&text, font_pt)?;
        debug!(
            font_pt,
            width_px,
            fitted_width_px = size.width,
            "fitted label text"
        );

        let filled = format!("{text}{FILLER_GLYPH}");
        let ink = self.measurer.extents(&filled, font_pt)?;
        let ascent_px = self.measurer.ascent(font_pt)?;
        let lines = text.split('\n').count() as f64;

        Ok(Some(FittedText {
            content: text,
            font_pt,
            line_height_px: size.height / lines,
            ascent_px,
            block_height_px: ink.bottom_px(),
        }))
    }

    /// Emits the barcode blit and its caption starting `offset_mm` below the top margin.
    ///
    /// Returns the vertical space consumed in millimetres and the caption point size.
    #[allow(clippy::too_many_arguments)]
    fn place_barcode(
        &self,
        symbol: &BarcodeSymbol,
        payload: &str,
        label_width_mm: f64,
        width_px: u32,
        offset_mm: f64,
        caption_start_pt: f64,
        commands: &mut Vec<DrawCommand>,
    ) -> Result<(f64, f64), LayoutError> {
        let scale = width_px / symbol.width_px;
        let bars_width_px = symbol.width_px * scale;
        let block_mm = label_width_mm / BARCODE_BLOCK_DIVISOR;
        let block_height_px = mm_to_px(block_mm);

        // Whole-pixel origin keeps bar edges on the pixel grid.
        let origin_x = ((width_px - bars_width_px) / 2) as f64;
        commands.push(DrawCommand::ImageBlit {
            bitmap: symbol.bitmap.clone(),
            origin_px: Point::new(origin_x, mm_to_px(offset_mm)),
            scale,
            size_px: Size::new(bars_width_px as f64, block_height_px),
        });

        let caption = self.fit_caption(
            payload,
            caption_start_pt,
            bars_width_px as f64,
            block_height_px,
        )?;
        let caption_top_px = mm_to_px(offset_mm + block_mm);
        let center_x = width_px as f64 / 2.0;

        commands.push(DrawCommand::FilledRect {
            origin_px: Point::new(
                center_x - caption.size.width / 2.0 - CAPTION_PADDING_PX,
                caption_top_px + caption.ink.top_bearing_px - CAPTION_PADDING_PX,
            ),
            size_px: Size::new(
                caption.size.width + 2.0 * CAPTION_PADDING_PX,
                caption.ink.ink_height_px + 2.0 * CAPTION_PADDING_PX,
            ),
        });
        commands.push(DrawCommand::TextRun {
            role: TextRole::BarcodeCaption,
            content: payload.to_string(),
            baseline_origin_px: Point::new(center_x, caption_top_px + caption.ascent_px),
            font_pt: caption.font_pt,
            line_height_px: caption.size.height,
            alignment: TextAlignment::Center,
        });

        // The quiet zone may reach below the logical line box.
        let caption_height_px = caption
            .size
            .height
            .max(caption.ink.bottom_px() + CAPTION_PADDING_PX);

        Ok((block_mm + px_to_mm(caption_height_px), caption.font_pt))
    }

    /// Shrinks the caption from `start_pt` until it fits both caption limits. Never grows it.
    ///
    /// The width limit is checked against `chars × widest glyph` rather than the measured
    /// advance. Every extra character adds a fixed 11 modules to the bars, so the bound
    /// per character can only tighten as the payload lengthens, whatever glyph is added.
    fn fit_caption(
        &self,
        payload: &str,
        start_pt: f64,
        bars_width_px: f64,
        block_height_px: f64,
    ) -> Result<FittedCaption, LayoutError> {
        let mut font_pt = start_pt;
        let mut size = self.measurer.measure(payload, font_pt)?;
        let fit_width = self.widest_glyph_px(payload, font_pt)? * payload.chars().count() as f64;

        let max_width = bars_width_px / CAPTION_WIDTH_DIVISOR;
        let max_height = block_height_px / CAPTION_HEIGHT_DIVISOR;
        let mut shrink = 1.0_f64;
        if fit_width > max_width {
            shrink = shrink.min(max_width / fit_width);
        }
        if size.height > max_height {
            shrink = shrink.min(max_height / size.height);
        }
        if shrink < 1.0 {
            font_pt *= shrink;
            size = self.measurer.measure(payload, font_pt)?;
        }

        Ok(FittedCaption {
            font_pt,
            size,
            ink: self.measurer.extents(payload, font_pt)?,
            ascent_px: self.measurer.ascent(font_pt)?,
        })
    }

    fn widest_glyph_px(&self, payload: &str, font_pt: f64) -> Result<f64, LayoutError> {
        let mut buf = [0u8; 4];
        let mut widest = 0.0_f64;
        for c in payload.chars() {
            let glyph = self.measurer.measure(c.encode_utf8(&mut buf), font_pt)?;
            widest = widest.max(glyph.width);
        }
        Ok(widest)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::layout::font_metrics::{FontFamily, MetricMeasurer};
    use crate::layout::label::Margins;

    fn engine() -> LayoutEngine<MetricMeasurer> {
        LayoutEngine::new(MetricMeasurer::new(FontFamily::Sans))
    }

    fn spec(width_mm: f64, text: &[&str], barcode: &str) -> LabelSpec {
        LabelSpec::new(
            width_mm,
            text.iter().map(|s| s.to_string()).collect(),
            Some(barcode.to_string()),
        )
        .with_margins(Margins {
            left_mm: 1.0,
            right_mm: 1.0,
            top_mm: 2.0,
            bottom_mm: 1.0,
        })
    }

    fn blits(result: &LayoutResult) -> Vec<&DrawCommand> {
        result
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::ImageBlit { .. }))
            .collect()
    }

    /// Top edge of a command; the baseline for text runs.
    fn top_px(command: &DrawCommand) -> f64 {
        match command {
            DrawCommand::TextRun {
                baseline_origin_px, ..
            } => baseline_origin_px.y,
            DrawCommand::ImageBlit { origin_px, .. } | DrawCommand::FilledRect { origin_px, .. } => {
                origin_px.y
            }
        }
    }

    fn caption_font(result: &LayoutResult) -> f64 {
        result
            .commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::TextRun {
                    role: TextRole::BarcodeCaption,
                    font_pt,
                    ..
                } => Some(*font_pt),
                _ => None,
            })
            .expect("caption text run")
    }

    /// Measurer that is never ready.
    struct Unavailable;

    impl TextMeasurer for Unavailable {
        fn measure(&self, _: &str, _: f64) -> Result<Size, LayoutError> {
            Err(LayoutError::MeasurementUnavailable("font not loaded".into()))
        }
        fn extents(&self, _: &str, _: f64) -> Result<InkExtents, LayoutError> {
            Err(LayoutError::MeasurementUnavailable("font not loaded".into()))
        }
        fn ascent(&self, _: f64) -> Result<f64, LayoutError> {
            Err(LayoutError::MeasurementUnavailable("font not loaded".into()))
        }
    }

    /// Measurer whose width grows faster than linearly with point size, counting calls.
    struct SuperLinear {
        measure_calls: AtomicUsize,
    }

    impl TextMeasurer for SuperLinear {
        fn measure(&self, text: &str, font_pt: f64) -> Result<Size, LayoutError> {
            self.measure_calls.fetch_add(1, Ordering::SeqCst);
            let chars = text.chars().count() as f64;
            Ok(Size::new(chars * 0.1 * font_pt.powf(1.2), font_pt))
        }
        fn extents(&self, _: &str, font_pt: f64) -> Result<InkExtents, LayoutError> {
            Ok(InkExtents {
                top_bearing_px: 0.0,
                ink_height_px: font_pt,
            })
        }
        fn ascent(&self, font_pt: f64) -> Result<f64, LayoutError> {
            Ok(font_pt * 0.8)
        }
    }

    #[test]
    fn test_canvas_width_is_ceil_of_usable_width() {
        let result = engine().layout(&spec(38.0, &["12345"], "")).unwrap();
        // 36mm × 72/25.4 = 102.05 → 103
        assert_eq!(result.canvas_width_px, 103);
    }

    #[test]
    fn test_text_only_label_height_is_margins_plus_text() {
        let e = engine();
        let result = e.layout(&spec(38.0, &["12345"], "")).unwrap();

        assert!(!result.has_barcode());
        assert_eq!(result.caption_font_pt, None);
        assert_eq!(result.commands.len(), 1);

        let m = e.measurer();
        let ink = m
            .extents(&format!("12345{FILLER_GLYPH}"), result.text_font_pt)
            .unwrap();
        let expected = 2.0 + px_to_mm(ink.bottom_px()) + 1.0;
        assert!(
            (result.height_mm - expected).abs() < 1e-9,
            "height {} != {expected}",
            result.height_mm
        );
    }

    #[test]
    fn test_font_scales_inversely_with_reference_width() {
        let e = engine();
        let result = e.layout(&spec(38.0, &["12345"], "")).unwrap();
        let w0 = e.measurer().measure("12345", REFERENCE_FONT_PT).unwrap().width;
        let expected = REFERENCE_FONT_PT * 103.0 / w0 * FIT_SAFETY_FACTOR;
        assert!((result.text_font_pt - expected).abs() < 1e-9);

        // Twice the text → half the font.
        let doubled = e.layout(&spec(38.0, &["1234512345"], "")).unwrap();
        assert!((doubled.text_font_pt * 2.0 - result.text_font_pt).abs() < 1e-4);
    }

    #[test]
    fn test_fitted_text_stays_inside_printable_width() {
        let e = engine();
        let result = e
            .layout(&spec(62.0, &["Shelf A-12", "Screws M4 x 20"], ""))
            .unwrap();
        let size = e
            .measurer()
            .measure("Shelf A-12\nScrews M4 x 20", result.text_font_pt)
            .unwrap();
        assert!(size.width <= result.canvas_width_px as f64);
        assert!(size.width >= result.canvas_width_px as f64 * 0.94);
    }

    #[test]
    fn test_text_run_is_centered_below_top_margin() {
        let result = engine().layout(&spec(38.0, &["FOO"], "")).unwrap();
        match &result.commands[0] {
            DrawCommand::TextRun {
                baseline_origin_px,
                alignment,
                role,
                ..
            } => {
                assert_eq!(*role, TextRole::Body);
                assert_eq!(*alignment, TextAlignment::Center);
                assert!((baseline_origin_px.x - 51.5).abs() < 1e-9);
                assert!(baseline_origin_px.y > 0.0);
            }
            other => panic!("expected text run, got {other:?}"),
        }
    }

    #[test]
    fn test_text_and_barcode_emit_commands_in_vertical_order() {
        let e = engine();
        let with_barcode = e.layout(&spec(38.0, &["FOO"], "12345")).unwrap();
        let text_only = e.layout(&spec(38.0, &["FOO"], "")).unwrap();

        let kinds: Vec<&str> = with_barcode
            .commands
            .iter()
            .map(|c| match c {
                DrawCommand::TextRun { .. } => "text",
                DrawCommand::ImageBlit { .. } => "blit",
                DrawCommand::FilledRect { .. } => "rect",
            })
            .collect();
        assert_eq!(kinds, vec!["text", "blit", "rect", "text"]);

        let tops: Vec<f64> = with_barcode.commands.iter().map(top_px).collect();
        for pair in tops.windows(2) {
            assert!(pair[0] < pair[1], "commands out of vertical order: {tops:?}");
        }

        assert!(with_barcode.height_mm - text_only.height_mm >= 38.0 / 5.0);
        assert!(with_barcode.notices.is_empty());
    }

    #[test]
    fn test_height_sums_every_block() {
        let e = engine();
        let result = e.layout(&spec(38.0, &["FOO"], "12345")).unwrap();
        let text_only = e.layout(&spec(38.0, &["FOO"], "")).unwrap();

        let caption_pt = result.caption_font_pt.unwrap();
        let caption = e.measurer().measure("12345", caption_pt).unwrap();
        let expected = text_only.height_mm + TEXT_BARCODE_GAP_MM + 38.0 / 5.0 + px_to_mm(caption.height);
        assert!(
            (result.height_mm - expected).abs() < 1e-9,
            "height {} != {expected}",
            result.height_mm
        );
        let content_px = mm_to_px(result.height_mm - 3.0);
        assert!((result.canvas_height_px as f64 - content_px.ceil()).abs() <= 1.0);
    }

    #[test]
    fn test_barcode_scale_is_largest_integer_that_fits() {
        for (width_mm, payload) in [(38.0, "12345"), (62.0, "A"), (100.0, "AB"), (29.0, "X")] {
            let result = engine().layout(&spec(width_mm, &["Label"], payload)).unwrap();
            let raster = barcode::encode(payload).unwrap().width_px;
            match blits(&result).as_slice() {
                [DrawCommand::ImageBlit { scale, size_px, .. }] => {
                    let w = result.canvas_width_px;
                    assert!(scale * raster <= w, "{payload}@{width_mm}: scale too large");
                    assert!((scale + 1) * raster > w, "{payload}@{width_mm}: scale too small");
                    assert_eq!(size_px.width, (scale * raster) as f64);
                    assert!((size_px.height - mm_to_px(width_mm / 5.0)).abs() < 1e-9);
                }
                _ => panic!("expected exactly one blit for {payload}@{width_mm}"),
            }
        }
    }

    #[test]
    fn test_barcode_blit_is_centered_on_whole_pixels() {
        let result = engine().layout(&spec(62.0, &["Label"], "A")).unwrap();
        match blits(&result).as_slice() {
            [DrawCommand::ImageBlit {
                origin_px, size_px, ..
            }] => {
                assert_eq!(origin_px.x.fract(), 0.0);
                let right = result.canvas_width_px as f64 - origin_px.x - size_px.width;
                assert!((right - origin_px.x).abs() <= 1.0);
            }
            _ => panic!("expected one blit"),
        }
    }

    #[test]
    fn test_too_wide_barcode_is_dropped() {
        let e = engine();
        // 7 chars encode to 35 + 7 × 11 = 112px; a 38mm label has 103px.
        let result = e.layout(&spec(38.0, &["FOO"], "ABCDEFG")).unwrap();
        let text_only = e.layout(&spec(38.0, &["FOO"], "")).unwrap();

        assert!(blits(&result).is_empty());
        assert_eq!(result.commands.len(), 1);
        assert_eq!(result.caption_font_pt, None);
        assert_eq!(result.height_mm, text_only.height_mm);
        assert_eq!(
            result.notices,
            vec![LayoutNotice::BarcodeOmitted {
                raster_width_px: 112,
                available_width_px: 103,
            }]
        );
    }

    #[test]
    fn test_barcode_without_text_has_no_gap() {
        let e = engine();
        let result = e.layout(&spec(50.0, &[], "12345")).unwrap();
        assert_eq!(result.text_font_pt, 0.0);
        match blits(&result).as_slice() {
            [DrawCommand::ImageBlit { origin_px, .. }] => assert_eq!(origin_px.y, 0.0),
            _ => panic!("expected one blit"),
        }
        assert_eq!(result.commands.len(), 3);
    }

    #[test]
    fn test_empty_label_is_just_margins() {
        let result = engine().layout(&spec(38.0, &[], "")).unwrap();
        assert!(result.commands.is_empty());
        assert!((result.height_mm - 3.0).abs() < 1e-12);
        assert_eq!(result.canvas_height_px, 0);
    }

    #[test]
    fn test_zero_usable_width_degrades_to_empty_label() {
        let result = engine().layout(&spec(2.0, &["FOO"], "1")).unwrap();
        assert!(result.commands.is_empty());
        assert_eq!(result.canvas_width_px, 0);
        assert_eq!(result.notices.len(), 1);
    }

    #[test]
    fn test_layout_is_idempotent() {
        let e = engine();
        let s = spec(38.0, &["FOO", "bar baz"], "12345");
        assert_eq!(e.layout(&s).unwrap(), e.layout(&s).unwrap());
    }

    #[test]
    fn test_caption_never_grows_past_main_text() {
        let result = engine().layout(&spec(100.0, &["A very long line of label text"], "1")).unwrap();
        assert!(result.caption_font_pt.unwrap() <= result.text_font_pt);
    }

    #[test]
    fn test_caption_fits_width_and_height_limits() {
        let e = engine();
        let result = e.layout(&spec(38.0, &["FOO"], "12345")).unwrap();
        let caption_pt = result.caption_font_pt.unwrap();
        let size = e.measurer().measure("12345", caption_pt).unwrap();
        let raster = barcode::encode("12345").unwrap().width_px as f64;
        assert!(size.width <= raster / CAPTION_WIDTH_DIVISOR + 1e-9);
        assert!(size.height <= mm_to_px(38.0 / 5.0) / CAPTION_HEIGHT_DIVISOR + 1e-9);
    }

    #[test]
    fn test_caption_font_non_increasing_as_payload_lengthens() {
        let e = engine();
        let digits = "1234567890123456789012345";
        let mut previous = f64::INFINITY;
        let mut checked = 0;
        for n in 1..=digits.len() {
            let result = e.layout(&spec(100.0, &["Bin 7"], &digits[..n])).unwrap();
            let Some(caption_pt) = result.caption_font_pt else {
                break;
            };
            assert!(
                caption_pt <= previous + 1e-9,
                "caption grew from {previous} to {caption_pt} at length {n}"
            );
            assert_eq!(caption_font(&result), caption_pt);
            previous = caption_pt;
            checked += 1;
        }
        assert!(checked > 5, "too few payload lengths fit the label");
    }

    #[test]
    fn test_caption_does_not_grow_when_a_narrow_glyph_is_appended() {
        let e = engine();
        let wide = e.layout(&spec(100.0, &["I"], "MMMMMMMMMM")).unwrap();
        let longer = e.layout(&spec(100.0, &["I"], "MMMMMMMMMM'")).unwrap();
        assert!(longer.caption_font_pt.unwrap() <= wide.caption_font_pt.unwrap() + 1e-9);
    }

    #[test]
    fn test_caption_font_non_increasing_for_mixed_width_payloads() {
        let e = engine();
        let payload = "MW'i.|l1Mj,W'@i";
        let mut previous = f64::INFINITY;
        let mut checked = 0;
        for n in 1..=payload.len() {
            let result = e.layout(&spec(100.0, &["I"], &payload[..n])).unwrap();
            let Some(caption_pt) = result.caption_font_pt else {
                break;
            };
            assert!(
                caption_pt <= previous + 1e-9,
                "caption grew from {previous} to {caption_pt} at {:?}",
                &payload[..n]
            );
            previous = caption_pt;
            checked += 1;
        }
        assert_eq!(checked, payload.len());
    }

    #[test]
    fn test_quiet_zone_covers_caption_ink() {
        let e = engine();
        let result = e.layout(&spec(38.0, &["FOO"], "12345")).unwrap();
        let (rect_origin, rect_size) = result
            .commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::FilledRect { origin_px, size_px } => Some((*origin_px, *size_px)),
                _ => None,
            })
            .expect("quiet zone");
        let caption_pt = result.caption_font_pt.unwrap();
        let caption = e.measurer().measure("12345", caption_pt).unwrap();
        assert!(rect_size.width > caption.width);
        assert!((rect_origin.x + rect_size.width / 2.0 - 51.5).abs() < 1e-9);
        let rect_bottom_mm = px_to_mm(rect_origin.y + rect_size.height);
        assert!(rect_bottom_mm <= result.height_mm - 3.0 + 1e-9);
    }

    #[test]
    fn test_invalid_payload_fails_layout() {
        let err = engine()
            .layout(&spec(38.0, &["FOO"], "AB\u{c8}"))
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidPayload { code_point: 200, .. }));
    }

    #[test]
    fn test_invalid_payload_fails_even_when_too_wide() {
        let payload = format!("{}\u{1}", "X".repeat(40));
        assert!(matches!(
            engine().layout(&spec(38.0, &["FOO"], &payload)),
            Err(LayoutError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_valid_mixed_payload_succeeds() {
        // 35 + 6 × 11 = 101px, just inside the 103px of a 38mm label.
        assert!(engine().layout(&spec(38.0, &["FOO"], "ABC123")).unwrap().has_barcode());
        assert!(engine().layout(&spec(62.0, &["FOO"], "ABC123")).unwrap().has_barcode());
    }

    #[test]
    fn test_unavailable_measurer_fails_layout() {
        let e = LayoutEngine::new(Unavailable);
        assert!(matches!(
            e.layout(&spec(38.0, &["FOO"], "")),
            Err(LayoutError::MeasurementUnavailable(_))
        ));
        assert!(matches!(
            e.layout(&spec(38.0, &[], "123")),
            Err(LayoutError::MeasurementUnavailable(_))
        ));
    }

    #[test]
    fn test_unavailable_measurer_not_needed_for_blank_label() {
        let e = LayoutEngine::new(Unavailable);
        assert!(e.layout(&spec(38.0, &[], "")).is_ok());
    }

    #[test]
    fn test_non_linear_font_fits_in_one_corrective_pass() {
        let measurer = SuperLinear {
            measure_calls: AtomicUsize::new(0),
        };
        let e = LayoutEngine::new(&measurer);
        let result = e.layout(&spec(38.0, &["12345"], "")).unwrap();

        assert_eq!(measurer.measure_calls.load(Ordering::SeqCst), 2);
        let w0 = 5.0 * 0.1 * REFERENCE_FONT_PT.powf(1.2);
        let expected = REFERENCE_FONT_PT * 103.0 / w0 * FIT_SAFETY_FACTOR;
        assert!((result.text_font_pt - expected).abs() < 1e-9);

        // Shrinking a super-linear font leaves it narrower than predicted; the
        // residual is accepted, not iterated away.
        let fitted = measurer.measure("12345", result.text_font_pt).unwrap();
        assert!(fitted.width < 103.0 * FIT_SAFETY_FACTOR);
    }
}
