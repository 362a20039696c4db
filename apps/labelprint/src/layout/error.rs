use thiserror::Error;

/// Fatal outcomes of a single layout call.
///
/// Everything else (empty text, empty payload, a barcode wider than the label) is a
/// degrade path that still produces a valid `LayoutResult`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error(
        "invalid barcode payload {payload:?}: character U+{code_point:04X} at position {position} \
         is outside printable ASCII (32..=127)"
    )]
    InvalidPayload {
        payload: String,
        position: usize,
        code_point: u32,
    },

    #[error("text measurement unavailable: {0}")]
    MeasurementUnavailable(String),
}
