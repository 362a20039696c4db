use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::layout::engine::REFERENCE_FONT_PT;
use crate::layout::measure::TextMeasurer;
use crate::layout::FontFamily;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
    pub font: FontFamily,
    pub default_width_mm: f64,
}

/// GET /health
/// Reports the configured label stock. Answers 503 while the text measurer cannot
/// produce metrics, since every text layout would fail.
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    state.engine.measurer().ascent(REFERENCE_FONT_PT)?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        service: env!("CARGO_PKG_NAME"),
        font: state.config.font,
        default_width_mm: state.config.default_width_mm,
    }))
}
