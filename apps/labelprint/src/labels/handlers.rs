//! Axum route handlers for the Label API.

use anyhow::anyhow;
use axum::{extract::State, Json};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::labels::jobs::LabelJob;
use crate::layout::LayoutResult;
use crate::printer::PrinterProfile;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub job_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Label length for operator display, e.g. "24.3 mm".
    pub length_mm_display: String,
    /// Main text size for operator display, e.g. "45.5 pt".
    pub font_size_display: String,
    pub layout: LayoutResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/labels/layout
///
/// Lays out a structured job `{ barcode, text, width_mm? }`.
pub async fn handle_layout(
    State(state): State<AppState>,
    Json(job): Json<LabelJob>,
) -> Result<Json<LayoutResponse>, AppError> {
    Ok(Json(run_layout(&state, job).await?))
}

/// POST /api/v1/labels/layout/text
///
/// Lays out a two-field plain-text job: first line barcode, remaining lines text.
pub async fn handle_layout_text(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LayoutResponse>, AppError> {
    let raw = std::str::from_utf8(&body)
        .map_err(|e| AppError::Validation(format!("body is not valid UTF-8: {e}")))?;
    Ok(Json(run_layout(&state, LabelJob::parse_text(raw)).await?))
}

/// GET /api/v1/printer
///
/// Returns the print-submission profile the service was configured with.
pub async fn handle_printer_profile(State(state): State<AppState>) -> Json<PrinterProfile> {
    Json(state.config.printer.clone())
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

async fn run_layout(state: &AppState, job: LabelJob) -> Result<LayoutResponse, AppError> {
    let spec = job.into_spec(&state.config)?;
    let job_id = Uuid::new_v4();
    let span = tracing::info_span!("layout", %job_id);

    // Layout is CPU-bound; keep it off the async executor.
    let engine = state.engine.clone();
    let blocking_span = span.clone();
    let layout = tokio::task::spawn_blocking(move || blocking_span.in_scope(|| engine.layout(&spec)))
        .await
        .map_err(|e| AppError::Internal(anyhow!("spawn_blocking failed in layout: {e}")))??;

    span.in_scope(|| {
        info!(
            height_mm = layout.height_mm,
            text_font_pt = layout.text_font_pt,
            barcode = layout.has_barcode(),
            "label laid out"
        )
    });

    Ok(LayoutResponse {
        job_id,
        generated_at: Utc::now(),
        length_mm_display: format!("{:.1} mm", layout.height_mm),
        font_size_display: format!("{:.1} pt", layout.text_font_pt),
        layout,
    })
}
