pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::labels::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Label API
        .route("/api/v1/labels/layout", post(handlers::handle_layout))
        .route(
            "/api/v1/labels/layout/text",
            post(handlers::handle_layout_text),
        )
        .route("/api/v1/printer", get(handlers::handle_printer_profile))
        .with_state(state)
}
