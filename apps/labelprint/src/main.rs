mod config;
mod errors;
mod labels;
mod layout;
mod printer;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::labels::load_text_job;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Label layout: {:?}, {} mm default width, margins {:?}",
        config.font, config.default_width_mm, config.margins
    );

    let state = AppState::new(config.clone());

    // `labelprint <job.txt>` lays out one text job and prints the result.
    if let Some(path) = std::env::args().nth(1) {
        return layout_file(&state, &path).await;
    }

    info!("Starting labelprint v{}", env!("CARGO_PKG_VERSION"));

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// One-shot layout of a two-field text job; JSON result on stdout.
async fn layout_file(state: &AppState, path: &str) -> Result<()> {
    let job = load_text_job(path).await?;
    let spec = job.into_spec(&state.config)?;
    let layout = state
        .engine
        .layout(&spec)
        .with_context(|| format!("failed to lay out {path}"))?;

    info!(
        "{}: {:.1} mm long, text {:.1} pt",
        path, layout.height_mm, layout.text_font_pt
    );
    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}
