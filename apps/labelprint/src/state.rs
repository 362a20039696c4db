use std::sync::Arc;

use crate::config::Config;
use crate::layout::{LayoutEngine, MetricMeasurer};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Stateless; shared by every request and run on the blocking pool.
    pub engine: Arc<LayoutEngine<MetricMeasurer>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let engine = Arc::new(LayoutEngine::new(MetricMeasurer::new(config.font)));
        Self { config, engine }
    }
}
