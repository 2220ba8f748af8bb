use std::sync::Arc;
use std::time::Duration;

use ctrl180_core::models::layout::LayoutTable;
use ctrl180_export::styles::RenderStyles;
use ctrl180_export::templates::TemplateStore;

use crate::chart::{ChartFetcher, HttpChartFetcher};
use crate::config::ServiceConfig;

/// Shared application state, injected into all route handlers via Axum state.
///
/// Everything here is read-only after startup; requests build their own
/// layout from `layout` rather than mutating it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub templates: TemplateStore,
    pub layout: Arc<LayoutTable>,
    pub styles: RenderStyles,
    pub chart_fetcher: Arc<dyn ChartFetcher>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        let fetcher = HttpChartFetcher::new(
            Duration::from_millis(config.chart_timeout_ms),
            config.chart_max_bytes,
        );
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    pub fn with_fetcher(config: ServiceConfig, chart_fetcher: Arc<dyn ChartFetcher>) -> Self {
        Self {
            templates: TemplateStore::new(config.template_dirs.iter().cloned()),
            config: Arc::new(config),
            layout: Arc::new(LayoutTable::standard()),
            styles: RenderStyles::default(),
            chart_fetcher,
        }
    }
}
