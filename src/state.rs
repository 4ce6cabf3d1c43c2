use std::sync::Arc;

use crate::config::AppConfig;
use crate::discovery::RouteDoc;
use crate::metrics::Metrics;

/// The shared application state.
///
/// Cheap to clone; everything inside is behind an `Arc`. Built after the
/// discovery pass, so the route listing never changes while serving.
#[derive(Clone)]
pub struct AppState {
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Discovery counters and request count.
    pub metrics: Metrics,
    /// Documentation of every discovered route, in registration order.
    pub routes: Arc<Vec<RouteDoc>>,
}

impl AppState {
    pub fn new(config: AppConfig, metrics: Metrics, routes: Vec<RouteDoc>) -> Self {
        Self { config: Arc::new(config), metrics, routes: Arc::new(routes) }
    }
}
