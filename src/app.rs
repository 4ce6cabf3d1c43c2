use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{from_fn, from_fn_with_state, Next},
    response::Response,
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::discovery::Registry;
use crate::metrics::Metrics;
use crate::middleware::{cors::cors_layer, request_id_middleware, security_headers_middleware, SecurityHeaders};
use crate::routes::{docs, health};
use crate::state::AppState;

/// Paths served by [`build_app`] itself. Discovery must reserve them, since
/// the router panics on overlapping routes.
pub const BUILTIN_ROUTES: [&str; 5] = ["/healthz", "/version", "/metrics", "/metrics/prometheus", "/docs/routes"];

/// Assembles the server: built-in endpoints, the discovered routes and the middleware stack.
///
/// Layers from the outside in: CORS, request id, security headers, request counter, tracing.
pub fn build_app(state: AppState, registry: Registry<AppState>) -> Router {
    let security = Arc::new(SecurityHeaders::from_config(state.config.security.as_ref()));
    let cors = cors_layer(&state.config.cors);
    let metrics = state.metrics.clone();

    let app = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/version", get(health::version))
        .route("/metrics", get(health::metrics))
        .route("/metrics/prometheus", get(health::metrics_prometheus))
        .route("/docs/routes", get(docs::list_routes))
        .merge(registry.into_router_with(docs::method_not_allowed))
        .fallback(docs::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(metrics, count_requests))
        .layer(from_fn_with_state(security, security_headers_middleware))
        .layer(from_fn(request_id_middleware));

    match cors {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

async fn count_requests(State(metrics): State<Metrics>, req: Request, next: Next) -> Response {
    metrics.inc_requests();
    next.run(req).await
}
