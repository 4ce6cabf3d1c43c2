use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

// Liveness probe
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Metrics endpoint: returns JSON snapshot
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.get_snapshot())
}

// Prometheus-compatible text exposition format
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.metrics.get_snapshot();
    let body = format!(
        "# HELP pfadfinder_route_candidates Route files seen during discovery\n# TYPE pfadfinder_route_candidates gauge\npfadfinder_route_candidates {}\n\
# HELP pfadfinder_modules_loaded Route modules registered\n# TYPE pfadfinder_modules_loaded gauge\npfadfinder_modules_loaded {}\n\
# HELP pfadfinder_modules_failed Route files skipped\n# TYPE pfadfinder_modules_failed gauge\npfadfinder_modules_failed {}\n\
# HELP pfadfinder_routes_registered Method routes registered\n# TYPE pfadfinder_routes_registered gauge\npfadfinder_routes_registered {}\n\
# HELP pfadfinder_requests_total Requests served\n# TYPE pfadfinder_requests_total counter\npfadfinder_requests_total {}\n\
# HELP pfadfinder_uptime_seconds Uptime seconds\n# TYPE pfadfinder_uptime_seconds gauge\npfadfinder_uptime_seconds {}\n",
        m.candidates,
        m.modules_loaded,
        m.modules_failed,
        m.routes_registered,
        m.requests_total,
        m.uptime_seconds,
    );
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

// Version/Build info endpoint (JSON)
pub async fn version() -> impl IntoResponse {
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    (StatusCode::OK, Json(body))
}
