use axum::{
    extract::{Query, State},
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{error_body, AppError};
use crate::middleware::RequestId;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoutesQuery {
    /// Only list routes of this API version.
    pub version: Option<String>,
}

/// Lists the discovered routes in registration order.
pub async fn list_routes(State(state): State<AppState>, Query(q): Query<RoutesQuery>) -> impl IntoResponse {
    let routes: Vec<_> = state
        .routes
        .iter()
        .filter(|r| q.version.as_deref().map_or(true, |v| r.version == v))
        .collect();

    Json(json!({
        "api_base": state.config.routes.api_base,
        "count": routes.len(),
        "routes": routes,
    }))
}

/// JSON 404 for anything no route matched.
pub async fn not_found(request_id: Option<Extension<RequestId>>, uri: Uri) -> impl IntoResponse {
    let id = request_id.as_ref().map(|Extension(id)| id);
    error_body(StatusCode::NOT_FOUND, "NOT_FOUND", &format!("No route for {}", uri.path()), None, id)
}

/// JSON 405 for a discovered path asked with a method no module bound.
pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::MethodNotAllowed(format!("{} is not served at {}", method, uri.path()))
}
