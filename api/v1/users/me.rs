use axum::{http::HeaderMap, Json};
use pfadfinder::discovery::RouteContext;
use pfadfinder::error::{AppError, AppResult, OptionExt};
use pfadfinder::state::AppState;
use serde_json::Value;

use crate::api::sample;

const USER_HEADER: &str = "x-user-id";

pub fn register(ctx: &mut RouteContext<AppState>) -> anyhow::Result<()> {
    ctx.get(me);
    Ok(())
}

// Static segment; wins over `/users/:id` for the literal `me`.
async fn me(headers: HeaderMap) -> AppResult<Json<Value>> {
    let id = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest(format!("missing {} header", USER_HEADER)))?;
    let user = sample::find(id).ok_or_not_found("user")?;
    Ok(Json(sample::to_json(user)))
}
