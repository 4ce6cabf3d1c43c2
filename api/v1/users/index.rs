use axum::{http::StatusCode, Json};
use pfadfinder::discovery::RouteContext;
use pfadfinder::error::{AppError, AppResult};
use pfadfinder::state::AppState;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::sample;

pub fn register(ctx: &mut RouteContext<AppState>) -> anyhow::Result<()> {
    ctx.get(list).post(create);
    Ok(())
}

async fn list() -> Json<Value> {
    Json(json!({ "users": sample::USERS.iter().map(sample::to_json).collect::<Vec<_>>() }))
}

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
}

async fn create(Json(body): Json<NewUser>) -> AppResult<(StatusCode, Json<Value>)> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::ValidationError { field: "name".into(), message: "must not be empty".into() });
    }
    if sample::USERS.iter().any(|u| u.name.eq_ignore_ascii_case(name)) {
        return Err(AppError::Conflict(format!("user '{}' already exists", name)));
    }
    let id = uuid::Uuid::new_v4().to_string();
    Ok((StatusCode::CREATED, Json(json!({ "id": id, "name": name }))))
}
