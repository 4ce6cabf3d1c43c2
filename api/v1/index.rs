use axum::{extract::State, Json};
use pfadfinder::discovery::RouteContext;
use pfadfinder::state::AppState;
use serde_json::{json, Value};

pub fn register(ctx: &mut RouteContext<AppState>) -> anyhow::Result<()> {
    ctx.get(overview);
    Ok(())
}

async fn overview(State(state): State<AppState>) -> Json<Value> {
    let routes: Vec<&str> =
        state.routes.iter().filter(|r| r.version == "v1").map(|r| r.path.as_str()).collect();
    Json(json!({
        "version": "v1",
        "routes": routes,
    }))
}
