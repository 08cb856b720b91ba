use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/healthcheck", get(healthcheck))
}

async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": 200, "message": "Healthy" }))
}
