pub mod categories;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;

use crate::AppState;

pub async fn root(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let api = &state.config.api;
    (
        StatusCode::OK,
        Json(json!({ "message": api.title, "version": api.version })),
    )
}

pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

pub async fn info(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let api = &state.config.api;
    (
        StatusCode::OK,
        Json(json!({
            "title": api.title,
            "description": api.description,
            "version": api.version,
        })),
    )
}
