use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    error::AppResult,
    extract::AppPath,
    models::{CategoryChanges, NewCategory},
    AppState,
};

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let categories = state.categories.list().await?;

    info!(count = categories.len(), "Listed categories");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "data": categories,
            "count": categories.len(),
        })),
    ))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<NewCategory>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let category = state.categories.create(payload).await?;

    info!(id = category.id, name = %category.name, "Created category");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "data": category })),
    ))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

pub async fn get_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let category = state.categories.get(id).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "data": category })),
    ))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn update_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    Json(payload): Json<CategoryChanges>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let category = state.categories.update(id, payload).await?;

    info!(id, "Updated category");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "data": category })),
    ))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    state.categories.delete(id).await?;

    info!(id, "Deleted category");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "Category deleted",
            "id": id,
        })),
    ))
}
