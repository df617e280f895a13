use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod store;

use crate::config::{AllowedOrigins, Config};
use crate::store::CategoryStore;

/// Shared application state — cheap to clone (all heap behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub categories: Arc<dyn CategoryStore>,
}

impl AppState {
    pub fn new(config: Config, categories: Arc<dyn CategoryStore>) -> Self {
        Self {
            config: Arc::new(config),
            categories,
        }
    }
}

/// Any method and header, credentials allowed. The request origin is echoed
/// back since browsers refuse `*` together with credentials.
pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    match origins {
        AllowedOrigins::Any => cors.allow_origin(AllowOrigin::mirror_request()),
        AllowedOrigins::List(list) => cors.allow_origin(AllowOrigin::list(list.iter().cloned())),
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        // ── Service info ────────────────────────────────────────────────────
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/info", get(handlers::info))

        // ── Categories CRUD ─────────────────────────────────────────────────
        .route(
            "/api/categories",
            get(handlers::categories::list_categories)
                .post(handlers::categories::create_category),
        )
        .route(
            "/api/categories/:id",
            get(handlers::categories::get_category)
                .put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        )

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
