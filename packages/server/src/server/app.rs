//! Application setup and router construction.

use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use ingest::PostgresStore;

use crate::server::routes::{count_handler, district_handler, health_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub store: Arc<PostgresStore>,
}

/// Build the Axum application with all routes and middleware.
pub fn build_app(pool: PgPool) -> Router {
    let state = AppState {
        db_pool: pool.clone(),
        store: Arc::new(PostgresStore::new(pool)),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/district/:district_name", get(district_handler))
        .route("/api/count", get(count_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
