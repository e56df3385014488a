use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::json;

use ingest::{Store, StoredRecord};

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint. Verifies database connectivity.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match sqlx::query("SELECT 1").execute(&state.db_pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                error: None,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "error".to_string(),
                error: Some(e.to_string()),
            }),
        ),
    }
}

/// All historical performance records for one district, newest report date
/// first. District names are stored upper-cased upstream.
pub async fn district_handler(
    State(state): State<AppState>,
    Path(district_name): Path<String>,
) -> Result<Json<Vec<StoredRecord>>, (StatusCode, Json<serde_json::Value>)> {
    let records = state
        .store
        .find_by_district(&district_name.to_uppercase())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, district = %district_name, "District lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "internal error"})),
            )
        })?;

    if records.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "detail": format!("No performance data found for district: {district_name}")
            })),
        ));
    }

    Ok(Json(records))
}

#[derive(Serialize)]
pub struct RecordCount {
    total_entries: i64,
}

/// Total number of performance records in the database.
pub async fn count_handler(
    State(state): State<AppState>,
) -> Result<Json<RecordCount>, (StatusCode, Json<serde_json::Value>)> {
    let total_entries = state.store.count().await.map_err(|e| {
        tracing::error!(error = %e, "Count query failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "internal error"})),
        )
    })?;

    Ok(Json(RecordCount { total_entries }))
}
