//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use schema_store::SchemaStore;
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms: Option<u64>,
}

/// GET /health — reports whether the schema store answers.
pub async fn check<S: SchemaStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> (StatusCode, Json<HealthResponse>) {
    match state.registry.store().count_rooms().await {
        Ok(rooms) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                rooms: Some(rooms),
            }),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "health check could not reach the store");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    rooms: None,
                }),
            )
        }
    }
}
