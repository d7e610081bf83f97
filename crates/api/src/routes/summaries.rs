//! Summary and report endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use projections::{AcTypeRow, FloorAcRow, FloorRow, OccupancyReport, OverallSummary};
use schema_store::SchemaStore;

use super::AppState;
use crate::error::ApiError;

/// GET /summaries/floor-ac — totals per floor and AC type.
pub async fn floor_ac<S: SchemaStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<FloorAcRow>>, ApiError> {
    Ok(Json(state.projector.floor_ac_summary().await?))
}

/// GET /summaries/overall — building totals.
pub async fn overall<S: SchemaStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<OverallSummary>, ApiError> {
    Ok(Json(state.projector.overall_summary().await?))
}

/// GET /summaries/floors — totals per floor.
pub async fn floors<S: SchemaStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<FloorRow>>, ApiError> {
    Ok(Json(state.projector.floor_summary().await?))
}

/// GET /summaries/ac-types — totals per AC type.
pub async fn ac_types<S: SchemaStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<AcTypeRow>>, ApiError> {
    Ok(Json(state.projector.ac_type_summary().await?))
}

/// GET /reports/occupancy — rooms grouped by floor with their occupants.
pub async fn occupancy<S: SchemaStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<OccupancyReport>, ApiError> {
    Ok(Json(state.projector.occupancy_report().await?))
}
