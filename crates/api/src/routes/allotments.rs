//! Bed allotment endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{AllotBed, RemoveBed, RevertLast};
use schema_store::{Allotment, SchemaStore};
use serde::Deserialize;

use super::{AppState, parse_allotment_id, parse_room_id};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AllotBedRequest {
    pub guest_name: String,
}

/// POST /rooms/{id}/allotments — put a guest in the lowest free bed.
#[tracing::instrument(skip(state))]
pub async fn allot<S: SchemaStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AllotBedRequest>,
) -> Result<(StatusCode, Json<Allotment>), ApiError> {
    let room_id = parse_room_id(&id)?;
    let allotment = state
        .ledger
        .allot(AllotBed::new(room_id, req.guest_name))
        .await?;
    Ok((StatusCode::CREATED, Json(allotment)))
}

/// POST /rooms/{id}/revert — undo the room's most recent allotment.
#[tracing::instrument(skip(state))]
pub async fn revert<S: SchemaStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Allotment>, ApiError> {
    let room_id = parse_room_id(&id)?;
    Ok(Json(state.ledger.revert_last(RevertLast::new(room_id)).await?))
}

/// DELETE /rooms/{id}/allotments/{allotment_id} — free one bed.
#[tracing::instrument(skip(state))]
pub async fn remove<S: SchemaStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, allotment_id)): Path<(String, String)>,
) -> Result<Json<Allotment>, ApiError> {
    let room_id = parse_room_id(&id)?;
    let allotment_id = parse_allotment_id(&allotment_id)?;
    let removed = state
        .ledger
        .remove_bed(RemoveBed::new(room_id, allotment_id))
        .await?;
    Ok(Json(removed))
}
