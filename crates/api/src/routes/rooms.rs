//! Room CRUD and bed layout endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use domain::{BedSlot, CreateRoom, UpdateRoom, parse_ac_type};
use schema_store::{Room, RoomListing, RoomQuery, SchemaStore};
use serde::{Deserialize, Serialize};

use super::{AppState, parse_room_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub floor: String,
    pub room_number: String,
    pub ac_type: String,
    pub total_beds: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoomRequest {
    pub floor: String,
    pub room_number: String,
    pub ac_type: String,
    pub total_beds: i64,
    pub occupied_beds: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListRoomsParams {
    pub floor: Option<String>,
    pub ac_type: Option<String>,
    pub search: Option<String>,
}

impl ListRoomsParams {
    fn into_query(self) -> Result<RoomQuery, ApiError> {
        let mut query = RoomQuery::new();
        if let Some(floor) = self.floor.filter(|f| !f.trim().is_empty()) {
            query = query.floor(floor.trim());
        }
        if let Some(ac_type) = self.ac_type.filter(|a| !a.trim().is_empty()) {
            query = query.ac_type(parse_ac_type(&ac_type)?);
        }
        if let Some(search) = self.search {
            query = query.search(search);
        }
        Ok(query)
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct RoomDeletedResponse {
    pub room_id: String,
    pub removed_allotments: u64,
}

// -- Handlers --

/// POST /rooms — register a room.
#[tracing::instrument(skip(state))]
pub async fn create<S: SchemaStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    let cmd = CreateRoom::new(req.floor, req.room_number, req.ac_type, req.total_beds);
    let room = state.registry.create_room(cmd).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// GET /rooms — list rooms with their occupants.
#[tracing::instrument(skip(state))]
pub async fn list<S: SchemaStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ListRoomsParams>,
) -> Result<Json<Vec<RoomListing>>, ApiError> {
    let rooms = state.registry.collect_rooms(params.into_query()?).await?;
    Ok(Json(rooms))
}

/// GET /rooms/{id} — fetch one room.
#[tracing::instrument(skip(state))]
pub async fn get<S: SchemaStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Room>, ApiError> {
    let room_id = parse_room_id(&id)?;
    Ok(Json(state.registry.get_room(room_id).await?))
}

/// PUT /rooms/{id} — overwrite a room's fields.
#[tracing::instrument(skip(state))]
pub async fn update<S: SchemaStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRoomRequest>,
) -> Result<Json<Room>, ApiError> {
    let room_id = parse_room_id(&id)?;
    let cmd = UpdateRoom::new(
        room_id,
        req.floor,
        req.room_number,
        req.ac_type,
        req.total_beds,
        req.occupied_beds,
    );
    Ok(Json(state.registry.update_room(cmd).await?))
}

/// DELETE /rooms/{id} — delete a room and its allotments.
#[tracing::instrument(skip(state))]
pub async fn delete<S: SchemaStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<RoomDeletedResponse>, ApiError> {
    let room_id = parse_room_id(&id)?;
    let deletion = state.registry.delete_room(room_id).await?;

    Ok(Json(RoomDeletedResponse {
        room_id: room_id.to_string(),
        removed_allotments: deletion.removed_allotments,
    }))
}

/// GET /rooms/{id}/beds — every bed of the room, free or occupied.
#[tracing::instrument(skip(state))]
pub async fn beds<S: SchemaStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<BedSlot>>, ApiError> {
    let room_id = parse_room_id(&id)?;
    Ok(Json(state.ledger.room_beds(room_id).await?))
}
