//! HTTP route handlers.

pub mod allotments;
pub mod health;
pub mod metrics;
pub mod rooms;
pub mod summaries;

use common::{AllotmentId, RoomId};
use domain::{AllotmentLedger, RoomRegistry};
use projections::SummaryProjector;
use schema_store::SchemaStore;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: SchemaStore> {
    pub registry: RoomRegistry<S>,
    pub ledger: AllotmentLedger<S>,
    pub projector: SummaryProjector<S>,
}

fn parse_uuid(id: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}

fn parse_room_id(id: &str) -> Result<RoomId, ApiError> {
    parse_uuid(id).map(RoomId::from)
}

fn parse_allotment_id(id: &str) -> Result<AllotmentId, ApiError> {
    parse_uuid(id).map(AllotmentId::from)
}
