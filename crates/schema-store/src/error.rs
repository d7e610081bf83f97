use std::time::Duration;

use thiserror::Error;

use crate::{AcType, AllotmentId, RoomId};

/// Errors that can occur when interacting with the schema store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A room with the same floor, number and AC type already exists.
    #[error("Room already exists: {floor} / {room_number} ({ac_type})")]
    DuplicateRoom {
        floor: String,
        room_number: String,
        ac_type: AcType,
    },

    /// A credential with the same email already exists.
    #[error("Credential already exists for {email}")]
    DuplicateCredential { email: String },

    /// The room was not found.
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    /// The allotment does not exist or belongs to another room.
    #[error("Allotment {allotment_id} not found in room {room_id}")]
    AllotmentNotFound {
        allotment_id: AllotmentId,
        room_id: RoomId,
    },

    /// Every bed in the room is taken.
    #[error("Room {room_id} is full ({total_beds} beds)")]
    CapacityExceeded { room_id: RoomId, total_beds: u32 },

    /// The room has no live allotment to revert.
    #[error("Room {0} has no allotment to revert")]
    NothingToRevert(RoomId),

    /// An edit supplied an occupied count that disagrees with the ledger.
    #[error("Room {room_id} has {live} live allotments, refusing occupied count {requested}")]
    OccupancyMismatch {
        room_id: RoomId,
        requested: u32,
        live: u32,
    },

    /// An edit would leave an occupied bed outside the room's capacity.
    #[error("Room {room_id} cannot shrink to {requested} beds while bed {highest_bed} is occupied")]
    CapacityBelowOccupiedBed {
        room_id: RoomId,
        requested: u32,
        highest_bed: u32,
    },

    /// The store could not be locked within the configured timeout.
    #[error("Store busy: {operation} did not acquire its lock within {timeout:?}")]
    Busy {
        operation: &'static str,
        timeout: Duration,
    },

    /// The transaction lost a serialization race or deadlocked.
    #[error("Transaction conflict during {operation}")]
    Conflict { operation: &'static str },

    /// A stored row could not be mapped back into a record.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for schema store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
