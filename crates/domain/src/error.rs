//! Domain error types.

use std::fmt;

use schema_store::StoreError;
use serde::Serialize;
use thiserror::Error;

use crate::room::ValidationError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The command's input was rejected before reaching the store.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store refused or failed the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience result alias for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Caller-facing classification of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Duplicate,
    CapacityExceeded,
    NothingToRevert,
    NotFound,
    Busy,
    Conflict,
    StorageFault,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::CapacityExceeded => "capacity_exceeded",
            ErrorKind::NothingToRevert => "nothing_to_revert",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Busy => "busy",
            ErrorKind::Conflict => "conflict",
            ErrorKind::StorageFault => "storage_fault",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DomainError {
    /// Classifies the error for callers that map it onto a response.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::Store(err) => match err {
                StoreError::DuplicateRoom { .. } | StoreError::DuplicateCredential { .. } => {
                    ErrorKind::Duplicate
                }
                StoreError::RoomNotFound(_) | StoreError::AllotmentNotFound { .. } => {
                    ErrorKind::NotFound
                }
                StoreError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
                StoreError::NothingToRevert(_) => ErrorKind::NothingToRevert,
                StoreError::OccupancyMismatch { .. }
                | StoreError::CapacityBelowOccupiedBed { .. } => ErrorKind::Validation,
                StoreError::Busy { .. } => ErrorKind::Busy,
                StoreError::Conflict { .. } => ErrorKind::Conflict,
                StoreError::Corrupt(_) | StoreError::Database(_) | StoreError::Migration(_) => {
                    ErrorKind::StorageFault
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use common::RoomId;

    use super::*;

    #[test]
    fn store_errors_are_classified() {
        let room_id = RoomId::new();
        let cases = [
            (StoreError::RoomNotFound(room_id), ErrorKind::NotFound),
            (
                StoreError::CapacityExceeded {
                    room_id,
                    total_beds: 2,
                },
                ErrorKind::CapacityExceeded,
            ),
            (StoreError::NothingToRevert(room_id), ErrorKind::NothingToRevert),
            (
                StoreError::OccupancyMismatch {
                    room_id,
                    requested: 1,
                    live: 2,
                },
                ErrorKind::Validation,
            ),
            (
                StoreError::Busy {
                    operation: "insert_allotment",
                    timeout: Duration::from_millis(10),
                },
                ErrorKind::Busy,
            ),
            (
                StoreError::Corrupt("bad row".to_string()),
                ErrorKind::StorageFault,
            ),
        ];

        for (err, kind) in cases {
            assert_eq!(DomainError::from(err).kind(), kind);
        }
    }

    #[test]
    fn validation_errors_keep_their_message() {
        let err = DomainError::from(ValidationError::BlankGuestName);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Please enter a valid guest name");
    }
}
