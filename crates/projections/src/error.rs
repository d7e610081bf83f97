//! Projection error types.

use schema_store::StoreError;
use thiserror::Error;

/// Errors that can occur while computing a projection.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The room listing could not be read.
    #[error("Schema store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
