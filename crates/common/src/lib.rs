//! Shared types used across the dormitory bed-tracking crates.

mod types;

pub use types::{AcType, AllotmentId, CredentialId, ParseAcTypeError, RoomId};
