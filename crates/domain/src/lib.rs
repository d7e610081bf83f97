//! Domain layer for the dormitory bed tracker.
//!
//! This crate provides:
//! - Room registry for creating, editing and deleting rooms
//! - Allotment ledger for putting guests into beds and taking them out
//! - Credential directory consulted by the sign-in flow
//! - Input validation and the default room layout

pub mod credentials;
pub mod error;
pub mod room;

pub use credentials::{CredentialDirectory, PasswordHash};
pub use error::{DomainError, ErrorKind, Result};
pub use room::{
    AllotBed, AllotmentLedger, BedCount, BedSlot, CreateRoom, DEFAULT_ROOMS, Floor, GuestName,
    Occupant, RemoveBed, RevertLast, RoomNumber, RoomRegistry, UpdateRoom, ValidationError,
    bed_slots, parse_ac_type,
};
