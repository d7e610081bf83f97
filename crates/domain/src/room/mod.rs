//! Rooms, their beds and the rules for allotting them.

mod commands;
mod ledger;
mod registry;
mod seed;
mod value_objects;

pub use commands::{AllotBed, CreateRoom, RemoveBed, RevertLast, UpdateRoom};
pub use ledger::{AllotmentLedger, BedSlot, Occupant, bed_slots};
pub use registry::RoomRegistry;
pub use seed::DEFAULT_ROOMS;
pub use value_objects::{BedCount, Floor, GuestName, RoomNumber, parse_ac_type};

use thiserror::Error;

/// Errors raised by input validation, before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Floor is blank or still the picker placeholder.
    #[error("Please select a valid floor (got {input:?})")]
    InvalidFloor { input: String },

    /// Room number is blank or still the picker placeholder.
    #[error("Please select a valid room number (got {input:?})")]
    InvalidRoomNumber { input: String },

    /// AC type is blank, the placeholder, or unknown.
    #[error("Please select a valid AC type (got {input:?})")]
    InvalidAcType { input: String },

    /// Total beds must lie between one and `BedCount::MAX`.
    #[error("Total beds must be a number between 1 and 1000 (got {value})")]
    InvalidTotalBeds { value: i64 },

    /// Occupied beds must lie between zero and the total.
    #[error("Occupied beds must be between 0 and {total_beds} (got {value})")]
    InvalidOccupiedBeds { value: i64, total_beds: u32 },

    /// Guest name is blank after trimming.
    #[error("Please enter a valid guest name")]
    BlankGuestName,

    /// Credential email is blank after trimming.
    #[error("Email is required")]
    BlankEmail,

    /// Password hash is empty.
    #[error("Password hash is required")]
    BlankPasswordHash,
}
