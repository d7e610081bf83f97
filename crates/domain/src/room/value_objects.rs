//! Validated inputs for room and allotment commands.

use common::AcType;
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Picker placeholders that mean "nothing chosen yet".
const FLOOR_PLACEHOLDERS: &[&str] = &["Select Floor", "Custom Floor"];
const ROOM_NUMBER_PLACEHOLDERS: &[&str] = &["Select Room Number", "Custom Room"];
const AC_TYPE_PLACEHOLDERS: &[&str] = &["Select AC Type"];

fn selected<'a>(raw: &'a str, placeholders: &[&str]) -> Option<&'a str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || placeholders.contains(&trimmed) {
        None
    } else {
        Some(trimmed)
    }
}

/// A floor label, e.g. "GROUND FLOOR".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Floor(String);

impl Floor {
    /// Trims the input and rejects blanks and picker placeholders.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        selected(raw, FLOOR_PLACEHOLDERS)
            .map(|s| Self(s.to_string()))
            .ok_or_else(|| ValidationError::InvalidFloor {
                input: raw.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// A room label, unique within its floor and AC type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomNumber(String);

impl RoomNumber {
    /// Trims the input and rejects blanks and picker placeholders.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        selected(raw, ROOM_NUMBER_PLACEHOLDERS)
            .map(|s| Self(s.to_string()))
            .ok_or_else(|| ValidationError::InvalidRoomNumber {
                input: raw.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Parses an AC type label, rejecting blanks and the picker placeholder.
pub fn parse_ac_type(raw: &str) -> Result<AcType, ValidationError> {
    let invalid = || ValidationError::InvalidAcType {
        input: raw.to_string(),
    };
    selected(raw, AC_TYPE_PLACEHOLDERS)
        .ok_or_else(invalid)?
        .parse::<AcType>()
        .map_err(|_| invalid())
}

/// A positive bed capacity, at most [`BedCount::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BedCount(u32);

impl BedCount {
    /// Largest capacity a single room may declare.
    pub const MAX: u32 = 1_000;

    /// Accepts any integer in `1..=BedCount::MAX`.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        match u32::try_from(value) {
            Ok(beds) if (1..=Self::MAX).contains(&beds) => Ok(Self(beds)),
            _ => Err(ValidationError::InvalidTotalBeds { value }),
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Validates an occupied count against this capacity.
    pub fn occupied(&self, value: i64) -> Result<u32, ValidationError> {
        match u32::try_from(value) {
            Ok(occupied) if occupied <= self.0 => Ok(occupied),
            _ => Err(ValidationError::InvalidOccupiedBeds {
                value,
                total_beds: self.0,
            }),
        }
    }
}

/// The name of the guest occupying a bed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestName(String);

impl GuestName {
    /// Trims the input and rejects blanks.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::BlankGuestName);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for GuestName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
