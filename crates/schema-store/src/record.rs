use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AcType, AllotmentId, CredentialId, RoomId};

/// A stored room with its denormalized occupancy counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub floor: String,
    pub room_number: String,
    pub ac_type: AcType,
    pub total_beds: u32,
    /// Always equal to the number of live allotments for this room.
    pub occupied_beds: u32,
}

impl Room {
    /// Returns the number of beds without an occupant.
    pub fn vacant_beds(&self) -> u32 {
        self.total_beds.saturating_sub(self.occupied_beds)
    }

    /// Returns true if no bed is free.
    pub fn is_full(&self) -> bool {
        self.occupied_beds >= self.total_beds
    }
}

/// Fields required to insert a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoom {
    pub floor: String,
    pub room_number: String,
    pub ac_type: AcType,
    pub total_beds: u32,
}

impl NewRoom {
    pub fn new(
        floor: impl Into<String>,
        room_number: impl Into<String>,
        ac_type: AcType,
        total_beds: u32,
    ) -> Self {
        Self {
            floor: floor.into(),
            room_number: room_number.into(),
            ac_type,
            total_beds,
        }
    }

    pub(crate) fn into_room(self, id: RoomId) -> Room {
        Room {
            id,
            floor: self.floor,
            room_number: self.room_number,
            ac_type: self.ac_type,
            total_beds: self.total_beds,
            occupied_beds: 0,
        }
    }
}

/// Full replacement of a room's editable fields.
///
/// `occupied_beds` is checked against the live allotment count rather than
/// written through, so the ledger stays the only writer of the counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomUpdate {
    pub floor: String,
    pub room_number: String,
    pub ac_type: AcType,
    pub total_beds: u32,
    pub occupied_beds: u32,
}

/// A guest's assignment to one bed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allotment {
    pub id: AllotmentId,
    pub room_id: RoomId,
    pub guest_name: String,
    pub bed_number: u32,
    pub created_at: DateTime<Utc>,
    /// Store-assigned insertion order; breaks ties between equal `created_at`.
    pub sequence: i64,
}

/// Fields required to allot a bed. The bed number is chosen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAllotment {
    pub room_id: RoomId,
    pub guest_name: String,
    pub created_at: DateTime<Utc>,
}

impl NewAllotment {
    pub fn new(room_id: RoomId, guest_name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            room_id,
            guest_name: guest_name.into(),
            created_at,
        }
    }
}

/// An occupied bed as seen from a room listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedAssignment {
    pub bed_number: u32,
    pub guest_name: String,
    pub allotment_id: AllotmentId,
}

/// A room snapshot annotated with its current occupants, ordered by bed number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListing {
    pub room: Room,
    pub beds: Vec<BedAssignment>,
}

impl RoomListing {
    /// Returns the occupant names in bed order.
    pub fn guest_names(&self) -> Vec<&str> {
        self.beds.iter().map(|b| b.guest_name.as_str()).collect()
    }
}

/// Outcome of deleting a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDeletion {
    pub room: Room,
    pub removed_allotments: u64,
}

/// A stored login credential. The secret is always a pre-computed hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: CredentialId,
    pub email: String,
    pub password_hash: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Fields required to insert a credential.
#[derive(Clone, PartialEq, Eq)]
pub struct NewCredential {
    pub email: String,
    pub password_hash: String,
}

impl std::fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewCredential")
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vacant_beds_and_full_flag() {
        let mut room = NewRoom::new("1ST FLOOR", "101", AcType::Ac, 2).into_room(RoomId::new());
        assert_eq!(room.vacant_beds(), 2);
        assert!(!room.is_full());

        room.occupied_beds = 2;
        assert_eq!(room.vacant_beds(), 0);
        assert!(room.is_full());
    }

    #[test]
    fn credential_debug_hides_hash() {
        let credential = Credential {
            id: CredentialId::new(),
            email: "warden@example.com".to_string(),
            password_hash: "argon2id$secret".to_string(),
        };
        let rendered = format!("{credential:?}");
        assert!(rendered.contains("warden@example.com"));
        assert!(!rendered.contains("secret"));
    }
}
