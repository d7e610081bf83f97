//! Room and allotment commands.

use common::{AllotmentId, RoomId};
use schema_store::{NewRoom, RoomUpdate};

use super::{BedCount, Floor, GuestName, RoomNumber, ValidationError, parse_ac_type};

/// Command to register a new room.
///
/// Fields hold raw form input; validation happens when the command runs.
#[derive(Debug, Clone)]
pub struct CreateRoom {
    pub floor: String,
    pub room_number: String,
    pub ac_type: String,
    pub total_beds: i64,
}

impl CreateRoom {
    /// Creates a new CreateRoom command.
    pub fn new(
        floor: impl Into<String>,
        room_number: impl Into<String>,
        ac_type: impl Into<String>,
        total_beds: i64,
    ) -> Self {
        Self {
            floor: floor.into(),
            room_number: room_number.into(),
            ac_type: ac_type.into(),
            total_beds,
        }
    }

    pub(crate) fn validate(&self) -> Result<NewRoom, ValidationError> {
        let floor = Floor::parse(&self.floor)?;
        let room_number = RoomNumber::parse(&self.room_number)?;
        let ac_type = parse_ac_type(&self.ac_type)?;
        let total_beds = BedCount::new(self.total_beds)?;

        Ok(NewRoom::new(
            floor.into_inner(),
            room_number.into_inner(),
            ac_type,
            total_beds.get(),
        ))
    }
}

/// Command to overwrite a room's fields.
#[derive(Debug, Clone)]
pub struct UpdateRoom {
    pub room_id: RoomId,
    pub floor: String,
    pub room_number: String,
    pub ac_type: String,
    pub total_beds: i64,
    /// Must match the room's live allotment count.
    pub occupied_beds: i64,
}

impl UpdateRoom {
    /// Creates a new UpdateRoom command.
    pub fn new(
        room_id: RoomId,
        floor: impl Into<String>,
        room_number: impl Into<String>,
        ac_type: impl Into<String>,
        total_beds: i64,
        occupied_beds: i64,
    ) -> Self {
        Self {
            room_id,
            floor: floor.into(),
            room_number: room_number.into(),
            ac_type: ac_type.into(),
            total_beds,
            occupied_beds,
        }
    }

    pub(crate) fn validate(&self) -> Result<RoomUpdate, ValidationError> {
        let floor = Floor::parse(&self.floor)?;
        let room_number = RoomNumber::parse(&self.room_number)?;
        let ac_type = parse_ac_type(&self.ac_type)?;
        let total_beds = BedCount::new(self.total_beds)?;
        let occupied_beds = total_beds.occupied(self.occupied_beds)?;

        Ok(RoomUpdate {
            floor: floor.into_inner(),
            room_number: room_number.into_inner(),
            ac_type,
            total_beds: total_beds.get(),
            occupied_beds,
        })
    }
}

/// Command to place a guest in the lowest free bed of a room.
#[derive(Debug, Clone)]
pub struct AllotBed {
    pub room_id: RoomId,
    pub guest_name: String,
}

impl AllotBed {
    /// Creates a new AllotBed command.
    pub fn new(room_id: RoomId, guest_name: impl Into<String>) -> Self {
        Self {
            room_id,
            guest_name: guest_name.into(),
        }
    }

    pub(crate) fn validate(&self) -> Result<GuestName, ValidationError> {
        GuestName::parse(&self.guest_name)
    }
}

/// Command to undo the most recent allotment in a room.
#[derive(Debug, Clone, Copy)]
pub struct RevertLast {
    pub room_id: RoomId,
}

impl RevertLast {
    /// Creates a new RevertLast command.
    pub fn new(room_id: RoomId) -> Self {
        Self { room_id }
    }
}

/// Command to free one specific bed.
#[derive(Debug, Clone, Copy)]
pub struct RemoveBed {
    pub room_id: RoomId,
    pub allotment_id: AllotmentId,
}

impl RemoveBed {
    /// Creates a new RemoveBed command.
    pub fn new(room_id: RoomId, allotment_id: AllotmentId) -> Self {
        Self {
            room_id,
            allotment_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use common::AcType;

    use super::*;

    #[test]
    fn create_room_validates_into_new_room() {
        let new_room = CreateRoom::new(" 1ST FLOOR ", "101 ", "AC", 2)
            .validate()
            .unwrap();
        assert_eq!(new_room, NewRoom::new("1ST FLOOR", "101", AcType::Ac, 2));
    }

    #[test]
    fn create_room_reports_first_invalid_field() {
        let err = CreateRoom::new("Select Floor", "", "", 0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFloor { .. }));

        let err = CreateRoom::new("1ST FLOOR", "101", "AC", -1)
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidTotalBeds { value: -1 });
    }

    #[test]
    fn update_room_bounds_occupied_beds() {
        let room_id = RoomId::new();
        let err = UpdateRoom::new(room_id, "1ST FLOOR", "101", "AC", 2, 3)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidOccupiedBeds {
                value: 3,
                total_beds: 2
            }
        );

        let update = UpdateRoom::new(room_id, "1ST FLOOR", "101", "NON AC", 4, 1)
            .validate()
            .unwrap();
        assert_eq!(update.ac_type, AcType::NonAc);
        assert_eq!(update.occupied_beds, 1);
    }

    #[test]
    fn allot_bed_rejects_blank_name() {
        let cmd = AllotBed::new(RoomId::new(), "   ");
        assert_eq!(cmd.validate(), Err(ValidationError::BlankGuestName));
    }
}
