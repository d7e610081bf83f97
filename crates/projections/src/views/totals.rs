use schema_store::Room;
use serde::Serialize;

/// Room count and bed sums for a group of rooms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BedTotals {
    pub room_count: u64,
    pub total_beds: u64,
    pub occupied_beds: u64,
    pub vacant_beds: u64,
}

impl BedTotals {
    pub fn add_room(&mut self, room: &Room) {
        self.room_count += 1;
        self.total_beds += u64::from(room.total_beds);
        self.occupied_beds += u64::from(room.occupied_beds);
        self.vacant_beds += u64::from(room.vacant_beds());
    }
}

#[cfg(test)]
mod tests {
    use common::{AcType, RoomId};

    use super::*;

    #[test]
    fn add_room_accumulates() {
        let mut totals = BedTotals::default();
        for (total, occupied) in [(4, 1), (2, 2)] {
            totals.add_room(&Room {
                id: RoomId::new(),
                floor: "1ST FLOOR".to_string(),
                room_number: "101".to_string(),
                ac_type: AcType::Ac,
                total_beds: total,
                occupied_beds: occupied,
            });
        }

        assert_eq!(
            totals,
            BedTotals {
                room_count: 2,
                total_beds: 6,
                occupied_beds: 3,
                vacant_beds: 3,
            }
        );
    }
}
