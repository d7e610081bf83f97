//! Occupancy report: every room grouped by floor with its occupants.

use common::{AcType, RoomId};
use schema_store::{BedAssignment, RoomListing};
use serde::Serialize;

use super::OverallSummary;
use crate::projection::Projection;

/// Whether a room can take another guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoomStatus {
    Full,
    Available,
}

/// One room line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomReport {
    pub room_id: RoomId,
    pub room_number: String,
    pub ac_type: AcType,
    pub total_beds: u32,
    pub occupied_beds: u32,
    pub vacant_beds: u32,
    pub status: RoomStatus,
    /// Occupied beds ordered by bed number.
    pub beds: Vec<BedAssignment>,
}

/// The rooms of one floor, in listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorReport {
    pub floor: String,
    pub rooms: Vec<RoomReport>,
}

/// Rooms grouped by floor, with building totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OccupancyReport {
    pub floors: Vec<FloorReport>,
    pub totals: OverallSummary,
}

impl Projection for OccupancyReport {
    type Output = Self;

    fn name() -> &'static str {
        "occupancy_report"
    }

    fn handle(&mut self, listing: &RoomListing) {
        self.totals.handle(listing);

        let room = &listing.room;
        let line = RoomReport {
            room_id: room.id,
            room_number: room.room_number.clone(),
            ac_type: room.ac_type,
            total_beds: room.total_beds,
            occupied_beds: room.occupied_beds,
            vacant_beds: room.vacant_beds(),
            status: if room.is_full() {
                RoomStatus::Full
            } else {
                RoomStatus::Available
            },
            beds: listing.beds.clone(),
        };

        // Listings arrive ordered by floor, so a floor change starts a new group.
        match self.floors.last_mut() {
            Some(group) if group.floor == room.floor => group.rooms.push(line),
            _ => self.floors.push(FloorReport {
                floor: room.floor.clone(),
                rooms: vec![line],
            }),
        }
    }

    fn finish(self) -> Self::Output {
        self
    }
}
