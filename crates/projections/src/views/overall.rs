use schema_store::RoomListing;
use serde::Serialize;

use crate::projection::Projection;

/// Totals across every room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverallSummary {
    pub total_rooms: u64,
    pub total_beds: u64,
    pub total_occupied: u64,
    pub total_vacant: u64,
}

impl Projection for OverallSummary {
    type Output = Self;

    fn name() -> &'static str {
        "overall_summary"
    }

    fn handle(&mut self, listing: &RoomListing) {
        let room = &listing.room;
        self.total_rooms += 1;
        self.total_beds += u64::from(room.total_beds);
        self.total_occupied += u64::from(room.occupied_beds);
        self.total_vacant += u64::from(room.vacant_beds());
    }

    fn finish(self) -> Self::Output {
        self
    }
}
