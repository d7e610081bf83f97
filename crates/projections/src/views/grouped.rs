//! Totals grouped by floor, AC type, or both.

use std::collections::BTreeMap;

use common::AcType;
use schema_store::RoomListing;
use serde::Serialize;

use super::BedTotals;
use crate::projection::Projection;

/// Totals for one (floor, AC type) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorAcRow {
    pub floor: String,
    pub ac_type: AcType,
    #[serde(flatten)]
    pub totals: BedTotals,
}

/// Groups rooms by floor and AC type. Only pairs with at least one room
/// appear, ordered by floor and then AC type.
#[derive(Debug, Default)]
pub struct FloorAcSummary {
    groups: BTreeMap<(String, AcType), BedTotals>,
}

impl Projection for FloorAcSummary {
    type Output = Vec<FloorAcRow>;

    fn name() -> &'static str {
        "floor_ac_summary"
    }

    fn handle(&mut self, listing: &RoomListing) {
        let room = &listing.room;
        self.groups
            .entry((room.floor.clone(), room.ac_type))
            .or_default()
            .add_room(room);
    }

    fn finish(self) -> Self::Output {
        self.groups
            .into_iter()
            .map(|((floor, ac_type), totals)| FloorAcRow {
                floor,
                ac_type,
                totals,
            })
            .collect()
    }
}

/// Totals for one floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorRow {
    pub floor: String,
    #[serde(flatten)]
    pub totals: BedTotals,
}

/// Groups rooms by floor.
#[derive(Debug, Default)]
pub struct FloorSummary {
    groups: BTreeMap<String, BedTotals>,
}

impl Projection for FloorSummary {
    type Output = Vec<FloorRow>;

    fn name() -> &'static str {
        "floor_summary"
    }

    fn handle(&mut self, listing: &RoomListing) {
        let room = &listing.room;
        self.groups
            .entry(room.floor.clone())
            .or_default()
            .add_room(room);
    }

    fn finish(self) -> Self::Output {
        self.groups
            .into_iter()
            .map(|(floor, totals)| FloorRow { floor, totals })
            .collect()
    }
}

/// Totals for one AC type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcTypeRow {
    pub ac_type: AcType,
    #[serde(flatten)]
    pub totals: BedTotals,
}

/// Groups rooms by AC type.
#[derive(Debug, Default)]
pub struct AcTypeSummary {
    groups: BTreeMap<AcType, BedTotals>,
}

impl Projection for AcTypeSummary {
    type Output = Vec<AcTypeRow>;

    fn name() -> &'static str {
        "ac_type_summary"
    }

    fn handle(&mut self, listing: &RoomListing) {
        let room = &listing.room;
        self.groups.entry(room.ac_type).or_default().add_room(room);
    }

    fn finish(self) -> Self::Output {
        self.groups
            .into_iter()
            .map(|(ac_type, totals)| AcTypeRow { ac_type, totals })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use common::RoomId;
    use schema_store::Room;

    use super::*;

    fn listing(floor: &str, number: &str, ac_type: AcType, total: u32, occupied: u32) -> RoomListing {
        RoomListing {
            room: Room {
                id: RoomId::new(),
                floor: floor.to_string(),
                room_number: number.to_string(),
                ac_type,
                total_beds: total,
                occupied_beds: occupied,
            },
            beds: Vec::new(),
        }
    }

    fn fold<P: Projection>(listings: &[RoomListing]) -> P::Output {
        let mut projection = P::default();
        for listing in listings {
            projection.handle(listing);
        }
        projection.finish()
    }

    fn sample() -> Vec<RoomListing> {
        vec![
            listing("2ND FLOOR", "201", AcType::Ac, 2, 1),
            listing("1ST FLOOR", "102", AcType::NonAc, 7, 0),
            listing("1ST FLOOR", "101", AcType::Ac, 2, 2),
            listing("1ST FLOOR", "103", AcType::Ac, 2, 0),
        ]
    }

    #[test]
    fn floor_ac_groups_and_orders() {
        let rows = fold::<FloorAcSummary>(&sample());
        let keys: Vec<_> = rows.iter().map(|r| (r.floor.as_str(), r.ac_type)).collect();
        assert_eq!(
            keys,
            vec![
                ("1ST FLOOR", AcType::Ac),
                ("1ST FLOOR", AcType::NonAc),
                ("2ND FLOOR", AcType::Ac),
            ]
        );

        let first = &rows[0].totals;
        assert_eq!(first.room_count, 2);
        assert_eq!(first.occupied_beds, 2);
        assert_eq!(first.vacant_beds, 2);
    }

    #[test]
    fn floor_and_ac_type_groups() {
        let floors = fold::<FloorSummary>(&sample());
        assert_eq!(floors.len(), 2);
        assert_eq!(floors[0].totals.total_beds, 11);

        let types = fold::<AcTypeSummary>(&sample());
        assert_eq!(types[0].ac_type, AcType::Ac);
        assert_eq!(types[0].totals.room_count, 3);
        assert_eq!(types[1].totals.vacant_beds, 7);
    }

    #[test]
    fn empty_listing_yields_no_rows() {
        assert!(fold::<FloorAcSummary>(&[]).is_empty());
        assert!(fold::<FloorSummary>(&[]).is_empty());
    }
}
