//! Default room layout loaded into an empty store.

use common::AcType;
use schema_store::{NewRoom, SchemaStore, StoreError};

use crate::error::Result;

use super::RoomRegistry;

/// Floor, room number, AC type and bed count of the initial building layout.
pub const DEFAULT_ROOMS: &[(&str, &str, AcType, u32)] = &[
    ("GROUND FLOOR", "0.01", AcType::NonAc, 9),
    ("GROUND FLOOR", "0.02", AcType::NonAc, 4),
    ("GROUND FLOOR", "0.03", AcType::NonAc, 1),
    ("GROUND FLOOR", "0.04", AcType::NonAc, 7),
    ("GROUND FLOOR", "0.05", AcType::NonAc, 3),
    ("1ST FLOOR", "101", AcType::Ac, 2),
    ("1ST FLOOR", "102", AcType::NonAc, 7),
    ("1ST FLOOR", "103", AcType::Ac, 2),
    ("1ST FLOOR", "104", AcType::Ac, 3),
    ("1ST FLOOR", "105", AcType::Ac, 1),
    ("2ND FLOOR", "201", AcType::Ac, 2),
    ("2ND FLOOR", "202", AcType::NonAc, 8),
    ("2ND FLOOR", "203", AcType::NonAc, 4),
    ("2ND FLOOR", "204", AcType::Ac, 3),
    ("2ND FLOOR", "205", AcType::Ac, 3),
    ("3RD FLOOR", "301", AcType::Ac, 2),
    ("3RD FLOOR", "302", AcType::NonAc, 8),
    ("3RD FLOOR", "303", AcType::NonAc, 4),
    ("3RD FLOOR", "304", AcType::Ac, 3),
    ("3RD FLOOR", "305", AcType::Ac, 3),
    ("3RD FLOOR", "306", AcType::NonAc, 2),
    ("3RD FLOOR", "307", AcType::NonAc, 3),
    ("4TH FLOOR", "401", AcType::NonAc, 4),
    ("4TH FLOOR", "402", AcType::NonAc, 9),
    ("4TH FLOOR", "403", AcType::NonAc, 10),
];

impl<S: SchemaStore> RoomRegistry<S> {
    /// Inserts [`DEFAULT_ROOMS`] if the store holds no rooms yet.
    ///
    /// Returns the number of rooms inserted. Rooms created concurrently by
    /// another caller are skipped rather than reported as duplicates.
    #[tracing::instrument(skip(self))]
    pub async fn seed_default_rooms(&self) -> Result<usize> {
        if self.store().count_rooms().await? > 0 {
            tracing::debug!("store already has rooms, skipping seed");
            return Ok(0);
        }

        let mut inserted = 0;
        for &(floor, room_number, ac_type, total_beds) in DEFAULT_ROOMS {
            match self
                .store()
                .insert_room(NewRoom::new(floor, room_number, ac_type, total_beds))
                .await
            {
                Ok(_) => inserted += 1,
                Err(StoreError::DuplicateRoom { .. }) => {}
                Err(err) => return Err(err.into()),
            }
        }

        tracing::info!(inserted, "seeded default rooms");
        Ok(inserted)
    }
}
