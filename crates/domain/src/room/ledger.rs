//! Allotment ledger: puts guests into beds and takes them out again.

use chrono::Utc;
use common::{AllotmentId, RoomId};
use schema_store::{Allotment, NewAllotment, SchemaStore, StoreError};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

use super::{AllotBed, RemoveBed, RevertLast};

/// The guest holding a bed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub guest_name: String,
    pub allotment_id: AllotmentId,
}

/// One bed of a room, free or occupied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedSlot {
    pub bed_number: u32,
    pub occupant: Option<Occupant>,
}

impl BedSlot {
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Service for allotting and freeing beds.
///
/// The ledger is the only writer of a room's occupancy counter. Each
/// operation changes one allotment row and the counter in a single store
/// call, so the two never drift apart.
#[derive(Debug, Clone)]
pub struct AllotmentLedger<S: SchemaStore> {
    store: S,
}

impl<S: SchemaStore> AllotmentLedger<S> {
    /// Creates a new ledger over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places a guest in the lowest free bed of the room.
    ///
    /// Freed bed numbers are reused before higher ones. Fails with
    /// `CapacityExceeded` if the room is full when the write commits.
    #[tracing::instrument(skip(self))]
    pub async fn allot(&self, cmd: AllotBed) -> Result<Allotment> {
        let guest_name = cmd.validate().inspect_err(|_| rejected("validation"))?;

        let allotment = self
            .store
            .insert_allotment(NewAllotment::new(
                cmd.room_id,
                guest_name.into_inner(),
                Utc::now(),
            ))
            .await
            .map_err(|err| reject(err, cmd.room_id))?;

        metrics::counter!("allotments_created_total").increment(1);
        tracing::info!(
            room_id = %allotment.room_id,
            allotment_id = %allotment.id,
            bed_number = allotment.bed_number,
            "bed allotted"
        );
        Ok(allotment)
    }

    /// Undoes the room's most recent allotment.
    ///
    /// Of several allotments created at the same instant the one inserted
    /// last is removed. Fails with `NothingToRevert` on an empty room.
    #[tracing::instrument(skip(self))]
    pub async fn revert_last(&self, cmd: RevertLast) -> Result<Allotment> {
        let allotment = self
            .store
            .delete_latest_allotment(cmd.room_id)
            .await
            .map_err(|err| reject(err, cmd.room_id))?;

        metrics::counter!("allotments_reverted_total").increment(1);
        tracing::info!(
            room_id = %allotment.room_id,
            allotment_id = %allotment.id,
            bed_number = allotment.bed_number,
            "allotment reverted"
        );
        Ok(allotment)
    }

    /// Frees a specific bed. The allotment must belong to the given room.
    #[tracing::instrument(skip(self))]
    pub async fn remove_bed(&self, cmd: RemoveBed) -> Result<Allotment> {
        let allotment = self
            .store
            .delete_allotment(cmd.room_id, cmd.allotment_id)
            .await
            .map_err(|err| reject(err, cmd.room_id))?;

        metrics::counter!("allotments_removed_total").increment(1);
        tracing::info!(
            room_id = %allotment.room_id,
            allotment_id = %allotment.id,
            bed_number = allotment.bed_number,
            "bed freed"
        );
        Ok(allotment)
    }

    /// Lays out beds `1..=total_beds` with their current occupants.
    pub async fn list_beds(&self, room_id: RoomId, total_beds: u32) -> Result<Vec<BedSlot>> {
        let allotments = self.store.allotments_for_room(room_id).await?;
        Ok(bed_slots(&allotments, total_beds))
    }

    /// Lays out every bed of a room, looking up its capacity first.
    pub async fn room_beds(&self, room_id: RoomId) -> Result<Vec<BedSlot>> {
        let room = self
            .store
            .get_room(room_id)
            .await?
            .ok_or(StoreError::RoomNotFound(room_id))?;
        self.list_beds(room_id, room.total_beds).await
    }
}

/// Joins bed numbers `1..=total_beds` against live allotments.
pub fn bed_slots(allotments: &[Allotment], total_beds: u32) -> Vec<BedSlot> {
    (1..=total_beds)
        .map(|bed_number| BedSlot {
            bed_number,
            occupant: allotments
                .iter()
                .find(|a| a.bed_number == bed_number)
                .map(|a| Occupant {
                    guest_name: a.guest_name.clone(),
                    allotment_id: a.id,
                }),
        })
        .collect()
}

fn rejected(reason: &'static str) {
    metrics::counter!("allotments_rejected_total", "reason" => reason).increment(1);
}

fn reject(err: StoreError, room_id: RoomId) -> DomainError {
    let err = DomainError::from(err);
    let kind = err.kind();
    rejected(kind.as_str());
    tracing::warn!(%room_id, reason = %kind, error = %err, "allotment change rejected");
    err
}
