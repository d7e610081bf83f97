use std::collections::BTreeSet;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_core::Stream;
use futures_util::TryStreamExt;

use crate::{
    Allotment, AllotmentId, Credential, NewAllotment, NewCredential, NewRoom, Result, Room,
    RoomDeletion, RoomId, RoomListing, RoomQuery, RoomUpdate,
};

/// Lock wait applied when a store is built without an explicit timeout.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// A stream of room listings.
pub type RoomStream = Pin<Box<dyn Stream<Item = Result<RoomListing>> + Send>>;

/// Persistent home of rooms, allotments and credentials.
///
/// Every mutating method is atomic: its existence checks, row changes and
/// occupancy counter change either all commit or none do. Waiting for a
/// lock is bounded and surfaces as [`StoreError::Busy`](crate::StoreError::Busy).
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Inserts a room with zero occupancy.
    ///
    /// Fails with `DuplicateRoom` if the (floor, room number, AC type)
    /// triple is taken.
    async fn insert_room(&self, room: NewRoom) -> Result<Room>;

    /// Replaces a room's editable fields.
    ///
    /// The identity triple must stay unique among other rooms,
    /// `update.occupied_beds` must equal the live allotment count and
    /// `update.total_beds` must cover every occupied bed number.
    async fn update_room(&self, room_id: RoomId, update: RoomUpdate) -> Result<Room>;

    /// Deletes a room together with all of its allotments.
    async fn delete_room(&self, room_id: RoomId) -> Result<RoomDeletion>;

    /// Fetches a single room.
    async fn get_room(&self, room_id: RoomId) -> Result<Option<Room>>;

    /// Streams rooms matching `query`, each with its occupied beds.
    ///
    /// Rooms are ordered by floor, room number, then AC type. Each call
    /// starts a fresh read.
    async fn list_rooms(&self, query: RoomQuery) -> Result<RoomStream>;

    /// Counts all rooms.
    async fn count_rooms(&self) -> Result<u64>;

    /// Assigns the lowest free bed number to a guest and bumps the
    /// room's occupancy counter.
    ///
    /// Fails with `CapacityExceeded` if the room is full at commit time.
    async fn insert_allotment(&self, allotment: NewAllotment) -> Result<Allotment>;

    /// Removes the room's most recent allotment (latest `created_at`,
    /// then highest sequence) and decrements the counter.
    async fn delete_latest_allotment(&self, room_id: RoomId) -> Result<Allotment>;

    /// Removes one allotment, which must belong to `room_id`, and
    /// decrements the counter.
    async fn delete_allotment(&self, room_id: RoomId, allotment_id: AllotmentId)
    -> Result<Allotment>;

    /// Returns the room's live allotments ordered by bed number.
    async fn allotments_for_room(&self, room_id: RoomId) -> Result<Vec<Allotment>>;

    /// Inserts a credential. Fails with `DuplicateCredential` if the email is taken.
    async fn insert_credential(&self, credential: NewCredential) -> Result<Credential>;

    /// Looks up a credential by exact email.
    async fn find_credential(&self, email: &str) -> Result<Option<Credential>>;
}

/// Extension trait providing convenience methods for schema stores.
#[async_trait]
pub trait SchemaStoreExt: SchemaStore {
    /// Checks if a room exists.
    async fn room_exists(&self, room_id: RoomId) -> Result<bool> {
        Ok(self.get_room(room_id).await?.is_some())
    }

    /// Checks if a credential exists for the email.
    async fn credential_exists(&self, email: &str) -> Result<bool> {
        Ok(self.find_credential(email).await?.is_some())
    }

    /// Drains a room listing into memory.
    async fn collect_rooms(&self, query: RoomQuery) -> Result<Vec<RoomListing>> {
        self.list_rooms(query).await?.try_collect().await
    }
}

// Blanket implementation for all SchemaStore implementations
impl<T: SchemaStore + ?Sized> SchemaStoreExt for T {}

/// Returns the smallest bed number in `1..=total_beds` not present in `taken`.
///
/// Freed numbers are reused before higher ones are handed out. Returns
/// `None` when every bed is taken.
pub fn first_free_bed<I>(taken: I, total_beds: u32) -> Option<u32>
where
    I: IntoIterator<Item = u32>,
{
    let taken: BTreeSet<u32> = taken.into_iter().collect();
    (1..=total_beds).find(|bed| !taken.contains(bed))
}
