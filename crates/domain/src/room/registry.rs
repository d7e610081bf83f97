//! Room lifecycle: create, edit, delete and look up rooms.

use common::RoomId;
use schema_store::{
    Room, RoomDeletion, RoomListing, RoomQuery, RoomStream, SchemaStore, SchemaStoreExt,
    StoreError,
};

use crate::error::DomainError;

use super::{CreateRoom, UpdateRoom};

/// Service for managing rooms.
///
/// Every write is validated here and then handed to the store as a single
/// atomic operation. The registry holds no state of its own.
#[derive(Debug, Clone)]
pub struct RoomRegistry<S: SchemaStore> {
    store: S,
}

impl<S: SchemaStore> RoomRegistry<S> {
    /// Creates a new room registry over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers a room with zero occupancy.
    #[tracing::instrument(skip(self))]
    pub async fn create_room(&self, cmd: CreateRoom) -> Result<Room, DomainError> {
        let new_room = cmd.validate()?;
        let room = self.store.insert_room(new_room).await?;

        metrics::counter!("rooms_created_total").increment(1);
        tracing::info!(
            room_id = %room.id,
            floor = %room.floor,
            room_number = %room.room_number,
            "room created"
        );
        Ok(room)
    }

    /// Overwrites a room's fields.
    ///
    /// The new identity must not collide with another room, the supplied
    /// occupied count must match the live allotments and the new capacity
    /// must still cover every occupied bed.
    #[tracing::instrument(skip(self))]
    pub async fn update_room(&self, cmd: UpdateRoom) -> Result<Room, DomainError> {
        let update = cmd.validate()?;
        let room = self.store.update_room(cmd.room_id, update).await?;

        tracing::info!(room_id = %room.id, total_beds = room.total_beds, "room updated");
        Ok(room)
    }

    /// Deletes a room and every allotment in it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_room(&self, room_id: RoomId) -> Result<RoomDeletion, DomainError> {
        let deletion = self.store.delete_room(room_id).await?;

        metrics::counter!("rooms_deleted_total").increment(1);
        tracing::info!(
            %room_id,
            removed_allotments = deletion.removed_allotments,
            "room deleted"
        );
        Ok(deletion)
    }

    /// Fetches a room, failing with `NotFound` if it does not exist.
    pub async fn get_room(&self, room_id: RoomId) -> Result<Room, DomainError> {
        self.store
            .get_room(room_id)
            .await?
            .ok_or_else(|| StoreError::RoomNotFound(room_id).into())
    }

    /// Streams rooms matching the query, each with its occupied beds.
    pub async fn list_rooms(&self, query: RoomQuery) -> Result<RoomStream, DomainError> {
        Ok(self.store.list_rooms(query).await?)
    }

    /// Collects the rooms matching the query.
    pub async fn collect_rooms(&self, query: RoomQuery) -> Result<Vec<RoomListing>, DomainError> {
        Ok(self.store.collect_rooms(query).await?)
    }
}
