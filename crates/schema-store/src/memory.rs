use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    Allotment, AllotmentId, BedAssignment, Credential, CredentialId, NewAllotment, NewCredential,
    NewRoom, Result, Room, RoomDeletion, RoomId, RoomListing, RoomQuery, RoomUpdate, StoreError,
    store::{DEFAULT_LOCK_TIMEOUT, RoomStream, SchemaStore, first_free_bed},
};

#[derive(Default)]
struct Tables {
    rooms: HashMap<RoomId, Room>,
    allotments: HashMap<AllotmentId, Allotment>,
    credentials: HashMap<String, Credential>,
    next_sequence: i64,
}

impl Tables {
    fn room_allotments(&self, room_id: RoomId) -> impl Iterator<Item = &Allotment> {
        self.allotments.values().filter(move |a| a.room_id == room_id)
    }

    fn identity_taken(&self, room: &NewRoom, except: Option<RoomId>) -> bool {
        self.rooms.values().any(|r| {
            Some(r.id) != except
                && r.floor == room.floor
                && r.room_number == room.room_number
                && r.ac_type == room.ac_type
        })
    }

    fn room_mut(&mut self, room_id: RoomId) -> Result<&mut Room> {
        self.rooms
            .get_mut(&room_id)
            .ok_or(StoreError::RoomNotFound(room_id))
    }

    fn listing(&self, room: &Room) -> RoomListing {
        let mut beds: Vec<BedAssignment> = self
            .room_allotments(room.id)
            .map(|a| BedAssignment {
                bed_number: a.bed_number,
                guest_name: a.guest_name.clone(),
                allotment_id: a.id,
            })
            .collect();
        beds.sort_by_key(|b| b.bed_number);
        RoomListing {
            room: room.clone(),
            beds,
        }
    }
}

/// In-memory schema store.
///
/// All tables sit behind a single lock, so every mutation is applied under
/// one write guard and is atomic with respect to readers and other writers.
/// Lock acquisition is bounded by the configured timeout.
#[derive(Clone)]
pub struct InMemorySchemaStore {
    tables: Arc<RwLock<Tables>>,
    lock_timeout: Duration,
}

impl Default for InMemorySchemaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySchemaStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::with_lock_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    /// Creates a new empty store with a custom lock wait bound.
    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            lock_timeout,
        }
    }

    /// Returns the total number of live allotments across all rooms.
    pub async fn allotment_count(&self) -> usize {
        self.tables.read().await.allotments.len()
    }

    /// Clears all tables.
    pub async fn clear(&self) {
        *self.tables.write().await = Tables::default();
    }

    async fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Tables>> {
        tokio::time::timeout(self.lock_timeout, self.tables.read())
            .await
            .map_err(|_| {
                tracing::warn!(operation, lock_timeout = ?self.lock_timeout, "Lock wait timed out");
                StoreError::Busy {
                    operation,
                    timeout: self.lock_timeout,
                }
            })
    }

    async fn write(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, Tables>> {
        tokio::time::timeout(self.lock_timeout, self.tables.write())
            .await
            .map_err(|_| {
                tracing::warn!(operation, lock_timeout = ?self.lock_timeout, "Lock wait timed out");
                StoreError::Busy {
                    operation,
                    timeout: self.lock_timeout,
                }
            })
    }
}

#[async_trait]
impl SchemaStore for InMemorySchemaStore {
    async fn insert_room(&self, room: NewRoom) -> Result<Room> {
        let mut tables = self.write("insert_room").await?;

        if tables.identity_taken(&room, None) {
            return Err(StoreError::DuplicateRoom {
                floor: room.floor,
                room_number: room.room_number,
                ac_type: room.ac_type,
            });
        }

        let room = room.into_room(RoomId::new());
        tables.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    async fn update_room(&self, room_id: RoomId, update: RoomUpdate) -> Result<Room> {
        let mut tables = self.write("update_room").await?;

        if !tables.rooms.contains_key(&room_id) {
            return Err(StoreError::RoomNotFound(room_id));
        }

        let (live, highest_bed) = tables
            .room_allotments(room_id)
            .fold((0u32, 0u32), |(count, max), a| {
                (count + 1, max.max(a.bed_number))
            });

        if update.occupied_beds != live {
            return Err(StoreError::OccupancyMismatch {
                room_id,
                requested: update.occupied_beds,
                live,
            });
        }
        if update.total_beds < highest_bed {
            return Err(StoreError::CapacityBelowOccupiedBed {
                room_id,
                requested: update.total_beds,
                highest_bed,
            });
        }

        let identity = NewRoom::new(
            update.floor.clone(),
            update.room_number.clone(),
            update.ac_type,
            update.total_beds,
        );
        if tables.identity_taken(&identity, Some(room_id)) {
            return Err(StoreError::DuplicateRoom {
                floor: update.floor,
                room_number: update.room_number,
                ac_type: update.ac_type,
            });
        }

        let room = tables.room_mut(room_id)?;
        room.floor = update.floor;
        room.room_number = update.room_number;
        room.ac_type = update.ac_type;
        room.total_beds = update.total_beds;
        Ok(room.clone())
    }

    async fn delete_room(&self, room_id: RoomId) -> Result<RoomDeletion> {
        let mut tables = self.write("delete_room").await?;

        let room = tables
            .rooms
            .remove(&room_id)
            .ok_or(StoreError::RoomNotFound(room_id))?;

        let before = tables.allotments.len();
        tables.allotments.retain(|_, a| a.room_id != room_id);
        let removed_allotments = (before - tables.allotments.len()) as u64;

        Ok(RoomDeletion {
            room,
            removed_allotments,
        })
    }

    async fn get_room(&self, room_id: RoomId) -> Result<Option<Room>> {
        let tables = self.read("get_room").await?;
        Ok(tables.rooms.get(&room_id).cloned())
    }

    async fn list_rooms(&self, query: RoomQuery) -> Result<RoomStream> {
        use futures_util::stream;

        let tables = self.read("list_rooms").await?;
        let mut rooms: Vec<&Room> = tables.rooms.values().filter(|r| query.matches(r)).collect();
        rooms.sort_by(|a, b| {
            a.floor
                .cmp(&b.floor)
                .then_with(|| a.room_number.cmp(&b.room_number))
                .then_with(|| a.ac_type.as_str().cmp(b.ac_type.as_str()))
        });
        let listings: Vec<RoomListing> = rooms.into_iter().map(|r| tables.listing(r)).collect();

        let stream = stream::iter(listings.into_iter().map(Ok));
        Ok(Box::pin(stream))
    }

    async fn count_rooms(&self) -> Result<u64> {
        let tables = self.read("count_rooms").await?;
        Ok(tables.rooms.len() as u64)
    }

    async fn insert_allotment(&self, allotment: NewAllotment) -> Result<Allotment> {
        let mut tables = self.write("insert_allotment").await?;
        let room_id = allotment.room_id;

        let room = tables
            .rooms
            .get(&room_id)
            .ok_or(StoreError::RoomNotFound(room_id))?;
        let total_beds = room.total_beds;
        if room.is_full() {
            return Err(StoreError::CapacityExceeded {
                room_id,
                total_beds,
            });
        }

        let taken = tables.room_allotments(room_id).map(|a| a.bed_number);
        let bed_number = first_free_bed(taken, total_beds).ok_or(StoreError::CapacityExceeded {
            room_id,
            total_beds,
        })?;

        tables.next_sequence += 1;
        let record = Allotment {
            id: AllotmentId::new(),
            room_id,
            guest_name: allotment.guest_name,
            bed_number,
            created_at: allotment.created_at,
            sequence: tables.next_sequence,
        };
        tables.allotments.insert(record.id, record.clone());
        tables.room_mut(room_id)?.occupied_beds += 1;

        Ok(record)
    }

    async fn delete_latest_allotment(&self, room_id: RoomId) -> Result<Allotment> {
        let mut tables = self.write("delete_latest_allotment").await?;

        let room = tables.room_mut(room_id)?;
        if room.occupied_beds == 0 {
            return Err(StoreError::NothingToRevert(room_id));
        }

        let latest = tables
            .room_allotments(room_id)
            .max_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then(a.sequence.cmp(&b.sequence))
            })
            .map(|a| a.id)
            .ok_or(StoreError::NothingToRevert(room_id))?;

        let removed = tables
            .allotments
            .remove(&latest)
            .ok_or(StoreError::NothingToRevert(room_id))?;
        tables.room_mut(room_id)?.occupied_beds -= 1;

        Ok(removed)
    }

    async fn delete_allotment(
        &self,
        room_id: RoomId,
        allotment_id: AllotmentId,
    ) -> Result<Allotment> {
        let mut tables = self.write("delete_allotment").await?;

        tables.room_mut(room_id)?;
        let belongs = tables
            .allotments
            .get(&allotment_id)
            .is_some_and(|a| a.room_id == room_id);
        if !belongs {
            return Err(StoreError::AllotmentNotFound {
                allotment_id,
                room_id,
            });
        }

        let removed = tables
            .allotments
            .remove(&allotment_id)
            .ok_or(StoreError::AllotmentNotFound {
                allotment_id,
                room_id,
            })?;
        let room = tables.room_mut(room_id)?;
        room.occupied_beds = room.occupied_beds.saturating_sub(1);

        Ok(removed)
    }

    async fn allotments_for_room(&self, room_id: RoomId) -> Result<Vec<Allotment>> {
        let tables = self.read("allotments_for_room").await?;
        let mut allotments: Vec<_> = tables.room_allotments(room_id).cloned().collect();
        allotments.sort_by_key(|a| a.bed_number);
        Ok(allotments)
    }

    async fn insert_credential(&self, credential: NewCredential) -> Result<Credential> {
        let mut tables = self.write("insert_credential").await?;

        if tables.credentials.contains_key(&credential.email) {
            return Err(StoreError::DuplicateCredential {
                email: credential.email,
            });
        }

        let record = Credential {
            id: CredentialId::new(),
            email: credential.email,
            password_hash: credential.password_hash,
        };
        tables
            .credentials
            .insert(record.email.clone(), record.clone());
        Ok(record)
    }

    async fn find_credential(&self, email: &str) -> Result<Option<Credential>> {
        let tables = self.read("find_credential").await?;
        Ok(tables.credentials.get(email).cloned())
    }
}
