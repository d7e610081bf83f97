//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container and truncate the tables
//! before each test, so they run serially. Run with:
//!
//! ```bash
//! cargo test -p schema-store --test postgres_integration
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use futures_util::StreamExt;
use schema_store::{
    AcType, NewAllotment, NewCredential, NewRoom, PostgresSchemaStore, RoomQuery, RoomUpdate,
    SchemaStore, SchemaStoreExt, StoreError,
};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresSchemaStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresSchemaStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(8)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE allotments, rooms, credentials")
        .execute(&pool)
        .await
        .unwrap();

    PostgresSchemaStore::with_lock_timeout(pool, Duration::from_secs(2))
}

async fn live_allotments(store: &PostgresSchemaStore, room_id: schema_store::RoomId) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM allotments WHERE room_id = $1")
        .bind(room_id.as_uuid())
        .fetch_one(store.pool())
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
async fn insert_and_fetch_room() {
    let store = get_test_store().await;

    let room = store
        .insert_room(NewRoom::new("1ST FLOOR", "101", AcType::Ac, 2))
        .await
        .unwrap();

    let fetched = store.get_room(room.id).await.unwrap().unwrap();
    assert_eq!(fetched, room);
    assert_eq!(fetched.occupied_beds, 0);
    assert_eq!(store.count_rooms().await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn duplicate_room_leaves_single_row() {
    let store = get_test_store().await;
    let new_room = NewRoom::new("1ST FLOOR", "101", AcType::Ac, 2);

    store.insert_room(new_room.clone()).await.unwrap();
    let result = store.insert_room(new_room).await;

    assert!(matches!(result, Err(StoreError::DuplicateRoom { .. })));
    assert_eq!(store.count_rooms().await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn concurrent_duplicate_inserts_admit_one() {
    let store = get_test_store().await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .insert_room(NewRoom::new("2ND FLOOR", "201", AcType::NonAc, 4))
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(StoreError::DuplicateRoom { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(store.count_rooms().await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn allot_fills_lowest_beds_and_stops_at_capacity() {
    let store = get_test_store().await;
    let room = store
        .insert_room(NewRoom::new("1ST FLOOR", "104", AcType::Ac, 3))
        .await
        .unwrap();

    for expected in 1..=3 {
        let allotment = store
            .insert_allotment(NewAllotment::new(room.id, "guest", Utc::now()))
            .await
            .unwrap();
        assert_eq!(allotment.bed_number, expected);
    }

    let result = store
        .insert_allotment(NewAllotment::new(room.id, "late", Utc::now()))
        .await;
    assert!(matches!(result, Err(StoreError::CapacityExceeded { .. })));

    let room = store.get_room(room.id).await.unwrap().unwrap();
    assert_eq!(room.occupied_beds, 3);
    assert_eq!(live_allotments(&store, room.id).await, 3);
}

#[tokio::test]
#[serial]
async fn concurrent_allotments_never_overfill() {
    let store = get_test_store().await;
    let room = store
        .insert_room(NewRoom::new("4TH FLOOR", "403", AcType::NonAc, 5))
        .await
        .unwrap();

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .insert_allotment(NewAllotment::new(room.id, format!("guest-{i}"), Utc::now()))
                    .await
            })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(StoreError::CapacityExceeded { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(admitted, 5);
    let room = store.get_room(room.id).await.unwrap().unwrap();
    assert_eq!(room.occupied_beds, 5);
    assert_eq!(live_allotments(&store, room.id).await, 5);

    let mut beds: Vec<u32> = store
        .allotments_for_room(room.id)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.bed_number)
        .collect();
    beds.sort_unstable();
    assert_eq!(beds, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
#[serial]
async fn held_room_lock_surfaces_busy() {
    let store = get_test_store().await;
    let room = store
        .insert_room(NewRoom::new("1ST FLOOR", "105", AcType::Ac, 3))
        .await
        .unwrap();
    store
        .insert_allotment(NewAllotment::new(room.id, "seated", Utc::now()))
        .await
        .unwrap();

    let mut holder = store.pool().begin().await.unwrap();
    sqlx::query("SELECT id FROM rooms WHERE id = $1 FOR UPDATE")
        .bind(room.id.as_uuid())
        .execute(&mut *holder)
        .await
        .unwrap();

    let impatient =
        PostgresSchemaStore::with_lock_timeout(store.pool().clone(), Duration::from_millis(100));
    let result = impatient
        .insert_allotment(NewAllotment::new(room.id, "blocked", Utc::now()))
        .await;
    holder.rollback().await.unwrap();

    assert!(matches!(
        result,
        Err(StoreError::Busy {
            operation: "insert_allotment",
            ..
        })
    ));
    let room = store.get_room(room.id).await.unwrap().unwrap();
    assert_eq!(room.occupied_beds, 1);
    assert_eq!(live_allotments(&store, room.id).await, 1);
}

#[tokio::test]
#[serial]
async fn removed_bed_number_is_reused() {
    let store = get_test_store().await;
    let room = store
        .insert_room(NewRoom::new("3RD FLOOR", "302", AcType::NonAc, 8))
        .await
        .unwrap();

    let first = store
        .insert_allotment(NewAllotment::new(room.id, "A", Utc::now()))
        .await
        .unwrap();
    store
        .insert_allotment(NewAllotment::new(room.id, "B", Utc::now()))
        .await
        .unwrap();
    store.delete_allotment(room.id, first.id).await.unwrap();

    let again = store
        .insert_allotment(NewAllotment::new(room.id, "C", Utc::now()))
        .await
        .unwrap();
    assert_eq!(again.bed_number, 1);
}

#[tokio::test]
#[serial]
async fn revert_removes_newest_and_breaks_ties_by_sequence() {
    let store = get_test_store().await;
    let room = store
        .insert_room(NewRoom::new("2ND FLOOR", "202", AcType::NonAc, 8))
        .await
        .unwrap();
    let at = Utc::now();

    store
        .insert_allotment(NewAllotment::new(room.id, "old", at - ChronoDuration::minutes(1)))
        .await
        .unwrap();
    store
        .insert_allotment(NewAllotment::new(room.id, "tie-1", at))
        .await
        .unwrap();
    store
        .insert_allotment(NewAllotment::new(room.id, "tie-2", at))
        .await
        .unwrap();

    let reverted = store.delete_latest_allotment(room.id).await.unwrap();
    assert_eq!(reverted.guest_name, "tie-2");
    let reverted = store.delete_latest_allotment(room.id).await.unwrap();
    assert_eq!(reverted.guest_name, "tie-1");

    let room = store.get_room(room.id).await.unwrap().unwrap();
    assert_eq!(room.occupied_beds, 1);
}

#[tokio::test]
#[serial]
async fn revert_on_empty_room_is_rejected() {
    let store = get_test_store().await;
    let room = store
        .insert_room(NewRoom::new("1ST FLOOR", "105", AcType::Ac, 1))
        .await
        .unwrap();

    let result = store.delete_latest_allotment(room.id).await;
    assert!(matches!(result, Err(StoreError::NothingToRevert(_))));
}

#[tokio::test]
#[serial]
async fn delete_room_cascades_allotments() {
    let store = get_test_store().await;
    let room = store
        .insert_room(NewRoom::new("GROUND FLOOR", "0.02", AcType::NonAc, 4))
        .await
        .unwrap();
    for name in ["A", "B"] {
        store
            .insert_allotment(NewAllotment::new(room.id, name, Utc::now()))
            .await
            .unwrap();
    }

    let deletion = store.delete_room(room.id).await.unwrap();
    assert_eq!(deletion.removed_allotments, 2);
    assert_eq!(live_allotments(&store, room.id).await, 0);
    assert!(!store.room_exists(room.id).await.unwrap());
}

#[tokio::test]
#[serial]
async fn update_room_checks_counter_and_identity() {
    let store = get_test_store().await;
    let room = store
        .insert_room(NewRoom::new("1ST FLOOR", "101", AcType::Ac, 2))
        .await
        .unwrap();
    store
        .insert_room(NewRoom::new("1ST FLOOR", "102", AcType::Ac, 2))
        .await
        .unwrap();
    store
        .insert_allotment(NewAllotment::new(room.id, "A", Utc::now()))
        .await
        .unwrap();

    let update = |room_number: &str, total_beds, occupied_beds| RoomUpdate {
        floor: "1ST FLOOR".to_string(),
        room_number: room_number.to_string(),
        ac_type: AcType::Ac,
        total_beds,
        occupied_beds,
    };

    let result = store.update_room(room.id, update("101", 2, 0)).await;
    assert!(matches!(result, Err(StoreError::OccupancyMismatch { .. })));

    let result = store.update_room(room.id, update("102", 2, 1)).await;
    assert!(matches!(result, Err(StoreError::DuplicateRoom { .. })));

    let updated = store.update_room(room.id, update("101", 6, 1)).await.unwrap();
    assert_eq!(updated.total_beds, 6);
    assert_eq!(updated.occupied_beds, 1);
}

#[tokio::test]
#[serial]
async fn list_rooms_streams_in_order_with_guests() {
    let store = get_test_store().await;
    let upper = store
        .insert_room(NewRoom::new("2ND FLOOR", "201", AcType::Ac, 2))
        .await
        .unwrap();
    store
        .insert_room(NewRoom::new("1ST FLOOR", "101", AcType::Ac, 2))
        .await
        .unwrap();
    store
        .insert_allotment(NewAllotment::new(upper.id, "Asha", Utc::now()))
        .await
        .unwrap();

    let listings: Vec<_> = store
        .list_rooms(RoomQuery::new())
        .await
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
        .await;

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].room.room_number, "101");
    assert!(listings[0].beds.is_empty());
    assert_eq!(listings[1].guest_names(), vec!["Asha"]);

    let searched = store
        .collect_rooms(RoomQuery::new().search("2nd"))
        .await
        .unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].room.id, upper.id);
}

#[tokio::test]
#[serial]
async fn list_rooms_orders_labels_bytewise() {
    let store = get_test_store().await;
    for (floor, number) in [("annex", "a1"), ("GROUND FLOOR", "b2"), ("GROUND FLOOR", "B1")] {
        store
            .insert_room(NewRoom::new(floor, number, AcType::Ac, 1))
            .await
            .unwrap();
    }

    let rooms: Vec<(String, String)> = store
        .collect_rooms(RoomQuery::new())
        .await
        .unwrap()
        .into_iter()
        .map(|listing| (listing.room.floor, listing.room.room_number))
        .collect();

    assert_eq!(
        rooms,
        vec![
            ("GROUND FLOOR".to_string(), "B1".to_string()),
            ("GROUND FLOOR".to_string(), "b2".to_string()),
            ("annex".to_string(), "a1".to_string()),
        ]
    );
}

#[tokio::test]
#[serial]
async fn credential_email_is_unique() {
    let store = get_test_store().await;
    let credential = NewCredential {
        email: "warden@example.com".to_string(),
        password_hash: "$argon2id$v=19$abc".to_string(),
    };

    let stored = store.insert_credential(credential.clone()).await.unwrap();
    let found = store
        .find_credential("warden@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, stored);

    let result = store.insert_credential(credential).await;
    assert!(matches!(result, Err(StoreError::DuplicateCredential { .. })));
}
