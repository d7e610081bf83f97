use criterion::{Criterion, criterion_group, criterion_main};
use domain::{AllotBed, AllotmentLedger, CreateRoom, RevertLast, RoomRegistry};
use schema_store::InMemorySchemaStore;

fn bench_fill_room(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("ledger/fill_10_bed_room", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemorySchemaStore::new();
                let registry = RoomRegistry::new(store.clone());
                let ledger = AllotmentLedger::new(store);
                let room = registry
                    .create_room(CreateRoom::new("4TH FLOOR", "403", "NON AC", 10))
                    .await
                    .unwrap();
                for i in 0..10 {
                    ledger
                        .allot(AllotBed::new(room.id, format!("Guest {i}")))
                        .await
                        .unwrap();
                }
            });
        });
    });
}

fn bench_allot_revert(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemorySchemaStore::new();
    let registry = RoomRegistry::new(store.clone());
    let ledger = AllotmentLedger::new(store);
    let room = rt
        .block_on(registry.create_room(CreateRoom::new("1ST FLOOR", "101", "AC", 2)))
        .unwrap();

    c.bench_function("ledger/allot_then_revert", |b| {
        b.iter(|| {
            rt.block_on(async {
                ledger
                    .allot(AllotBed::new(room.id, "Bench Guest"))
                    .await
                    .unwrap();
                ledger.revert_last(RevertLast::new(room.id)).await.unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_fill_room, bench_allot_revert);
criterion_main!(benches);
