use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{
    AcType, Allotment, AllotmentId, BedAssignment, Credential, CredentialId, NewAllotment,
    NewCredential, NewRoom, Result, Room, RoomDeletion, RoomId, RoomListing, RoomQuery,
    RoomUpdate, StoreError,
    store::{DEFAULT_LOCK_TIMEOUT, RoomStream, SchemaStore, first_free_bed},
};

const LIST_ROOMS_SELECT: &str = r#"
SELECT r.id, r.floor, r.room_number, r.ac_type, r.total_beds, r.occupied_beds,
       array_agg(a.bed_number ORDER BY a.bed_number) FILTER (WHERE a.id IS NOT NULL) AS bed_numbers,
       array_agg(a.guest_name ORDER BY a.bed_number) FILTER (WHERE a.id IS NOT NULL) AS guest_names,
       array_agg(a.id ORDER BY a.bed_number) FILTER (WHERE a.id IS NOT NULL) AS allotment_ids
FROM rooms r
LEFT JOIN allotments a ON a.room_id = r.id
WHERE 1=1"#;

const ALLOTMENT_COLUMNS: &str = "id, room_id, guest_name, bed_number, created_at, seq";

/// PostgreSQL-backed schema store implementation.
///
/// Each mutation runs in its own transaction with the target room row
/// locked `FOR UPDATE`, and a per-transaction `lock_timeout`.
#[derive(Clone)]
pub struct PostgresSchemaStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PostgresSchemaStore {
    /// Creates a new PostgreSQL schema store.
    pub fn new(pool: PgPool) -> Self {
        Self::with_lock_timeout(pool, DEFAULT_LOCK_TIMEOUT)
    }

    /// Creates a store with a custom lock wait bound.
    pub fn with_lock_timeout(pool: PgPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    async fn begin(&self, operation: &'static str) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| self.db_error(operation, e))?;

        // SET does not accept bind parameters.
        let set_timeout = format!(
            "SET LOCAL lock_timeout = {}",
            self.lock_timeout.as_millis()
        );
        sqlx::query(&set_timeout)
            .execute(&mut *tx)
            .await
            .map_err(|e| self.db_error(operation, e))?;

        Ok(tx)
    }

    fn db_error(&self, operation: &'static str, err: sqlx::Error) -> StoreError {
        classify_db_error(operation, self.lock_timeout, err)
    }

    async fn lock_room(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        operation: &'static str,
        room_id: RoomId,
    ) -> Result<Room> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, floor, room_number, ac_type, total_beds, occupied_beds
            FROM rooms
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(room_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| self.db_error(operation, e))?;

        match row {
            Some(row) => row_to_room(&row),
            None => Err(StoreError::RoomNotFound(room_id)),
        }
    }

    async fn adjust_occupancy(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        operation: &'static str,
        room_id: RoomId,
        delta: i32,
    ) -> Result<()> {
        sqlx::query("UPDATE rooms SET occupied_beds = occupied_beds + $2 WHERE id = $1")
            .bind(room_id.as_uuid())
            .bind(delta)
            .execute(&mut **tx)
            .await
            .map_err(|e| self.db_error(operation, e))?;
        Ok(())
    }
}

/// Maps contention errors onto `Busy`/`Conflict`, everything else onto `Database`.
fn classify_db_error(
    operation: &'static str,
    lock_timeout: Duration,
    err: sqlx::Error,
) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.code().as_deref() {
            Some("55P03") => {
                tracing::warn!(operation, ?lock_timeout, "Lock wait timed out");
                return StoreError::Busy {
                    operation,
                    timeout: lock_timeout,
                };
            }
            Some(code @ ("40001" | "40P01")) => {
                tracing::warn!(operation, code, "Transaction aborted by concurrent update");
                return StoreError::Conflict { operation };
            }
            _ => {}
        }
    }
    if matches!(err, sqlx::Error::PoolTimedOut) {
        tracing::warn!(operation, "Timed out waiting for a pooled connection");
        return StoreError::Busy {
            operation,
            timeout: lock_timeout,
        };
    }
    StoreError::Database(err)
}

fn to_u32(value: i32, column: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("{column} is negative: {value}")))
}

fn to_i32(value: u32, column: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| StoreError::Corrupt(format!("{column} out of range: {value}")))
}

fn parse_ac_type(raw: &str) -> Result<AcType> {
    AcType::from_str(raw).map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn row_to_room(row: &PgRow) -> Result<Room> {
    Ok(Room {
        id: RoomId::from_uuid(row.try_get::<Uuid, _>("id")?),
        floor: row.try_get("floor")?,
        room_number: row.try_get("room_number")?,
        ac_type: parse_ac_type(row.try_get("ac_type")?)?,
        total_beds: to_u32(row.try_get("total_beds")?, "total_beds")?,
        occupied_beds: to_u32(row.try_get("occupied_beds")?, "occupied_beds")?,
    })
}

fn row_to_allotment(row: &PgRow) -> Result<Allotment> {
    Ok(Allotment {
        id: AllotmentId::from_uuid(row.try_get::<Uuid, _>("id")?),
        room_id: RoomId::from_uuid(row.try_get::<Uuid, _>("room_id")?),
        guest_name: row.try_get("guest_name")?,
        bed_number: to_u32(row.try_get("bed_number")?, "bed_number")?,
        created_at: row.try_get("created_at")?,
        sequence: row.try_get("seq")?,
    })
}

fn row_to_listing(row: &PgRow) -> Result<RoomListing> {
    let room = row_to_room(row)?;
    let bed_numbers: Vec<i32> = row
        .try_get::<Option<Vec<i32>>, _>("bed_numbers")?
        .unwrap_or_default();
    let guest_names: Vec<String> = row
        .try_get::<Option<Vec<String>>, _>("guest_names")?
        .unwrap_or_default();
    let allotment_ids: Vec<Uuid> = row
        .try_get::<Option<Vec<Uuid>>, _>("allotment_ids")?
        .unwrap_or_default();

    let beds = bed_numbers
        .into_iter()
        .zip(guest_names)
        .zip(allotment_ids)
        .map(|((bed_number, guest_name), id)| {
            Ok(BedAssignment {
                bed_number: to_u32(bed_number, "bed_number")?,
                guest_name,
                allotment_id: AllotmentId::from_uuid(id),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RoomListing { room, beds })
}

fn row_to_credential(row: &PgRow) -> Result<Credential> {
    Ok(Credential {
        id: CredentialId::from_uuid(row.try_get::<Uuid, _>("id")?),
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
    })
}

#[async_trait]
impl SchemaStore for PostgresSchemaStore {
    async fn insert_room(&self, room: NewRoom) -> Result<Room> {
        const OP: &str = "insert_room";
        let mut tx = self.begin(OP).await?;

        let existing: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM rooms WHERE floor = $1 AND room_number = $2 AND ac_type = $3",
        )
        .bind(&room.floor)
        .bind(&room.room_number)
        .bind(room.ac_type.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| self.db_error(OP, e))?;

        let duplicate = || StoreError::DuplicateRoom {
            floor: room.floor.clone(),
            room_number: room.room_number.clone(),
            ac_type: room.ac_type,
        };
        if existing.is_some() {
            return Err(duplicate());
        }

        let id = RoomId::new();
        sqlx::query(
            r#"
            INSERT INTO rooms (id, floor, room_number, ac_type, total_beds, occupied_beds)
            VALUES ($1, $2, $3, $4, $5, 0)
            "#,
        )
        .bind(id.as_uuid())
        .bind(&room.floor)
        .bind(&room.room_number)
        .bind(room.ac_type.as_str())
        .bind(to_i32(room.total_beds, "total_beds")?)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            // A concurrent insert of the same identity loses on the constraint
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_room_identity")
            {
                return duplicate();
            }
            self.db_error(OP, e)
        })?;

        tx.commit().await.map_err(|e| self.db_error(OP, e))?;
        Ok(room.into_room(id))
    }

    async fn update_room(&self, room_id: RoomId, update: RoomUpdate) -> Result<Room> {
        const OP: &str = "update_room";
        let mut tx = self.begin(OP).await?;
        self.lock_room(&mut tx, OP, room_id).await?;

        let (live, highest_bed): (i64, Option<i32>) = sqlx::query_as(
            "SELECT COUNT(*), MAX(bed_number) FROM allotments WHERE room_id = $1",
        )
        .bind(room_id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| self.db_error(OP, e))?;

        let live = u32::try_from(live)
            .map_err(|_| StoreError::Corrupt(format!("allotment count out of range: {live}")))?;
        let highest_bed = to_u32(highest_bed.unwrap_or(0), "bed_number")?;

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

        let duplicate = || StoreError::DuplicateRoom {
            floor: update.floor.clone(),
            room_number: update.room_number.clone(),
            ac_type: update.ac_type,
        };

        let clash: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM rooms
            WHERE floor = $1 AND room_number = $2 AND ac_type = $3 AND id <> $4
            "#,
        )
        .bind(&update.floor)
        .bind(&update.room_number)
        .bind(update.ac_type.as_str())
        .bind(room_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| self.db_error(OP, e))?;
        if clash.is_some() {
            return Err(duplicate());
        }

        let row = sqlx::query(
            r#"
            UPDATE rooms
            SET floor = $2, room_number = $3, ac_type = $4, total_beds = $5
            WHERE id = $1
            RETURNING id, floor, room_number, ac_type, total_beds, occupied_beds
            "#,
        )
        .bind(room_id.as_uuid())
        .bind(&update.floor)
        .bind(&update.room_number)
        .bind(update.ac_type.as_str())
        .bind(to_i32(update.total_beds, "total_beds")?)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_room_identity")
            {
                return duplicate();
            }
            self.db_error(OP, e)
        })?;
        let room = row_to_room(&row)?;

        tx.commit().await.map_err(|e| self.db_error(OP, e))?;
        Ok(room)
    }

    async fn delete_room(&self, room_id: RoomId) -> Result<RoomDeletion> {
        const OP: &str = "delete_room";
        let mut tx = self.begin(OP).await?;
        let room = self.lock_room(&mut tx, OP, room_id).await?;

        let removed = sqlx::query("DELETE FROM allotments WHERE room_id = $1")
            .bind(room_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| self.db_error(OP, e))?;

        sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(room_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| self.db_error(OP, e))?;

        tx.commit().await.map_err(|e| self.db_error(OP, e))?;
        Ok(RoomDeletion {
            room,
            removed_allotments: removed.rows_affected(),
        })
    }

    async fn get_room(&self, room_id: RoomId) -> Result<Option<Room>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, floor, room_number, ac_type, total_beds, occupied_beds
            FROM rooms
            WHERE id = $1
            "#,
        )
        .bind(room_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| self.db_error("get_room", e))?;

        row.as_ref().map(row_to_room).transpose()
    }

    async fn list_rooms(&self, query: RoomQuery) -> Result<RoomStream> {
        use futures_util::{StreamExt, stream};

        let mut sql = String::from(LIST_ROOMS_SELECT);
        let mut param_count = 0;

        // Build dynamic query
        if query.floor.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND r.floor = ${param_count}"));
        }
        if query.ac_type.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND r.ac_type = ${param_count}"));
        }
        if query.search.is_some() {
            param_count += 1;
            sql.push_str(&format!(
                " AND (strpos(lower(r.floor), lower(${param_count})) > 0 \
                 OR strpos(lower(r.room_number), lower(${param_count})) > 0 \
                 OR strpos(lower(r.ac_type), lower(${param_count})) > 0)"
            ));
        }

        // Byte order, matching the in-memory store and the projections' grouping.
        sql.push_str(
            r#" GROUP BY r.id ORDER BY r.floor COLLATE "C" ASC, r.room_number COLLATE "C" ASC, r.ac_type COLLATE "C" ASC"#,
        );

        // Nothing is read until the stream is first polled.
        let pool = self.pool.clone();
        let lock_timeout = self.lock_timeout;
        let fetch = async move {
            let mut sqlx_query = sqlx::query(&sql);
            if let Some(floor) = query.floor {
                sqlx_query = sqlx_query.bind(floor);
            }
            if let Some(ac_type) = query.ac_type {
                sqlx_query = sqlx_query.bind(ac_type.as_str());
            }
            if let Some(term) = query.search {
                sqlx_query = sqlx_query.bind(term);
            }
            sqlx_query.fetch_all(&pool).await
        };

        let stream = stream::once(fetch).flat_map(move |result| {
            let listings: Vec<Result<RoomListing>> = match result {
                Ok(rows) => rows.iter().map(row_to_listing).collect(),
                Err(e) => vec![Err(classify_db_error("list_rooms", lock_timeout, e))],
            };
            stream::iter(listings)
        });

        Ok(Box::pin(stream))
    }

    async fn count_rooms(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| self.db_error("count_rooms", e))?;
        u64::try_from(count).map_err(|_| StoreError::Corrupt(format!("room count: {count}")))
    }

    async fn insert_allotment(&self, allotment: NewAllotment) -> Result<Allotment> {
        const OP: &str = "insert_allotment";
        let room_id = allotment.room_id;
        let mut tx = self.begin(OP).await?;
        let room = self.lock_room(&mut tx, OP, room_id).await?;

        if room.is_full() {
            return Err(StoreError::CapacityExceeded {
                room_id,
                total_beds: room.total_beds,
            });
        }

        let taken: Vec<i32> =
            sqlx::query_scalar("SELECT bed_number FROM allotments WHERE room_id = $1")
                .bind(room_id.as_uuid())
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| self.db_error(OP, e))?;
        let taken = taken
            .into_iter()
            .map(|bed| to_u32(bed, "bed_number"))
            .collect::<Result<Vec<_>>>()?;

        let bed_number =
            first_free_bed(taken, room.total_beds).ok_or(StoreError::CapacityExceeded {
                room_id,
                total_beds: room.total_beds,
            })?;

        let id = AllotmentId::new();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO allotments (id, room_id, guest_name, bed_number, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ALLOTMENT_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(room_id.as_uuid())
        .bind(&allotment.guest_name)
        .bind(to_i32(bed_number, "bed_number")?)
        .bind(allotment.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| self.db_error(OP, e))?;
        let record = row_to_allotment(&row)?;

        self.adjust_occupancy(&mut tx, OP, room_id, 1).await?;

        tx.commit().await.map_err(|e| self.db_error(OP, e))?;
        Ok(record)
    }

    async fn delete_latest_allotment(&self, room_id: RoomId) -> Result<Allotment> {
        const OP: &str = "delete_latest_allotment";
        let mut tx = self.begin(OP).await?;
        let room = self.lock_room(&mut tx, OP, room_id).await?;

        if room.occupied_beds == 0 {
            return Err(StoreError::NothingToRevert(room_id));
        }

        let row: Option<PgRow> = sqlx::query(&format!(
            r#"
            DELETE FROM allotments
            WHERE id = (
                SELECT id FROM allotments
                WHERE room_id = $1
                ORDER BY created_at DESC, seq DESC
                LIMIT 1
            )
            RETURNING {ALLOTMENT_COLUMNS}
            "#
        ))
        .bind(room_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| self.db_error(OP, e))?;

        let removed = match row {
            Some(row) => row_to_allotment(&row)?,
            None => return Err(StoreError::NothingToRevert(room_id)),
        };

        self.adjust_occupancy(&mut tx, OP, room_id, -1).await?;

        tx.commit().await.map_err(|e| self.db_error(OP, e))?;
        Ok(removed)
    }

    async fn delete_allotment(
        &self,
        room_id: RoomId,
        allotment_id: AllotmentId,
    ) -> Result<Allotment> {
        const OP: &str = "delete_allotment";
        let mut tx = self.begin(OP).await?;
        self.lock_room(&mut tx, OP, room_id).await?;

        let row: Option<PgRow> = sqlx::query(&format!(
            "DELETE FROM allotments WHERE id = $1 AND room_id = $2 RETURNING {ALLOTMENT_COLUMNS}"
        ))
        .bind(allotment_id.as_uuid())
        .bind(room_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| self.db_error(OP, e))?;

        let removed = match row {
            Some(row) => row_to_allotment(&row)?,
            None => {
                return Err(StoreError::AllotmentNotFound {
                    allotment_id,
                    room_id,
                });
            }
        };

        self.adjust_occupancy(&mut tx, OP, room_id, -1).await?;

        tx.commit().await.map_err(|e| self.db_error(OP, e))?;
        Ok(removed)
    }

    async fn allotments_for_room(&self, room_id: RoomId) -> Result<Vec<Allotment>> {
        let rows = sqlx::query(&format!(
            "SELECT {ALLOTMENT_COLUMNS} FROM allotments WHERE room_id = $1 ORDER BY bed_number ASC"
        ))
        .bind(room_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| self.db_error("allotments_for_room", e))?;

        rows.iter().map(row_to_allotment).collect()
    }

    async fn insert_credential(&self, credential: NewCredential) -> Result<Credential> {
        const OP: &str = "insert_credential";
        let id = CredentialId::new();

        sqlx::query("INSERT INTO credentials (id, email, password_hash) VALUES ($1, $2, $3)")
            .bind(id.as_uuid())
            .bind(&credential.email)
            .bind(&credential.password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.constraint() == Some("unique_credential_email")
                {
                    return StoreError::DuplicateCredential {
                        email: credential.email.clone(),
                    };
                }
                self.db_error(OP, e)
            })?;

        Ok(Credential {
            id,
            email: credential.email,
            password_hash: credential.password_hash,
        })
    }

    async fn find_credential(&self, email: &str) -> Result<Option<Credential>> {
        let row: Option<PgRow> =
            sqlx::query("SELECT id, email, password_hash FROM credentials WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| self.db_error("find_credential", e))?;

        row.as_ref().map(row_to_credential).transpose()
    }
}
