pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod record;
pub mod store;

pub use common::{AcType, AllotmentId, CredentialId, RoomId};
pub use error::{Result, StoreError};
pub use memory::InMemorySchemaStore;
pub use postgres::PostgresSchemaStore;
pub use query::RoomQuery;
pub use record::{
    Allotment, BedAssignment, Credential, NewAllotment, NewCredential, NewRoom, Room,
    RoomDeletion, RoomListing, RoomUpdate,
};
pub use store::{DEFAULT_LOCK_TIMEOUT, RoomStream, SchemaStore, SchemaStoreExt, first_free_bed};
