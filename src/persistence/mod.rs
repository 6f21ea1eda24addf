//! Sidebar state persistence and database migrations.
//!
//! The sidebar keeps a handful of JSON records (credential, pins, tracked
//! repositories, last-viewed times) in a key-value [`RecordStore`]. The
//! production store is a local `SQLite` database whose schema is managed with
//! Diesel migrations; tests use [`MemoryRecordStore`]. [`SidebarStore`]
//! gives typed access on top of either.

mod error;
mod migrator;
mod pins;
mod record_store;
mod sidebar_store;
mod sqlite_store;

pub use error::PersistenceError;
pub use migrator::{
    CURRENT_SCHEMA_VERSION, INITIAL_SCHEMA_VERSION, SchemaVersion, migrate_database,
};
pub use pins::{LastViewed, PinIdentity, PinnedSet};
pub use record_store::{MemoryRecordStore, RecordKey, RecordStore};
pub use sidebar_store::SidebarStore;
pub use sqlite_store::SqliteRecordStore;

#[cfg(test)]
pub use record_store::MockRecordStore;
