//! # Persistent Storage
//!
//! Disk-backed implementations of [`crate::store::RosterStore`].

mod redb_store;

pub use redb_store::RedbStore;
