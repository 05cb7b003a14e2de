//! SQLite-backed versioned cache store for response records.
//!
//! This module provides a persistent key-value store keyed by request
//! identity (method + URL) within named, versioned stores, with async
//! access via tokio-rusqlite. It supports:
//!
//! - Named stores (`precache-<version>`, `runtime-<version>`)
//! - Full-replacement writes (UPSERT; entries are never patched in place)
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Whole-store purge for version cleanup

pub mod connection;
pub mod entries;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::StoredResponse;

/// Prefix of the store populated with shell assets at install time.
pub const PRECACHE_PREFIX: &str = "precache-";

/// Prefix of the store populated opportunistically at request time.
pub const RUNTIME_PREFIX: &str = "runtime-";

/// The pair of store names that are live for a given version. Every other
/// store name is stale and gets purged during activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNames {
    pub precache: String,
    pub runtime: String,
}

impl StoreNames {
    /// Store names for a version identifier.
    pub fn for_version(version: &str) -> Self {
        Self {
            precache: format!("{PRECACHE_PREFIX}{version}"),
            runtime: format!("{RUNTIME_PREFIX}{version}"),
        }
    }

    /// Whether `name` is one of the two live stores.
    pub fn contains(&self, name: &str) -> bool {
        name == self.precache || name == self.runtime
    }
}
