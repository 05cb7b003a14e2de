//! Core types and shared functionality for waylay.
//!
//! This crate provides:
//! - Versioned cache store with SQLite backend
//! - Routing rules and the pure strategy classifier
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod routes;
pub mod store;

pub use config::EngineConfig;
pub use error::Error;
pub use routes::{Decision, RouteTable, Strategy};
pub use store::{CacheDb, StoreNames, StoredResponse};
