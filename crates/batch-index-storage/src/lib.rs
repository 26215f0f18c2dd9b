//! Storage layer for batch index construction.
//!
//! Provides RocksDB-backed storage with:
//! - Column family isolation for nodes, relationships and index configs
//! - Zero-padded numeric keys for ordered scans
//! - [`EntityStore`](batch_index_types::EntityStore) and
//!   [`IndexConfigStore`](batch_index_types::IndexConfigStore) implementations

pub mod column_families;
pub mod db;
pub mod error;
pub mod keys;

pub use db::{Storage, StorageStats};
pub use error::StorageError;
pub use keys::{IndexConfigKey, NodeKey, RelationshipKey};
