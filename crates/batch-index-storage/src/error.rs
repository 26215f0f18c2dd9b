//! Storage layer error types.

use batch_index_types::IndexError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    #[error("Column family not found: {0}")]
    ColumnFamilyNotFound(String),

    /// Stored key does not decode to a node, relationship or config key
    #[error("Malformed key: {0}")]
    MalformedKey(String),

    /// Stored relationship or config value failed to (de)serialize
    #[error("Corrupt value: {0}")]
    CorruptValue(#[from] serde_json::Error),

    /// Relationship endpoint has not been stored
    #[error("Node {node} (endpoint of relationship {relationship}) not found")]
    MissingEndpoint { relationship: u64, node: u64 },
}

impl From<StorageError> for IndexError {
    fn from(err: StorageError) -> Self {
        IndexError::Store(err.to_string())
    }
}
