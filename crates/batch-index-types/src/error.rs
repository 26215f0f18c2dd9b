//! Error types for batch index construction.

use thiserror::Error;

/// Unified error type for batch index operations.
///
/// None of these are retried: every variant is a deterministic logic or
/// configuration error, or a failure reported by a collaborator.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Numeric encoding requested for a value that is not a number
    #[error("Value should be a number, is {value} ({kind})")]
    InvalidValueKind { value: String, kind: &'static str },

    /// Same index name requested with a different resolved configuration
    #[error("Supplied configuration for index '{name}' ({supplied}) doesn't match stored configuration ({stored})")]
    ConfigConflict {
        name: String,
        supplied: String,
        stored: String,
    },

    /// Entity identifier shape does not match the entity type
    #[error("Malformed entity identifier for {expected} index: {got}")]
    MalformedEntityIdentifier { expected: &'static str, got: String },

    /// Registry used after shutdown
    #[error("Batch index registry used after shutdown")]
    UseAfterShutdown,

    /// Configuration value not understood
    #[error("Invalid index configuration: {0}")]
    InvalidConfig(String),

    /// Caller property collides with a reserved document field
    #[error("Key '{0}' is reserved for internal use")]
    ReservedKey(String),

    /// Entity id unknown to the entity store
    #[error("{kind} {id} not found")]
    EntityNotFound { kind: &'static str, id: u64 },

    /// Underlying index engine failure
    #[error("Engine error: {0}")]
    Engine(String),

    /// Entity/config store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Settings could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IndexError {
    /// Whether the bulk-load driver may keep going with other indexes.
    ///
    /// Only a configuration conflict is scoped to a single index; everything
    /// else aborts the session.
    pub fn is_index_scoped(&self) -> bool {
        matches!(self, IndexError::ConfigConflict { .. })
    }
}
