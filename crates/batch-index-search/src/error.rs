//! Search engine error types.

use batch_index_types::IndexError;
use thiserror::Error;

/// Errors that can occur in the Tantivy engine.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Tantivy index error
    #[error("Tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema mismatch
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Analyzer not registered with the engine
    #[error("Unknown analyzer: {0}")]
    UnknownAnalyzer(String),

    /// Stored document is missing its entity id
    #[error("Corrupt document: {0}")]
    CorruptDocument(String),
}

impl From<SearchError> for IndexError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::UnknownAnalyzer(name) => {
                IndexError::InvalidConfig(format!("unknown analyzer '{}'", name))
            }
            other => IndexError::Engine(other.to_string()),
        }
    }
}
