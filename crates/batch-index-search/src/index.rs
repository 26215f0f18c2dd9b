//! Tantivy index management.
//!
//! Each index lives in its own directory under the engine root:
//! `<root>/<kind>/<name>`.

use std::path::{Path, PathBuf};

use tantivy::Index;
use tracing::{debug, info};

use batch_index_types::{IndexConfig, IndexIdentifier};

use crate::error::SearchError;
use crate::schema::{build_index_schema, IndexSchema};

/// Default memory budget for IndexWriter (50MB)
pub const DEFAULT_WRITER_MEMORY_MB: usize = 50;

/// Smallest budget Tantivy accepts for a single indexing thread
const MIN_WRITER_MEMORY_MB: usize = 15;

/// Tantivy engine configuration
#[derive(Debug, Clone)]
pub struct TantivyIndexConfig {
    /// Directory holding every index
    pub root: PathBuf,
    /// Memory budget for each writer in MB
    pub writer_memory_mb: usize,
}

impl TantivyIndexConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            writer_memory_mb: DEFAULT_WRITER_MEMORY_MB,
        }
    }

    pub fn with_memory_mb(mut self, mb: usize) -> Self {
        self.writer_memory_mb = mb;
        self
    }

    /// Writer budget in bytes, raised to Tantivy's minimum.
    pub fn writer_memory_bytes(&self) -> usize {
        self.writer_memory_mb.max(MIN_WRITER_MEMORY_MB) * 1024 * 1024
    }
}

/// Directory for an index.
pub fn index_dir(root: &Path, identifier: &IndexIdentifier) -> PathBuf {
    root.join(identifier.kind.as_str()).join(&identifier.name)
}

/// Open an existing index or create a new one.
///
/// Uses MmapDirectory for persistence. An existing index keeps the schema
/// it was created with.
pub fn open_or_create_index(
    path: &Path,
    config: &IndexConfig,
) -> Result<(Index, IndexSchema), SearchError> {
    if path.join("meta.json").exists() {
        debug!(path = ?path, "Opening existing index");
        let index = Index::open_in_dir(path)?;
        let schema = IndexSchema::from_schema(index.schema())?;
        Ok((index, schema))
    } else {
        info!(path = ?path, "Creating new index");
        std::fs::create_dir_all(path)?;
        let schema = build_index_schema(config)?;
        let index = Index::create_in_dir(path, schema.schema().clone())?;
        Ok((index, schema))
    }
}
