//! Tantivy implementation of the index engine.

use std::path::Path;

use tracing::debug;

use batch_index_types::{IndexEngine, IndexError, IndexIdentifier, IndexWriter};

use crate::index::{index_dir, open_or_create_index, TantivyIndexConfig};
use crate::writer::TantivyIndexWriter;

/// Opens one Tantivy index per identifier under a root directory.
#[derive(Debug, Clone)]
pub struct TantivyEngine {
    config: TantivyIndexConfig,
}

impl TantivyEngine {
    pub fn new(config: TantivyIndexConfig) -> Self {
        Self { config }
    }

    /// Engine with default settings rooted at `root`.
    pub fn at(root: impl AsRef<Path>) -> Self {
        Self::new(TantivyIndexConfig::new(root.as_ref()))
    }

    pub fn config(&self) -> &TantivyIndexConfig {
        &self.config
    }
}

impl IndexEngine for TantivyEngine {
    fn open(&mut self, identifier: &IndexIdentifier) -> Result<Box<dyn IndexWriter>, IndexError> {
        let path = index_dir(&self.config.root, identifier);
        debug!(index = %identifier, path = ?path, "Opening Tantivy index");

        let (index, schema) = open_or_create_index(&path, &identifier.config)?;
        let writer = TantivyIndexWriter::new(
            identifier.to_string(),
            &index,
            schema,
            self.config.writer_memory_bytes(),
        )?;
        Ok(Box::new(writer))
    }

    fn name(&self) -> &str {
        "tantivy"
    }
}
