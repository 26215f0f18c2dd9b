//! Interface to the underlying index engine.
//!
//! The batch registry only needs to open one writer per index, feed it
//! documents, and close it. Each engine (Tantivy, in-memory) implements
//! these traits.

use crate::document::Document;
use crate::error::IndexError;
use crate::identifier::IndexIdentifier;
use crate::value::ResolvedValue;

/// Opens writers for identified indexes.
pub trait IndexEngine {
    /// Open (creating if needed) the index behind `identifier`.
    fn open(&mut self, identifier: &IndexIdentifier) -> Result<Box<dyn IndexWriter>, IndexError>;

    /// Get the name of this engine for logging.
    fn name(&self) -> &str;
}

/// Write access to a single index.
pub trait IndexWriter {
    /// Queue a document. Not visible to [`get`](Self::get) until flushed.
    fn add_document(&mut self, doc: Document) -> Result<(), IndexError>;

    /// Queue removal of every document for the entity.
    fn remove_entity(&mut self, entity_id: u64) -> Result<(), IndexError>;

    /// Make queued changes visible.
    fn flush(&mut self) -> Result<(), IndexError>;

    /// Exact-match lookup over flushed documents, returning entity ids.
    fn get(&self, key: &str, value: &ResolvedValue) -> Result<Vec<u64>, IndexError>;

    /// Flush and release the index. Consumes the writer.
    fn close(self: Box<Self>) -> Result<(), IndexError>;
}
