//! Per-index state owned by the registry, and the borrowed handle
//! callers use to feed it.

use tracing::debug;

use batch_index_types::{
    Document, EntityId, EntityStore, EntityType, IndexError, IndexIdentifier, IndexWriter,
    ValueEncoding,
};

/// One open index within a bulk-load session.
pub struct BatchIndex {
    identifier: IndexIdentifier,
    writer: Box<dyn IndexWriter>,
    documents_added: u64,
}

impl BatchIndex {
    pub(crate) fn new(identifier: IndexIdentifier, writer: Box<dyn IndexWriter>) -> Self {
        Self {
            identifier,
            writer,
            documents_added: 0,
        }
    }

    pub fn identifier(&self) -> &IndexIdentifier {
        &self.identifier
    }

    pub fn documents_added(&self) -> u64 {
        self.documents_added
    }

    pub(crate) fn into_writer(self) -> Box<dyn IndexWriter> {
        self.writer
    }
}

/// Mutable access to a cached index for the duration of a borrow.
///
/// Returned by the registry's `node_index` / `relationship_index`.
pub struct IndexHandle<'a> {
    index: &'a mut BatchIndex,
    store: &'a dyn EntityStore,
}

impl<'a> IndexHandle<'a> {
    pub(crate) fn new(index: &'a mut BatchIndex, store: &'a dyn EntityStore) -> Self {
        Self { index, store }
    }

    pub fn identifier(&self) -> &IndexIdentifier {
        &self.index.identifier
    }

    pub fn entity_type(&self) -> EntityType {
        self.index.identifier.entity_type
    }

    /// Documents added through this index in the current session.
    pub fn documents_added(&self) -> u64 {
        self.index.documents_added
    }

    /// Index an entity by id.
    ///
    /// Relationship endpoints are looked up in the entity store.
    pub fn add<I, K, V>(&mut self, entity_id: u64, properties: I) -> Result<(), IndexError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ValueEncoding>,
    {
        let entity = self.lookup(entity_id)?;
        self.add_entity(entity, properties)
    }

    /// Index an entity whose identifier the caller already has.
    pub fn add_entity<I, K, V>(&mut self, entity: EntityId, properties: I) -> Result<(), IndexError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ValueEncoding>,
    {
        let doc = self.build_document(&entity, properties)?;
        self.index.writer.add_document(doc)?;
        self.index.documents_added += 1;
        debug!(index = %self.index.identifier, entity = %entity, "Added document");
        Ok(())
    }

    /// Replace every document of an entity with a new one.
    pub fn update_or_add<I, K, V>(&mut self, entity_id: u64, properties: I) -> Result<(), IndexError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ValueEncoding>,
    {
        let entity = self.lookup(entity_id)?;
        // Build first so a bad property leaves the old document in place
        let doc = self.build_document(&entity, properties)?;
        self.index.writer.remove_entity(entity_id)?;
        self.index.writer.add_document(doc)?;
        self.index.documents_added += 1;
        debug!(index = %self.index.identifier, entity = %entity, "Replaced document");
        Ok(())
    }

    /// Make added documents visible to [`get`](Self::get).
    pub fn flush(&mut self) -> Result<(), IndexError> {
        self.index.writer.flush()?;
        debug!(index = %self.index.identifier, "Flushed index");
        Ok(())
    }

    /// Exact-match lookup of flushed documents, returning entity ids.
    pub fn get(&self, key: &str, value: impl Into<ValueEncoding>) -> Result<Vec<u64>, IndexError> {
        self.index.writer.get(key, &value.into().resolve())
    }

    fn lookup(&self, entity_id: u64) -> Result<EntityId, IndexError> {
        match self.entity_type() {
            EntityType::Node => {
                if self.store.node_exists(entity_id)? {
                    Ok(EntityId::Node(entity_id))
                } else {
                    Err(IndexError::EntityNotFound {
                        kind: "node",
                        id: entity_id,
                    })
                }
            }
            EntityType::Relationship => self
                .store
                .relationship(entity_id)?
                .map(EntityId::Relationship)
                .ok_or(IndexError::EntityNotFound {
                    kind: "relationship",
                    id: entity_id,
                }),
        }
    }

    fn build_document<I, K, V>(&self, entity: &EntityId, properties: I) -> Result<Document, IndexError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ValueEncoding>,
    {
        let mut doc = self.entity_type().new_document(entity)?;
        for (key, value) in properties {
            doc.add_property(key, &value.into())?;
        }
        Ok(doc)
    }
}
