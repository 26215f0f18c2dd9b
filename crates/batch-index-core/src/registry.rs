//! The bulk-load session registry.
//!
//! Lazily opens one index writer per distinct [`IndexIdentifier`], hands
//! out borrowed handles to it, and closes every writer on shutdown.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::{debug, info, warn};

use batch_index_types::{
    EntityStore, IndexConfig, IndexConfigStore, IndexEngine, IndexError, IndexIdentifier,
    IndexKind,
};

use crate::index::{BatchIndex, IndexHandle};
use crate::resolver::IndexConfigResolver;

/// Owns the indexes created during one bulk-load session.
///
/// A session runs on a single thread before the store accepts concurrent
/// access, so the registry is neither `Send` nor `Sync`:
///
/// ```compile_fail
/// use batch_index_core::{BatchIndexRegistry, MemoryEngine, MemoryStore};
/// fn assert_send<T: Send>() {}
/// assert_send::<BatchIndexRegistry<MemoryEngine, MemoryStore>>();
/// ```
pub struct BatchIndexRegistry<E: IndexEngine, S: EntityStore + IndexConfigStore> {
    engine: E,
    store: S,
    indexes: HashMap<IndexIdentifier, BatchIndex>,
    shut_down: bool,
    _single_threaded: PhantomData<Rc<()>>,
}

impl<E: IndexEngine, S: EntityStore + IndexConfigStore> BatchIndexRegistry<E, S> {
    /// Start a session over the given engine and store.
    pub fn new(engine: E, store: S) -> Self {
        info!(engine = engine.name(), "Starting batch index session");
        Self {
            engine,
            store,
            indexes: HashMap::new(),
            shut_down: false,
            _single_threaded: PhantomData,
        }
    }

    /// Get or create the node index `name`.
    pub fn node_index(
        &mut self,
        name: &str,
        config: Option<&IndexConfig>,
    ) -> Result<IndexHandle<'_>, IndexError> {
        self.index(IndexKind::Node, name, config)
    }

    /// Get or create the relationship index `name`.
    pub fn relationship_index(
        &mut self,
        name: &str,
        config: Option<&IndexConfig>,
    ) -> Result<IndexHandle<'_>, IndexError> {
        self.index(IndexKind::Relationship, name, config)
    }

    fn index(
        &mut self,
        kind: IndexKind,
        name: &str,
        config: Option<&IndexConfig>,
    ) -> Result<IndexHandle<'_>, IndexError> {
        self.ensure_open()?;

        let resolution = IndexConfigResolver::new(&mut self.store).check(name, config)?;
        let identifier = IndexIdentifier::new(kind, name, resolution.config);

        let index = match self.indexes.entry(identifier) {
            Entry::Occupied(entry) => {
                debug!(index = %entry.key(), "Reusing cached index");
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                let writer = self.engine.open(entry.key())?;
                // Only a config the engine accepted is recorded for the name
                if resolution.is_new {
                    let persisted = IndexConfigResolver::new(&mut self.store)
                        .persist(name, &entry.key().config);
                    if let Err(e) = persisted {
                        if let Err(close_err) = writer.close() {
                            warn!(
                                index = %entry.key(),
                                error = %close_err,
                                "Failed to close index"
                            );
                        }
                        return Err(e);
                    }
                }
                info!(
                    index = %entry.key(),
                    config = %entry.key().config,
                    engine = self.engine.name(),
                    "Created batch index"
                );
                let identifier = entry.key().clone();
                entry.insert(BatchIndex::new(identifier, writer))
            }
        };

        Ok(IndexHandle::new(index, &self.store))
    }

    /// Close every index created in this session.
    ///
    /// Each writer is closed exactly once. A failing close does not stop the
    /// others; the first error is returned. The registry is unusable afterwards.
    pub fn shutdown(&mut self) -> Result<(), IndexError> {
        self.ensure_open()?;
        self.shut_down = true;

        let count = self.indexes.len();
        let mut first_error = None;
        for (identifier, index) in self.indexes.drain() {
            let documents = index.documents_added();
            match index.into_writer().close() {
                Ok(()) => debug!(index = %identifier, documents, "Closed index"),
                Err(e) => {
                    warn!(index = %identifier, error = %e, "Failed to close index");
                    first_error.get_or_insert(e);
                }
            }
        }

        info!(indexes = count, "Batch index session shut down");
        first_error.map_or(Ok(()), Err)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Number of distinct indexes opened so far.
    pub fn index_count(&self) -> usize {
        self.indexes.len()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &IndexIdentifier> {
        self.indexes.keys()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn ensure_open(&self) -> Result<(), IndexError> {
        if self.shut_down {
            return Err(IndexError::UseAfterShutdown);
        }
        Ok(())
    }
}

impl<E: IndexEngine, S: EntityStore + IndexConfigStore> Drop for BatchIndexRegistry<E, S> {
    fn drop(&mut self) {
        if !self.shut_down {
            warn!(
                indexes = self.indexes.len(),
                "Batch index registry dropped without shutdown, closing indexes"
            );
            if let Err(e) = self.shutdown() {
                warn!(error = %e, "Shutdown on drop failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryEngine, MemoryStore};
    use batch_index_types::{
        EntityId, IndexConfigStore, Number, RelationshipId, ResolvedValue, ValueEncoding,
        CONFIG_ANALYZER, CONFIG_TYPE, KEY_END_NODE_ID, KEY_START_NODE_ID,
    };

    fn registry() -> (BatchIndexRegistry<MemoryEngine, MemoryStore>, MemoryEngine) {
        let engine = MemoryEngine::new();
        let mut store = MemoryStore::new();
        for id in 1..=5 {
            store.add_node(id);
        }
        store.add_relationship(RelationshipId::new(100, 1, 2));
        store.add_relationship(RelationshipId::new(101, 2, 3));
        (BatchIndexRegistry::new(engine.clone(), store), engine)
    }

    fn analyzer(value: &str) -> IndexConfig {
        IndexConfig::new().with(CONFIG_ANALYZER, value)
    }

    #[test]
    fn test_same_request_hits_cache() {
        let (mut registry, engine) = registry();
        let config = analyzer("x");

        let first = registry
            .node_index("people", Some(&config))
            .unwrap()
            .identifier()
            .clone();
        let second = registry
            .node_index("people", Some(&config))
            .unwrap()
            .identifier()
            .clone();

        assert_eq!(first, second);
        assert_eq!(registry.index_count(), 1);
        assert_eq!(engine.open_count(&first), 1);
        assert_eq!(engine.total_opened(), 1);
    }

    #[test]
    fn test_conflicting_config_is_rejected() {
        let (mut registry, engine) = registry();

        registry.node_index("people", Some(&analyzer("x"))).unwrap();
        let err = registry
            .node_index("people", Some(&analyzer("y")))
            .err()
            .unwrap();

        assert!(matches!(err, IndexError::ConfigConflict { .. }));
        assert_eq!(engine.total_opened(), 1);

        // Other indexes are unaffected
        registry.node_index("places", Some(&analyzer("y"))).unwrap();
        assert_eq!(registry.index_count(), 2);
    }

    #[test]
    fn test_no_config_reuses_stored_config() {
        let (mut registry, _engine) = registry();
        let with_config = registry
            .node_index("people", Some(&analyzer("x")))
            .unwrap()
            .identifier()
            .clone();
        let without = registry.node_index("people", None).unwrap().identifier().clone();
        assert_eq!(with_config, without);
    }

    #[test]
    fn test_node_and_relationship_indexes_are_distinct() {
        let (mut registry, _engine) = registry();
        let node = registry.node_index("shared", None).unwrap().identifier().clone();
        let rel = registry
            .relationship_index("shared", None)
            .unwrap()
            .identifier()
            .clone();

        assert_ne!(node, rel);
        assert_eq!(node.config, rel.config);
        assert_eq!(registry.index_count(), 2);
    }

    #[test]
    fn test_relationship_documents_carry_endpoints() {
        let (mut registry, engine) = registry();
        let identifier = {
            let mut index = registry.relationship_index("knows", None).unwrap();
            index.add(100, [("since", ValueEncoding::new(2010))]).unwrap();
            index.flush().unwrap();
            index.identifier().clone()
        };

        let docs = engine.documents(&identifier);
        assert_eq!(docs.len(), 1);
        let starts: Vec<_> = docs[0].get(KEY_START_NODE_ID).collect();
        let ends: Vec<_> = docs[0].get(KEY_END_NODE_ID).collect();
        assert_eq!(starts.len(), 1);
        assert_eq!(ends.len(), 1);
        assert_eq!(starts[0].value.as_text(), Some("1"));
        assert_eq!(ends[0].value.as_text(), Some("2"));
        assert!(starts[0].is_exact() && ends[0].is_exact());
    }

    #[test]
    fn test_node_documents_have_no_endpoints() {
        let (mut registry, engine) = registry();
        let identifier = {
            let mut index = registry.node_index("people", None).unwrap();
            index.add(1, [("name", "alice")]).unwrap();
            index.flush().unwrap();
            index.identifier().clone()
        };

        let docs = engine.documents(&identifier);
        assert_eq!(docs[0].get(KEY_START_NODE_ID).count(), 0);
        assert_eq!(docs[0].get(KEY_END_NODE_ID).count(), 0);
    }

    #[test]
    fn test_unknown_entities_are_rejected() {
        let (mut registry, _engine) = registry();

        let err = registry
            .node_index("people", None)
            .unwrap()
            .add(99, [("name", "ghost")])
            .unwrap_err();
        assert!(matches!(
            err,
            IndexError::EntityNotFound { kind: "node", id: 99 }
        ));

        let err = registry
            .relationship_index("knows", None)
            .unwrap()
            .add(1, [("since", 2000)])
            .unwrap_err();
        assert!(matches!(
            err,
            IndexError::EntityNotFound {
                kind: "relationship",
                id: 1
            }
        ));
    }

    #[test]
    fn test_wrong_identifier_shape_is_rejected() {
        let (mut registry, _engine) = registry();
        let err = registry
            .relationship_index("knows", None)
            .unwrap()
            .add_entity(EntityId::Node(1), [("k", "v")])
            .unwrap_err();
        assert!(matches!(err, IndexError::MalformedEntityIdentifier { .. }));
    }

    #[test]
    fn test_numeric_and_string_lookups() {
        let (mut registry, _engine) = registry();
        let mut index = registry.node_index("people", None).unwrap();
        index
            .add(1, [("age", ValueEncoding::numeric(30).unwrap())])
            .unwrap();
        index.add(2, [("age", ValueEncoding::new(30))]).unwrap();
        index.flush().unwrap();

        assert_eq!(index.get("age", ValueEncoding::numeric(30).unwrap()).unwrap(), vec![1]);
        assert_eq!(index.get("age", "30").unwrap(), vec![2]);
        assert_eq!(index.documents_added(), 2);
    }

    #[test]
    fn test_update_or_add_replaces() {
        let (mut registry, _engine) = registry();
        let mut index = registry.node_index("people", None).unwrap();
        index.add(1, [("name", "alice")]).unwrap();
        index.flush().unwrap();
        index.update_or_add(1, [("name", "alicia")]).unwrap();
        index.flush().unwrap();

        assert!(index.get("name", "alice").unwrap().is_empty());
        assert_eq!(index.get("name", "alicia").unwrap(), vec![1]);
    }

    #[test]
    fn test_failed_update_keeps_old_document() {
        let (mut registry, _engine) = registry();
        let mut index = registry.node_index("people", None).unwrap();
        index.add(1, [("name", "alice")]).unwrap();
        index.flush().unwrap();

        let err = index.update_or_add(1, [("_id_", "2")]).unwrap_err();
        assert!(matches!(err, IndexError::ReservedKey(_)));
        index.flush().unwrap();
        assert_eq!(index.get("name", "alice").unwrap(), vec![1]);
    }

    #[test]
    fn test_shutdown_closes_each_index_once() {
        let (mut registry, engine) = registry();
        let ids: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|name| registry.node_index(name, None).unwrap().identifier().clone())
            .collect();
        let rel = registry
            .relationship_index("knows", None)
            .unwrap()
            .identifier()
            .clone();

        registry.shutdown().unwrap();

        for id in ids.iter().chain(std::iter::once(&rel)) {
            assert_eq!(engine.close_count(id), 1);
        }
        assert!(registry.is_shut_down());
        assert_eq!(registry.index_count(), 0);
    }

    #[test]
    fn test_use_after_shutdown() {
        let (mut registry, engine) = registry();
        let id = registry.node_index("people", None).unwrap().identifier().clone();
        registry.shutdown().unwrap();

        assert!(matches!(
            registry.node_index("people", None).err(),
            Some(IndexError::UseAfterShutdown)
        ));
        assert!(matches!(
            registry.relationship_index("knows", None).err(),
            Some(IndexError::UseAfterShutdown)
        ));
        assert!(matches!(
            registry.shutdown(),
            Err(IndexError::UseAfterShutdown)
        ));
        assert_eq!(engine.close_count(&id), 1);
    }

    #[test]
    fn test_drop_without_shutdown_closes() {
        let engine = MemoryEngine::new();
        let id = {
            let mut registry = BatchIndexRegistry::new(engine.clone(), MemoryStore::new());
            let id = registry.node_index("people", None).unwrap().identifier().clone();
            id
        };
        assert_eq!(engine.close_count(&id), 1);
    }

    #[test]
    fn test_resolved_config_is_persisted() {
        let (mut registry, _engine) = registry();
        registry
            .node_index("docs", Some(&IndexConfig::new().with(CONFIG_TYPE, "fulltext")))
            .unwrap();
        let stored = registry.store().stored_config("docs").unwrap().unwrap();
        assert_eq!(stored.get("to_lower_case"), Some("true"));
    }

    #[test]
    fn test_numeric_resolution_reaches_engine() {
        let (mut registry, engine) = registry();
        let identifier = {
            let mut index = registry.node_index("people", None).unwrap();
            index
                .add(3, [("score", ValueEncoding::numeric(1.5).unwrap())])
                .unwrap();
            index.flush().unwrap();
            index.identifier().clone()
        };
        let docs = engine.documents(&identifier);
        let score: Vec<_> = docs[0].get("score").collect();
        assert_eq!(score[0].value, ResolvedValue::Numeric(Number::Float(1.5)));
    }

    /// Delegates to the in-memory engine but refuses one analyzer.
    struct PickyEngine(MemoryEngine);

    impl IndexEngine for PickyEngine {
        fn open(
            &mut self,
            identifier: &IndexIdentifier,
        ) -> Result<Box<dyn batch_index_types::IndexWriter>, IndexError> {
            if identifier.config.get(CONFIG_ANALYZER) == Some("klingon") {
                return Err(IndexError::InvalidConfig("unknown analyzer 'klingon'".into()));
            }
            self.0.open(identifier)
        }

        fn name(&self) -> &str {
            "picky"
        }
    }

    #[test]
    fn test_rejected_config_is_not_persisted() {
        let mut registry =
            BatchIndexRegistry::new(PickyEngine(MemoryEngine::new()), MemoryStore::new());

        let err = registry
            .node_index("odd", Some(&analyzer("klingon")))
            .err()
            .unwrap();
        assert!(matches!(err, IndexError::InvalidConfig(_)));
        assert_eq!(registry.store().stored_config("odd").unwrap(), None);

        // A corrected request is a fresh resolution, not a conflict
        let id = registry
            .node_index("odd", Some(&analyzer("raw")))
            .unwrap()
            .identifier()
            .clone();
        assert_eq!(id.config.get(CONFIG_ANALYZER), Some("raw"));
        assert_eq!(
            registry.store().stored_config("odd").unwrap(),
            Some(id.config.clone())
        );
        assert_eq!(registry.node_index("odd", None).unwrap().identifier(), &id);
    }
}
