//! In-memory engine and store.
//!
//! Used by tests and dry runs. The engine's state is shared between the
//! engine and its writers so callers can inspect opens, closes and
//! flushed documents after handing the engine to a registry.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use batch_index_types::{
    default_config_template, Document, EntityStore, IndexConfig, IndexConfigStore, IndexEngine,
    IndexError, IndexIdentifier, IndexWriter, RelationshipId, ResolvedValue,
};

#[derive(Debug, Default)]
struct MemoryState {
    opened: HashMap<IndexIdentifier, usize>,
    closed: HashMap<IndexIdentifier, usize>,
    documents: HashMap<IndexIdentifier, Vec<Document>>,
}

/// Index engine keeping flushed documents in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times a writer was opened for the identifier.
    pub fn open_count(&self, identifier: &IndexIdentifier) -> usize {
        self.state.borrow().opened.get(identifier).copied().unwrap_or(0)
    }

    /// How many times a writer for the identifier was closed.
    pub fn close_count(&self, identifier: &IndexIdentifier) -> usize {
        self.state.borrow().closed.get(identifier).copied().unwrap_or(0)
    }

    /// Total writers opened across all identifiers.
    pub fn total_opened(&self) -> usize {
        self.state.borrow().opened.values().sum()
    }

    /// Flushed documents of an index.
    pub fn documents(&self, identifier: &IndexIdentifier) -> Vec<Document> {
        self.state
            .borrow()
            .documents
            .get(identifier)
            .cloned()
            .unwrap_or_default()
    }
}

impl IndexEngine for MemoryEngine {
    fn open(&mut self, identifier: &IndexIdentifier) -> Result<Box<dyn IndexWriter>, IndexError> {
        {
            let mut state = self.state.borrow_mut();
            *state.opened.entry(identifier.clone()).or_insert(0) += 1;
            state.documents.entry(identifier.clone()).or_default();
        }
        Ok(Box::new(MemoryWriter {
            identifier: identifier.clone(),
            pending: Vec::new(),
            removals: Vec::new(),
            state: Rc::clone(&self.state),
        }))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

struct MemoryWriter {
    identifier: IndexIdentifier,
    pending: Vec<Document>,
    removals: Vec<u64>,
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryWriter {
    fn matches(&self, field_value: &ResolvedValue, wanted: &ResolvedValue) -> bool {
        match (field_value, wanted) {
            (ResolvedValue::Text(a), ResolvedValue::Text(b))
                if self.identifier.config.is_fulltext()
                    && self.identifier.config.to_lower_case() =>
            {
                a.to_lowercase() == b.to_lowercase()
            }
            (a, b) => a == b,
        }
    }
}

impl IndexWriter for MemoryWriter {
    fn add_document(&mut self, doc: Document) -> Result<(), IndexError> {
        self.pending.push(doc);
        Ok(())
    }

    fn remove_entity(&mut self, entity_id: u64) -> Result<(), IndexError> {
        // Removal applies only to documents added before it
        self.pending.retain(|doc| doc.entity_id() != entity_id);
        self.removals.push(entity_id);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), IndexError> {
        let mut state = self.state.borrow_mut();
        let docs = state.documents.entry(self.identifier.clone()).or_default();
        for entity_id in self.removals.drain(..) {
            docs.retain(|doc| doc.entity_id() != entity_id);
        }
        docs.append(&mut self.pending);
        Ok(())
    }

    fn get(&self, key: &str, value: &ResolvedValue) -> Result<Vec<u64>, IndexError> {
        let state = self.state.borrow();
        let Some(docs) = state.documents.get(&self.identifier) else {
            return Ok(Vec::new());
        };
        let mut seen = HashSet::new();
        let hits = docs
            .iter()
            .filter(|doc| doc.get(key).any(|f| self.matches(&f.value, value)))
            .map(Document::entity_id)
            .filter(|id| seen.insert(*id))
            .collect();
        Ok(hits)
    }

    fn close(mut self: Box<Self>) -> Result<(), IndexError> {
        self.flush()?;
        let mut state = self.state.borrow_mut();
        *state.closed.entry(self.identifier.clone()).or_insert(0) += 1;
        Ok(())
    }
}

/// Entity and config store backed by hash maps.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    nodes: HashSet<u64>,
    relationships: HashMap<u64, RelationshipId>,
    configs: HashMap<String, IndexConfig>,
    template: IndexConfig,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            nodes: HashSet::new(),
            relationships: HashMap::new(),
            configs: HashMap::new(),
            template: default_config_template(),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_template(mut self, template: IndexConfig) -> Self {
        self.template = template;
        self
    }

    pub fn add_node(&mut self, id: u64) {
        self.nodes.insert(id);
    }

    /// Add a relationship. Endpoints are registered as nodes.
    pub fn add_relationship(&mut self, rel: RelationshipId) {
        self.nodes.insert(rel.start_node);
        self.nodes.insert(rel.end_node);
        self.relationships.insert(rel.id, rel);
    }
}

impl EntityStore for MemoryStore {
    fn node_exists(&self, id: u64) -> Result<bool, IndexError> {
        Ok(self.nodes.contains(&id))
    }

    fn relationship(&self, id: u64) -> Result<Option<RelationshipId>, IndexError> {
        Ok(self.relationships.get(&id).copied())
    }
}

impl IndexConfigStore for MemoryStore {
    fn stored_config(&self, name: &str) -> Result<Option<IndexConfig>, IndexError> {
        Ok(self.configs.get(name).cloned())
    }

    fn store_config(&mut self, name: &str, config: &IndexConfig) -> Result<(), IndexError> {
        self.configs.insert(name.to_string(), config.clone());
        Ok(())
    }

    fn default_template(&self) -> IndexConfig {
        self.template.clone()
    }
}
