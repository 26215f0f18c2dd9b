//! End-to-end test infrastructure for batch index construction.
//!
//! Provides a shared TestHarness that wires the RocksDB store and the
//! Tantivy engine into a registry session.

use std::path::PathBuf;

use batch_index_core::BatchIndexRegistry;
use batch_index_search::{TantivyEngine, TantivyIndexConfig};
use batch_index_storage::Storage;
use batch_index_types::RelationshipId;

/// Registry over the production engine and store.
pub type Session = BatchIndexRegistry<TantivyEngine, Storage>;

/// Shared test harness for E2E tests.
///
/// Owns the temp directory; each session reopens the store and indexes
/// from it, so state persists across sessions.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Path for the RocksDB store
    pub store_path: PathBuf,
    /// Root for Tantivy index directories
    pub index_path: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let store_path = temp_dir.path().join("store");
        let index_path = temp_dir.path().join("index");

        Self {
            _temp_dir: temp_dir,
            store_path,
            index_path,
        }
    }

    pub fn open_storage(&self) -> Storage {
        Storage::open(&self.store_path).expect("Failed to open test storage")
    }

    /// Start a session over a freshly opened store.
    pub fn session(&self) -> Session {
        self.session_with(self.open_storage())
    }

    /// Start a session over the given store.
    pub fn session_with(&self, storage: Storage) -> Session {
        let config = TantivyIndexConfig::new(&self.index_path).with_memory_mb(15);
        BatchIndexRegistry::new(TantivyEngine::new(config), storage)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Store a small graph: nodes 1..=4 and relationships 10 (1->2),
/// 11 (2->3) and 12 (3->4).
pub fn seed_graph(storage: &Storage) {
    for id in 1..=4 {
        storage.put_node(id).expect("Failed to put node");
    }
    for rel in [
        RelationshipId::new(10, 1, 2),
        RelationshipId::new(11, 2, 3),
        RelationshipId::new(12, 3, 4),
    ] {
        storage
            .put_relationship(&rel)
            .expect("Failed to put relationship");
    }
}
