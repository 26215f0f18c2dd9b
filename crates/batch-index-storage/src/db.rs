//! RocksDB wrapper for the bulk-load entity store.
//!
//! Provides:
//! - Database open with column family setup
//! - Node and relationship records consulted during indexing
//! - The persisted index configuration table

use rocksdb::{IteratorMode, Options, DB};
use std::path::Path;
use tracing::{debug, info};

use batch_index_types::{
    default_config_template, EntityStore, IndexConfig, IndexConfigStore, IndexError,
    RelationshipId,
};

use crate::column_families::{
    build_cf_descriptors, ALL_CF_NAMES, CF_INDEX_CONFIG, CF_NODES, CF_RELATIONSHIPS,
};
use crate::error::StorageError;
use crate::keys::{IndexConfigKey, NodeKey, RelationshipKey};

/// Main storage interface for batch loading
pub struct Storage {
    db: DB,
    /// Template new index configs start from
    template: IndexConfig,
}

impl Storage {
    /// Open storage at the given path, creating if necessary
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening storage at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        // Bulk load is write-heavy; defer compaction work
        db_opts.set_max_background_jobs(4);

        let cf_descriptors = build_cf_descriptors();
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        Ok(Self {
            db,
            template: default_config_template(),
        })
    }

    /// Replace the defaults template used for new index configs.
    pub fn with_default_template(mut self, template: IndexConfig) -> Self {
        self.template = template;
        self
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StorageError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(name.to_string()))
    }

    // ==================== Entity Methods ====================

    /// Record a node. Idempotent.
    pub fn put_node(&self, id: u64) -> Result<(), StorageError> {
        let cf = self.cf(CF_NODES)?;
        self.db.put_cf(cf, NodeKey::new(id).to_bytes(), b"")?;
        Ok(())
    }

    pub fn has_node(&self, id: u64) -> Result<bool, StorageError> {
        let cf = self.cf(CF_NODES)?;
        Ok(self.db.get_cf(cf, NodeKey::new(id).to_bytes())?.is_some())
    }

    /// Record a relationship. Both endpoints must already exist.
    pub fn put_relationship(&self, rel: &RelationshipId) -> Result<(), StorageError> {
        for node in [rel.start_node, rel.end_node] {
            if !self.has_node(node)? {
                return Err(StorageError::MissingEndpoint {
                    relationship: rel.id,
                    node,
                });
            }
        }

        let cf = self.cf(CF_RELATIONSHIPS)?;
        let bytes = serde_json::to_vec(rel)?;
        self.db
            .put_cf(cf, RelationshipKey::new(rel.id).to_bytes(), bytes)?;
        debug!(
            rel_id = rel.id,
            start = rel.start_node,
            end = rel.end_node,
            "Stored relationship"
        );
        Ok(())
    }

    pub fn get_relationship(&self, id: u64) -> Result<Option<RelationshipId>, StorageError> {
        let cf = self.cf(CF_RELATIONSHIPS)?;
        match self.db.get_cf(cf, RelationshipKey::new(id).to_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    // ==================== Index Config Methods ====================

    pub fn get_index_config(&self, name: &str) -> Result<Option<IndexConfig>, StorageError> {
        let cf = self.cf(CF_INDEX_CONFIG)?;
        match self.db.get_cf(cf, IndexConfigKey::new(name).to_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn put_index_config(&self, name: &str, config: &IndexConfig) -> Result<(), StorageError> {
        let cf = self.cf(CF_INDEX_CONFIG)?;
        let bytes = serde_json::to_vec(config)?;
        self.db.put_cf(cf, IndexConfigKey::new(name).to_bytes(), bytes)?;
        debug!(index = name, config = %config, "Persisted index config");
        Ok(())
    }

    /// All persisted index configs, ordered by name.
    pub fn index_configs(&self) -> Result<Vec<(String, IndexConfig)>, StorageError> {
        let cf = self.cf(CF_INDEX_CONFIG)?;
        let mut results = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            let key = IndexConfigKey::from_bytes(&key)?;
            results.push((key.name, serde_json::from_slice(&value)?));
        }
        Ok(results)
    }

    /// Names of all persisted index configs, ordered.
    pub fn index_config_names(&self) -> Result<Vec<String>, StorageError> {
        Ok(self
            .index_configs()?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    /// Flush all column families to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        for cf_name in ALL_CF_NAMES {
            if let Some(cf) = self.db.cf_handle(cf_name) {
                self.db.flush_cf(cf)?;
            }
        }
        Ok(())
    }

    /// Get database statistics
    pub fn get_stats(&self) -> Result<StorageStats, StorageError> {
        let count = |name: &str| -> Result<u64, StorageError> {
            let cf = self.cf(name)?;
            let mut n = 0;
            for item in self.db.iterator_cf(cf, IteratorMode::Start) {
                item?;
                n += 1;
            }
            Ok(n)
        };

        Ok(StorageStats {
            node_count: count(CF_NODES)?,
            relationship_count: count(CF_RELATIONSHIPS)?,
            index_config_count: count(CF_INDEX_CONFIG)?,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, Default)]
pub struct StorageStats {
    pub node_count: u64,
    pub relationship_count: u64,
    pub index_config_count: u64,
}

impl EntityStore for Storage {
    fn node_exists(&self, id: u64) -> Result<bool, IndexError> {
        Ok(self.has_node(id)?)
    }

    fn relationship(&self, id: u64) -> Result<Option<RelationshipId>, IndexError> {
        Ok(self.get_relationship(id)?)
    }
}

impl IndexConfigStore for Storage {
    fn stored_config(&self, name: &str) -> Result<Option<IndexConfig>, IndexError> {
        Ok(self.get_index_config(name)?)
    }

    fn store_config(&mut self, name: &str, config: &IndexConfig) -> Result<(), IndexError> {
        Ok(self.put_index_config(name, config)?)
    }

    fn default_template(&self) -> IndexConfig {
        self.template.clone()
    }
}
