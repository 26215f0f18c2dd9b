//! Column family definitions for RocksDB.
//!
//! - nodes: node existence markers
//! - relationships: relationship endpoints (JSON)
//! - index_config: resolved index configuration per index name (JSON)

use rocksdb::{ColumnFamilyDescriptor, Options};

/// Column family name for nodes
pub const CF_NODES: &str = "nodes";

/// Column family name for relationships
pub const CF_RELATIONSHIPS: &str = "relationships";

/// Column family name for index configurations
pub const CF_INDEX_CONFIG: &str = "index_config";

/// All column family names
pub const ALL_CF_NAMES: &[&str] = &[CF_NODES, CF_RELATIONSHIPS, CF_INDEX_CONFIG];

/// Entity column families see bulk appends only
fn entity_options() -> Options {
    let mut opts = Options::default();
    opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
    opts
}

/// Build all column family descriptors
pub fn build_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    vec![
        ColumnFamilyDescriptor::new(CF_NODES, entity_options()),
        ColumnFamilyDescriptor::new(CF_RELATIONSHIPS, entity_options()),
        ColumnFamilyDescriptor::new(CF_INDEX_CONFIG, Options::default()),
    ]
}
