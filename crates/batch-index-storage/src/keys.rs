//! Key encoding and decoding for storage layer.
//!
//! Entity ids are zero-padded to 20 digits so keys sort numerically.
//! - nodes: `node:{id:020}`
//! - relationships: `rel:{id:020}`
//! - index configs: `config:{name}`

use crate::error::StorageError;

/// Key for node storage
/// Format: node:{id:020}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeKey {
    pub id: u64,
}

impl NodeKey {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!("node:{:020}", self.id).into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        parse_id(bytes, "node").map(Self::new)
    }
}

/// Key for relationship storage
/// Format: rel:{id:020}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipKey {
    pub id: u64,
}

impl RelationshipKey {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!("rel:{:020}", self.id).into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        parse_id(bytes, "rel").map(Self::new)
    }
}

/// Key for index configuration entries
/// Format: config:{name}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfigKey {
    pub name: String,
}

impl IndexConfigKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!("config:{}", self.name).into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::MalformedKey(format!("Invalid UTF-8: {}", e)))?;
        s.strip_prefix("config:")
            .map(Self::new)
            .ok_or_else(|| StorageError::MalformedKey(format!("Invalid config key format: {}", s)))
    }
}

fn parse_id(bytes: &[u8], prefix: &str) -> Result<u64, StorageError> {
    let s = std::str::from_utf8(bytes)
        .map_err(|e| StorageError::MalformedKey(format!("Invalid UTF-8: {}", e)))?;

    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 || parts[0] != prefix {
        return Err(StorageError::MalformedKey(format!("Invalid {} key format: {}", prefix, s)));
    }

    parts[1]
        .parse()
        .map_err(|e| StorageError::MalformedKey(format!("Invalid id: {}", e)))
}
