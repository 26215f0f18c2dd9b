//! Index configuration maps and the identifier used as cache key.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityType, IndexKind};

/// Config key naming the engine that owns the index.
pub const CONFIG_PROVIDER: &str = "provider";
/// Config key selecting `exact` or `fulltext` indexing.
pub const CONFIG_TYPE: &str = "type";
/// Config key for fulltext case folding.
pub const CONFIG_TO_LOWER_CASE: &str = "to_lower_case";
/// Config key naming an explicit analyzer.
pub const CONFIG_ANALYZER: &str = "analyzer";

pub const TYPE_EXACT: &str = "exact";
pub const TYPE_FULLTEXT: &str = "fulltext";

/// String-to-string index configuration.
///
/// Backed by a sorted map, so equality and hashing ignore insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexConfig(BTreeMap<String, String>);

impl IndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy every entry of `other` over this config.
    pub fn merge_from(&mut self, other: &IndexConfig) {
        for (k, v) in other.iter() {
            self.0.insert(k.to_string(), v.to_string());
        }
    }

    /// The configured index type, `exact` when unset.
    pub fn index_type(&self) -> &str {
        self.get(CONFIG_TYPE).unwrap_or(TYPE_EXACT)
    }

    pub fn is_fulltext(&self) -> bool {
        self.index_type() == TYPE_FULLTEXT
    }

    /// Whether fulltext analysis folds case; only meaningful for fulltext.
    pub fn to_lower_case(&self) -> bool {
        self.get(CONFIG_TO_LOWER_CASE)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(true)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IndexConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for IndexConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        f.write_str("}")
    }
}

/// Value key identifying one index within a bulk-load session.
///
/// Two identifiers are equal iff kind, entity type, name and resolved
/// config are all equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexIdentifier {
    pub kind: IndexKind,
    pub entity_type: EntityType,
    pub name: String,
    pub config: IndexConfig,
}

impl IndexIdentifier {
    pub fn new(kind: IndexKind, name: impl Into<String>, config: IndexConfig) -> Self {
        Self {
            kind,
            entity_type: kind.entity_type(),
            name: name.into(),
            config,
        }
    }
}

impl fmt::Display for IndexIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}
