//! Indexable entity kinds and their identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::{Document, KEY_END_NODE_ID, KEY_START_NODE_ID};
use crate::error::IndexError;

/// Identifier of a relationship together with its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipId {
    pub id: u64,
    pub start_node: u64,
    pub end_node: u64,
}

impl RelationshipId {
    pub fn new(id: u64, start_node: u64, end_node: u64) -> Self {
        Self {
            id,
            start_node,
            end_node,
        }
    }
}

/// Opaque identifier of an entity being indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityId {
    Node(u64),
    Relationship(RelationshipId),
}

impl EntityId {
    /// The entity's own id, without endpoints.
    pub fn id(&self) -> u64 {
        match self {
            EntityId::Node(id) => *id,
            EntityId::Relationship(rel) => rel.id,
        }
    }
}

impl From<RelationshipId> for EntityId {
    fn from(rel: RelationshipId) -> Self {
        EntityId::Relationship(rel)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Node(id) => write!(f, "node {}", id),
            EntityId::Relationship(rel) => write!(
                f,
                "relationship {} ({} -> {})",
                rel.id, rel.start_node, rel.end_node
            ),
        }
    }
}

/// The kind of entity an index covers.
///
/// Each variant knows how to turn an entity identifier into the base
/// document handed to the index engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    Node,
    Relationship,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Node => "node",
            EntityType::Relationship => "relationship",
        }
    }

    /// Build the base document for an entity.
    ///
    /// Relationship documents carry the endpoint ids as exact-match fields.
    /// An identifier of the wrong shape is rejected with
    /// [`IndexError::MalformedEntityIdentifier`].
    pub fn new_document(&self, entity_id: &EntityId) -> Result<Document, IndexError> {
        match (self, entity_id) {
            (EntityType::Node, EntityId::Node(id)) => Ok(Document::new_base(*id)),
            (EntityType::Relationship, EntityId::Relationship(rel)) => {
                let mut doc = Document::new_base(rel.id);
                doc.add_exact(KEY_START_NODE_ID, rel.start_node.to_string());
                doc.add_exact(KEY_END_NODE_ID, rel.end_node.to_string());
                Ok(doc)
            }
            (expected, got) => Err(IndexError::MalformedEntityIdentifier {
                expected: expected.as_str(),
                got: got.to_string(),
            }),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which family of indexes an index belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexKind {
    Node,
    Relationship,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Node => "node",
            IndexKind::Relationship => "relationship",
        }
    }

    /// The entity type documents of this index kind are built with.
    pub fn entity_type(&self) -> EntityType {
        match self {
            IndexKind::Node => EntityType::Node,
            IndexKind::Relationship => EntityType::Relationship,
        }
    }

    /// Parse from string, returning None for unknown kinds.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "node" => Some(IndexKind::Node),
            "relationship" => Some(IndexKind::Relationship),
            _ => None,
        }
    }
}

impl std::str::FromStr for IndexKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown index kind: {}", s))
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
