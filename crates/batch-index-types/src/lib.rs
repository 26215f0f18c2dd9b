//! # batch-index-types
//!
//! Shared types for building graph indexes during a bulk load.
//!
//! - Values: [`PropertyValue`] and its index encoding [`ValueEncoding`]
//! - Entities: [`EntityId`] and the [`EntityType`] document builders
//! - Identity: [`IndexConfig`] and the [`IndexIdentifier`] cache key
//! - Seams: the [`IndexEngine`], [`EntityStore`] and [`IndexConfigStore`] traits
//! - Settings: layered configuration

pub mod config;
pub mod document;
pub mod engine;
pub mod entity;
pub mod error;
pub mod identifier;
pub mod store;
pub mod value;

pub use config::Settings;
pub use document::{
    Document, DocumentField, FieldMode, KEY_DOC_ID, KEY_END_NODE_ID, KEY_START_NODE_ID,
    RESERVED_KEYS,
};
pub use engine::{IndexEngine, IndexWriter};
pub use entity::{EntityId, EntityType, IndexKind, RelationshipId};
pub use error::IndexError;
pub use identifier::{
    IndexConfig, IndexIdentifier, CONFIG_ANALYZER, CONFIG_PROVIDER, CONFIG_TO_LOWER_CASE,
    CONFIG_TYPE, TYPE_EXACT, TYPE_FULLTEXT,
};
pub use store::{default_config_template, EntityStore, IndexConfigStore, DEFAULT_PROVIDER};
pub use value::{Number, PropertyValue, ResolvedValue, ValueEncoding};
