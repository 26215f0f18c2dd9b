//! Engine-neutral documents built per indexed entity.

use crate::error::IndexError;
use crate::value::{ResolvedValue, ValueEncoding};

/// Field holding the entity id.
pub const KEY_DOC_ID: &str = "_id_";
/// Field holding a relationship's start node id.
pub const KEY_START_NODE_ID: &str = "_start_node_id_";
/// Field holding a relationship's end node id.
pub const KEY_END_NODE_ID: &str = "_end_node_id_";

/// Field names callers may not use as property keys.
pub const RESERVED_KEYS: &[&str] = &[KEY_DOC_ID, KEY_START_NODE_ID, KEY_END_NODE_ID];

/// How the engine treats a field's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    /// Indexed as one opaque literal, never tokenized
    Exact,
    /// Passed through the index's configured analyzer
    Analyzed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentField {
    pub name: String,
    pub value: ResolvedValue,
    pub mode: FieldMode,
    pub stored: bool,
}

impl DocumentField {
    pub fn is_exact(&self) -> bool {
        self.mode == FieldMode::Exact
    }

    pub fn is_reserved(&self) -> bool {
        RESERVED_KEYS.contains(&self.name.as_str())
    }
}

/// The record handed to the index engine for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    entity_id: u64,
    fields: Vec<DocumentField>,
}

impl Document {
    /// A document holding only the entity id field.
    pub fn new_base(entity_id: u64) -> Self {
        let mut doc = Self {
            entity_id,
            fields: Vec::new(),
        };
        doc.add_exact(KEY_DOC_ID, entity_id.to_string());
        doc
    }

    /// Add a stored, exact-match field.
    pub(crate) fn add_exact(&mut self, name: &str, value: String) {
        self.fields.push(DocumentField {
            name: name.to_string(),
            value: ResolvedValue::Text(value),
            mode: FieldMode::Exact,
            stored: true,
        });
    }

    /// Add a caller property. Repeated keys add repeated fields.
    pub fn add_property(
        &mut self,
        key: impl Into<String>,
        value: &ValueEncoding,
    ) -> Result<(), IndexError> {
        let key = key.into();
        if RESERVED_KEYS.contains(&key.as_str()) {
            return Err(IndexError::ReservedKey(key));
        }
        self.fields.push(DocumentField {
            name: key,
            value: value.resolve(),
            mode: FieldMode::Analyzed,
            stored: false,
        });
        Ok(())
    }

    pub fn entity_id(&self) -> u64 {
        self.entity_id
    }

    pub fn fields(&self) -> &[DocumentField] {
        &self.fields
    }

    /// All fields with the given name.
    pub fn get<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DocumentField> + 'a {
        self.fields.iter().filter(move |f| f.name == name)
    }

    /// Caller-added fields only.
    pub fn properties(&self) -> impl Iterator<Item = &DocumentField> {
        self.fields.iter().filter(|f| !f.is_reserved())
    }
}
