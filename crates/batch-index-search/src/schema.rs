//! Tantivy schema definition for batch indexes.
//!
//! Every index has the same fields:
//! - `_id_`, `_start_node_id_`, `_end_node_id_`: STRING | STORED
//! - `properties`: JSON object holding caller properties, analyzed with
//!   the tokenizer chosen by the index config

use tantivy::schema::{
    Field, IndexRecordOption, JsonObjectOptions, Schema, TextFieldIndexing, STORED, STRING,
};

use batch_index_types::{
    IndexConfig, CONFIG_ANALYZER, KEY_DOC_ID, KEY_END_NODE_ID, KEY_START_NODE_ID,
};

use crate::SearchError;

/// Name of the JSON field holding caller properties
pub const FIELD_PROPERTIES: &str = "properties";

/// Tokenizers registered by default on every Tantivy index
pub const BUILTIN_TOKENIZERS: &[&str] = &["raw", "default", "whitespace", "en_stem"];

/// Schema field handles for efficient access
#[derive(Debug, Clone)]
pub struct IndexSchema {
    schema: Schema,
    /// Entity id (STRING | STORED)
    pub doc_id: Field,
    /// Relationship start node id (STRING | STORED)
    pub start_node_id: Field,
    /// Relationship end node id (STRING | STORED)
    pub end_node_id: Field,
    /// Caller properties (JSON)
    pub properties: Field,
}

impl IndexSchema {
    /// Get the underlying Tantivy schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Create an IndexSchema from an existing Tantivy Schema
    pub fn from_schema(schema: Schema) -> Result<Self, SearchError> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|_| SearchError::SchemaMismatch(format!("missing {} field", name)))
        };
        let doc_id = field(KEY_DOC_ID)?;
        let start_node_id = field(KEY_START_NODE_ID)?;
        let end_node_id = field(KEY_END_NODE_ID)?;
        let properties = field(FIELD_PROPERTIES)?;

        Ok(Self {
            schema,
            doc_id,
            start_node_id,
            end_node_id,
            properties,
        })
    }

    /// Field for a reserved document key, `None` for caller properties.
    pub fn reserved_field(&self, key: &str) -> Option<Field> {
        match key {
            KEY_DOC_ID => Some(self.doc_id),
            KEY_START_NODE_ID => Some(self.start_node_id),
            KEY_END_NODE_ID => Some(self.end_node_id),
            _ => None,
        }
    }
}

/// Pick the tokenizer for caller properties.
///
/// An explicit `analyzer` wins; otherwise exact indexes use `raw` and
/// fulltext indexes use `default` (lower-casing) or `whitespace`.
pub fn tokenizer_for(config: &IndexConfig) -> Result<&'static str, SearchError> {
    if let Some(analyzer) = config.get(CONFIG_ANALYZER) {
        return BUILTIN_TOKENIZERS
            .iter()
            .find(|t| **t == analyzer)
            .copied()
            .ok_or_else(|| SearchError::UnknownAnalyzer(analyzer.to_string()));
    }
    if !config.is_fulltext() {
        Ok("raw")
    } else if config.to_lower_case() {
        Ok("default")
    } else {
        Ok("whitespace")
    }
}

/// Build the schema for an index with the given config.
pub fn build_index_schema(config: &IndexConfig) -> Result<IndexSchema, SearchError> {
    let tokenizer = tokenizer_for(config)?;
    let mut schema_builder = Schema::builder();

    let doc_id = schema_builder.add_text_field(KEY_DOC_ID, STRING | STORED);
    let start_node_id = schema_builder.add_text_field(KEY_START_NODE_ID, STRING | STORED);
    let end_node_id = schema_builder.add_text_field(KEY_END_NODE_ID, STRING | STORED);

    // Numbers inside the object are indexed natively, strings via the tokenizer
    let indexing = TextFieldIndexing::default()
        .set_tokenizer(tokenizer)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let properties = schema_builder.add_json_field(
        FIELD_PROPERTIES,
        JsonObjectOptions::default().set_indexing_options(indexing),
    );

    Ok(IndexSchema {
        schema: schema_builder.build(),
        doc_id,
        start_node_id,
        end_node_id,
        properties,
    })
}
