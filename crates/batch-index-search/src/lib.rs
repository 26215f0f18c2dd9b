//! # batch-index-search
//!
//! Tantivy-backed [`IndexEngine`](batch_index_types::IndexEngine) for batch
//! index construction.
//!
//! ## Features
//! - One embedded Tantivy index per identifier, persisted with MmapDirectory
//! - Reserved entity fields stored as exact terms
//! - Caller properties indexed as a JSON object, strings tokenized per the
//!   index config and numbers indexed natively
//! - Lookups see documents once the writer is flushed

pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod schema;
pub mod writer;

pub use document::{to_owned_value, to_tantivy_doc};
pub use engine::TantivyEngine;
pub use error::SearchError;
pub use index::{index_dir, open_or_create_index, TantivyIndexConfig, DEFAULT_WRITER_MEMORY_MB};
pub use schema::{build_index_schema, tokenizer_for, IndexSchema, BUILTIN_TOKENIZERS, FIELD_PROPERTIES};
pub use writer::TantivyIndexWriter;
