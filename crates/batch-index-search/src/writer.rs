//! Batch writer over a single Tantivy index.
//!
//! Added documents become visible to lookups after `flush`, which commits
//! and reloads the reader.

use std::collections::HashSet;

use tantivy::collector::DocSetCollector;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::tokenizer::{TextAnalyzer, TokenStream};
use tantivy::{DocAddress, Index, IndexReader, ReloadPolicy, TantivyDocument, Term};
use tracing::{debug, info};

use batch_index_types::{Document, IndexError, IndexWriter, Number, ResolvedValue};

use crate::document::to_tantivy_doc;
use crate::error::SearchError;
use crate::schema::IndexSchema;

/// Writer for one index, owned by the batch registry.
pub struct TantivyIndexWriter {
    label: String,
    schema: IndexSchema,
    writer: tantivy::IndexWriter<TantivyDocument>,
    reader: IndexReader,
    analyzer: TextAnalyzer,
    pending: usize,
}

impl TantivyIndexWriter {
    /// Create a writer with the given memory budget.
    pub fn new(
        label: impl Into<String>,
        index: &Index,
        schema: IndexSchema,
        memory_bytes: usize,
    ) -> Result<Self, SearchError> {
        let writer = index.writer(memory_bytes)?;
        // Reload only on flush so lookups see exactly what was flushed
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let analyzer = index.tokenizer_for_field(schema.properties)?;
        let label = label.into();
        debug!(index = %label, memory_bytes, "Created index writer");

        Ok(Self {
            label,
            schema,
            writer,
            reader,
            analyzer,
            pending: 0,
        })
    }

    fn commit(&mut self) -> Result<(), SearchError> {
        self.writer.commit()?;
        self.reader.reload()?;
        debug!(index = %self.label, documents = self.pending, "Committed index");
        self.pending = 0;
        Ok(())
    }

    /// Build the lookup query, `None` when the value cannot match anything.
    fn lookup_query(&self, key: &str, value: &ResolvedValue) -> Option<Box<dyn Query>> {
        if let Some(field) = self.schema.reserved_field(key) {
            let term = Term::from_field_text(field, &value.to_string());
            return Some(Box::new(TermQuery::new(term, IndexRecordOption::Basic)));
        }

        // Keys are indexed as a single path segment, so dots must not split them
        let json_path = key.replace('.', "\\.");
        let path_term = || Term::from_field_json_path(self.schema.properties, &json_path, false);
        macro_rules! numeric_term {
            ($value:expr) => {{
                let mut term = path_term();
                term.append_type_and_fast_value($value);
                term
            }};
        }
        match value {
            ResolvedValue::Text(text) => {
                let mut analyzer = self.analyzer.clone();
                let mut stream = analyzer.token_stream(text);
                let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
                stream.process(&mut |token| {
                    let mut term = path_term();
                    term.append_type_and_str(&token.text);
                    clauses.push((
                        Occur::Must,
                        Box::new(TermQuery::new(term, IndexRecordOption::Basic)),
                    ));
                });
                if clauses.is_empty() {
                    None
                } else {
                    Some(Box::new(BooleanQuery::new(clauses)))
                }
            }
            ResolvedValue::Numeric(number) => {
                // Numbers may be stored under any of the numeric column types
                let mut terms = Vec::new();
                match *number {
                    Number::Int(v) => {
                        terms.push(numeric_term!(v));
                        if let Ok(unsigned) = u64::try_from(v) {
                            terms.push(numeric_term!(unsigned));
                        }
                        terms.push(numeric_term!(v as f64));
                    }
                    Number::Float(v) => {
                        terms.push(numeric_term!(v));
                        if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
                            let integral = v as i64;
                            terms.push(numeric_term!(integral));
                            if let Ok(unsigned) = u64::try_from(integral) {
                                terms.push(numeric_term!(unsigned));
                            }
                        }
                    }
                }
                let clauses: Vec<(Occur, Box<dyn Query>)> = terms
                    .into_iter()
                    .map(|term| {
                        let query: Box<dyn Query> =
                            Box::new(TermQuery::new(term, IndexRecordOption::Basic));
                        (Occur::Should, query)
                    })
                    .collect();
                Some(Box::new(BooleanQuery::new(clauses)))
            }
        }
    }

    fn search(&self, key: &str, value: &ResolvedValue) -> Result<Vec<u64>, SearchError> {
        let Some(query) = self.lookup_query(key, value) else {
            return Ok(Vec::new());
        };

        let searcher = self.reader.searcher();
        let mut addresses: Vec<DocAddress> = searcher
            .search(query.as_ref(), &DocSetCollector)?
            .into_iter()
            .collect();
        addresses.sort();

        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(addresses.len());
        for address in addresses {
            let doc: TantivyDocument = searcher.doc(address)?;
            let id = doc
                .get_first(self.schema.doc_id)
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse::<u64>().ok())
                .ok_or_else(|| {
                    SearchError::CorruptDocument(format!("{:?} has no entity id", address))
                })?;
            if seen.insert(id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

impl IndexWriter for TantivyIndexWriter {
    fn add_document(&mut self, doc: Document) -> Result<(), IndexError> {
        let tantivy_doc = to_tantivy_doc(&self.schema, &doc);
        self.writer
            .add_document(tantivy_doc)
            .map_err(SearchError::from)?;
        self.pending += 1;
        Ok(())
    }

    fn remove_entity(&mut self, entity_id: u64) -> Result<(), IndexError> {
        let term = Term::from_field_text(self.schema.doc_id, &entity_id.to_string());
        self.writer.delete_term(term);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), IndexError> {
        Ok(self.commit()?)
    }

    fn get(&self, key: &str, value: &ResolvedValue) -> Result<Vec<u64>, IndexError> {
        Ok(self.search(key, value)?)
    }

    fn close(mut self: Box<Self>) -> Result<(), IndexError> {
        self.commit()?;
        let TantivyIndexWriter { label, writer, .. } = *self;
        writer
            .wait_merging_threads()
            .map_err(SearchError::from)?;
        info!(index = %label, "Closed index writer");
        Ok(())
    }
}
