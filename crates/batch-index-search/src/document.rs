//! Conversion from engine-neutral documents to Tantivy documents.

use std::collections::BTreeMap;

use tantivy::schema::OwnedValue;
use tantivy::TantivyDocument;

use batch_index_types::{Document, Number, ResolvedValue};

use crate::schema::IndexSchema;

/// Convert a resolved value to the value Tantivy indexes.
pub fn to_owned_value(value: &ResolvedValue) -> OwnedValue {
    match value {
        ResolvedValue::Text(s) => OwnedValue::Str(s.clone()),
        ResolvedValue::Numeric(Number::Int(v)) => OwnedValue::I64(*v),
        ResolvedValue::Numeric(Number::Float(v)) => OwnedValue::F64(*v),
    }
}

/// Convert a document to a Tantivy document.
///
/// Reserved fields map to their own schema fields; caller properties go
/// into the JSON `properties` object, repeated keys becoming arrays.
pub fn to_tantivy_doc(schema: &IndexSchema, doc: &Document) -> TantivyDocument {
    let mut tantivy_doc = TantivyDocument::default();
    let mut properties: BTreeMap<String, Vec<OwnedValue>> = BTreeMap::new();

    for field in doc.fields() {
        match schema.reserved_field(&field.name) {
            Some(reserved) => tantivy_doc.add_text(reserved, field.value.to_string()),
            None => properties
                .entry(field.name.clone())
                .or_default()
                .push(to_owned_value(&field.value)),
        }
    }

    if !properties.is_empty() {
        let object = properties
            .into_iter()
            .map(|(key, mut values)| {
                let value = if values.len() == 1 {
                    values.remove(0)
                } else {
                    OwnedValue::Array(values)
                };
                (key, value)
            })
            .collect();
        tantivy_doc.add_object(schema.properties, object);
    }

    tantivy_doc
}
