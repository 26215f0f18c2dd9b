//! Command implementations for the batch-index tool.
//!
//! Handles:
//! - Settings loading with CLI overrides
//! - Bulk import from JSON lines into the store and indexes
//! - Exact lookups against built indexes
//! - Listing persisted index configs

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use batch_index_core::{BatchIndexRegistry, IndexHandle};
use batch_index_search::{index_dir, TantivyEngine, TantivyIndexConfig};
use batch_index_storage::Storage;
use batch_index_types::{
    EntityStore, IndexConfig, IndexConfigStore, IndexEngine, IndexError, IndexIdentifier,
    IndexKind, PropertyValue, RelationshipId, Settings, ValueEncoding,
};

/// One line of an import file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum ImportRecord {
    Node {
        id: u64,
        #[serde(default)]
        indexes: Vec<IndexEntry>,
    },
    Relationship {
        id: u64,
        start_node: u64,
        end_node: u64,
        #[serde(default)]
        indexes: Vec<IndexEntry>,
    },
}

/// Properties to index for an entity in one named index.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    #[serde(default)]
    pub config: Option<IndexConfig>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    /// Property keys to index as numbers
    #[serde(default)]
    pub numeric: Vec<String>,
}

impl IndexEntry {
    fn encoded_properties(&self) -> Result<Vec<(String, ValueEncoding)>> {
        for key in &self.numeric {
            if !self.properties.contains_key(key) {
                bail!("numeric key '{}' is not a property of index '{}'", key, self.name);
            }
        }
        self.properties
            .iter()
            .map(|(key, value)| -> Result<(String, ValueEncoding)> {
                let encoded = ValueEncoding::new(value.clone());
                let encoded = if self.numeric.contains(key) {
                    encoded.index_numeric()?
                } else {
                    encoded
                };
                Ok((key.clone(), encoded))
            })
            .collect()
    }
}

/// Counts reported after an import.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub nodes: u64,
    pub relationships: u64,
    /// Documents added per index, keyed by `kind:name`
    pub documents: BTreeMap<String, u64>,
    /// Index entries skipped because of a config conflict
    pub conflicts: u64,
}

/// Load settings and apply CLI overrides (highest precedence).
pub fn load_settings(
    config_path: Option<&str>,
    log_level: Option<&str>,
    store_path: Option<&str>,
    index_path: Option<&str>,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    if let Some(path) = store_path {
        settings.store_path = path.to_string();
    }
    if let Some(path) = index_path {
        settings.index_path = path.to_string();
    }
    Ok(settings)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over settings.
pub fn init_tracing(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

type Registry = BatchIndexRegistry<TantivyEngine, Storage>;

fn open_storage(settings: &Settings) -> Result<Storage> {
    let path = settings.store_path();
    let storage = Storage::open(&path)
        .with_context(|| format!("Failed to open store at {:?}", path))?
        .with_default_template(settings.default_template());
    Ok(storage)
}

fn open_registry(settings: &Settings, storage: Storage) -> Registry {
    let config =
        TantivyIndexConfig::new(settings.index_path()).with_memory_mb(settings.writer_memory_mb);
    BatchIndexRegistry::new(TantivyEngine::new(config), storage)
}

fn open_index<'r, E, S>(
    registry: &'r mut BatchIndexRegistry<E, S>,
    kind: IndexKind,
    name: &str,
    config: Option<&IndexConfig>,
) -> Result<IndexHandle<'r>, IndexError>
where
    E: IndexEngine,
    S: EntityStore + IndexConfigStore,
{
    match kind {
        IndexKind::Node => registry.node_index(name, config),
        IndexKind::Relationship => registry.relationship_index(name, config),
    }
}

/// Store and index every record of a JSON lines file.
///
/// Relationship records must follow the records of their endpoint nodes.
/// A config conflict skips that index entry; any other error aborts.
pub fn run_import(settings: &Settings, input: &Path) -> Result<ImportSummary> {
    let file = File::open(input).with_context(|| format!("Failed to open {:?}", input))?;
    let mut registry = open_registry(settings, open_storage(settings)?);
    let mut summary = ImportSummary::default();

    info!(input = ?input, "Starting import");
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", number + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ImportRecord = serde_json::from_str(&line)
            .with_context(|| format!("Invalid record on line {}", number + 1))?;
        import_record(&mut registry, record, &mut summary)
            .with_context(|| format!("Failed to import line {}", number + 1))?;
    }

    registry.store().flush().context("Failed to flush store")?;
    registry.shutdown().context("Failed to close indexes")?;

    info!(
        nodes = summary.nodes,
        relationships = summary.relationships,
        indexes = summary.documents.len(),
        conflicts = summary.conflicts,
        "Import complete"
    );
    Ok(summary)
}

fn import_record(
    registry: &mut Registry,
    record: ImportRecord,
    summary: &mut ImportSummary,
) -> Result<()> {
    let (kind, id, indexes) = match record {
        ImportRecord::Node { id, indexes } => {
            registry.store().put_node(id)?;
            summary.nodes += 1;
            (IndexKind::Node, id, indexes)
        }
        ImportRecord::Relationship {
            id,
            start_node,
            end_node,
            indexes,
        } => {
            registry
                .store()
                .put_relationship(&RelationshipId::new(id, start_node, end_node))?;
            summary.relationships += 1;
            (IndexKind::Relationship, id, indexes)
        }
    };

    for entry in indexes {
        let properties = entry.encoded_properties()?;
        let mut index = match open_index(registry, kind, &entry.name, entry.config.as_ref()) {
            Ok(index) => index,
            Err(e) if e.is_index_scoped() => {
                warn!(index = %entry.name, entity = id, error = %e, "Skipping index entry");
                summary.conflicts += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        index.add(id, properties)?;
        *summary
            .documents
            .entry(index.identifier().to_string())
            .or_insert(0) += 1;
    }
    Ok(())
}

/// Parse a lookup value from the command line.
pub fn lookup_value(raw: &str, numeric: bool) -> Result<ValueEncoding> {
    if !numeric {
        return Ok(ValueEncoding::new(raw));
    }
    let value = match raw.parse::<i64>() {
        Ok(v) => PropertyValue::Int(v),
        Err(_) => PropertyValue::Float(
            raw.parse::<f64>()
                .with_context(|| format!("'{}' is not a number", raw))?,
        ),
    };
    Ok(ValueEncoding::numeric(value)?)
}

/// Exact lookup of entity ids in an existing index.
pub fn run_get(
    settings: &Settings,
    kind: IndexKind,
    index: &str,
    key: &str,
    value: ValueEncoding,
) -> Result<Vec<u64>> {
    let storage = open_storage(settings)?;
    let Some(config) = storage.get_index_config(index)? else {
        bail!("No index named '{}'", index);
    };
    // Opening a missing index would create it
    let dir = index_dir(&settings.index_path(), &IndexIdentifier::new(kind, index, config));
    if !dir.join("meta.json").exists() {
        bail!("No {} index named '{}'", kind, index);
    }

    let mut registry = open_registry(settings, storage);
    let ids = open_index(&mut registry, kind, index, None)?.get(key, value)?;
    registry.shutdown().context("Failed to close indexes")?;
    Ok(ids)
}

/// All persisted index configs, ordered by name.
pub fn list_configs(settings: &Settings) -> Result<Vec<(String, IndexConfig)>> {
    let storage = open_storage(settings)?;
    Ok(storage.index_configs()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn test_settings(temp_dir: &TempDir) -> Settings {
        Settings {
            store_path: temp_dir.path().join("store").to_string_lossy().to_string(),
            index_path: temp_dir.path().join("index").to_string_lossy().to_string(),
            ..Settings::default()
        }
    }

    fn write_input(temp_dir: &TempDir, lines: &[&str]) -> std::path::PathBuf {
        let path = temp_dir.path().join("input.jsonl");
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    #[test]
    fn test_import_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let settings = test_settings(&temp_dir);
        let input = write_input(
            &temp_dir,
            &[
                r#"{"entity":"node","id":1,"indexes":[{"name":"people","properties":{"name":"Alice","age":30},"numeric":["age"]}]}"#,
                r#"{"entity":"node","id":2,"indexes":[{"name":"people","properties":{"name":"Bob","age":41},"numeric":["age"]}]}"#,
                "",
                r#"{"entity":"relationship","id":7,"start_node":1,"end_node":2,"indexes":[{"name":"knows","properties":{"since":"2020"}}]}"#,
            ],
        );

        let summary = run_import(&settings, &input).unwrap();
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.relationships, 1);
        assert_eq!(summary.documents.get("node:people"), Some(&2));
        assert_eq!(summary.documents.get("relationship:knows"), Some(&1));
        assert_eq!(summary.conflicts, 0);

        let ids = run_get(
            &settings,
            IndexKind::Node,
            "people",
            "name",
            lookup_value("Bob", false).unwrap(),
        )
        .unwrap();
        assert_eq!(ids, vec![2]);

        let ids = run_get(
            &settings,
            IndexKind::Node,
            "people",
            "age",
            lookup_value("30", true).unwrap(),
        )
        .unwrap();
        assert_eq!(ids, vec![1]);

        let ids = run_get(
            &settings,
            IndexKind::Relationship,
            "knows",
            "_start_node_id_",
            lookup_value("1", false).unwrap(),
        )
        .unwrap();
        assert_eq!(ids, vec![7]);

        let names: Vec<String> = list_configs(&settings)
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["knows".to_string(), "people".to_string()]);
    }

    #[test]
    fn test_import_skips_conflicting_config() {
        let temp_dir = TempDir::new().unwrap();
        let settings = test_settings(&temp_dir);
        let input = write_input(
            &temp_dir,
            &[
                r#"{"entity":"node","id":1,"indexes":[{"name":"docs","config":{"type":"fulltext"},"properties":{"text":"a"}}]}"#,
                r#"{"entity":"node","id":2,"indexes":[{"name":"docs","config":{"type":"exact"},"properties":{"text":"b"}}]}"#,
            ],
        );

        let summary = run_import(&settings, &input).unwrap();
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.conflicts, 1);
        assert_eq!(summary.documents.get("node:docs"), Some(&1));
    }

    #[test]
    fn test_import_missing_endpoint_fails() {
        let temp_dir = TempDir::new().unwrap();
        let settings = test_settings(&temp_dir);
        let input = write_input(
            &temp_dir,
            &[r#"{"entity":"relationship","id":7,"start_node":1,"end_node":2}"#],
        );

        let err = run_import(&settings, &input).unwrap_err();
        assert!(format!("{:#}", err).contains("line 1"));
    }

    #[test]
    fn test_numeric_key_must_be_property() {
        let entry = IndexEntry {
            name: "people".to_string(),
            config: None,
            properties: BTreeMap::new(),
            numeric: vec!["age".to_string()],
        };
        assert!(entry.encoded_properties().is_err());
    }

    #[test]
    fn test_numeric_on_text_property_fails() {
        let entry = IndexEntry {
            name: "people".to_string(),
            config: None,
            properties: [("name".to_string(), PropertyValue::from("Alice"))]
                .into_iter()
                .collect(),
            numeric: vec!["name".to_string()],
        };
        let err = entry.encoded_properties().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IndexError>(),
            Some(IndexError::InvalidValueKind { .. })
        ));
    }

    #[test]
    fn test_lookup_value() {
        assert!(!lookup_value("42", false).unwrap().is_numeric());
        assert!(lookup_value("42", true).unwrap().is_numeric());
        assert!(lookup_value("2.5", true).unwrap().is_numeric());
        assert!(lookup_value("abc", true).is_err());
    }

    #[test]
    fn test_get_wrong_kind_does_not_create_index() {
        let temp_dir = TempDir::new().unwrap();
        let settings = test_settings(&temp_dir);
        let input = write_input(
            &temp_dir,
            &[r#"{"entity":"node","id":1,"indexes":[{"name":"people","properties":{"name":"Alice"}}]}"#],
        );
        run_import(&settings, &input).unwrap();

        let err = run_get(
            &settings,
            IndexKind::Relationship,
            "people",
            "name",
            ValueEncoding::new("Alice"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("relationship"));
        assert!(!settings.index_path().join("relationship").exists());
    }

    #[test]
    fn test_get_unknown_index() {
        let temp_dir = TempDir::new().unwrap();
        let settings = test_settings(&temp_dir);
        let err = run_get(
            &settings,
            IndexKind::Node,
            "missing",
            "k",
            ValueEncoding::new("v"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
