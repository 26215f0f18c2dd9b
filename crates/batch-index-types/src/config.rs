//! Settings loading for batch index construction.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/batch-index/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::IndexError;
use crate::identifier::{IndexConfig, CONFIG_TYPE, TYPE_EXACT, TYPE_FULLTEXT};
use crate::store::default_config_template;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the RocksDB entity/config store
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Root directory for index files
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Memory budget per index writer in MB
    #[serde(default = "default_writer_memory_mb")]
    pub writer_memory_mb: usize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Index type used when a caller config does not name one
    #[serde(default = "default_index_type")]
    pub default_index_type: String,
}

fn data_dir(leaf: &str) -> String {
    ProjectDirs::from("", "", "batch-index")
        .map(|p| p.data_local_dir().join(leaf))
        .unwrap_or_else(|| PathBuf::from(".").join(leaf))
        .to_string_lossy()
        .to_string()
}

fn default_store_path() -> String {
    data_dir("store")
}

fn default_index_path() -> String {
    data_dir("index")
}

fn default_writer_memory_mb() -> usize {
    50
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_index_type() -> String {
    TYPE_EXACT.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            index_path: default_index_path(),
            writer_memory_mb: default_writer_memory_mb(),
            log_level: default_log_level(),
            default_index_type: default_index_type(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/batch-index/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (BATCH_INDEX_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, IndexError> {
        let config_dir = ProjectDirs::from("", "", "batch-index")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("store_path", default_store_path())
            .map_err(|e| IndexError::Config(e.to_string()))?
            .set_default("index_path", default_index_path())
            .map_err(|e| IndexError::Config(e.to_string()))?
            .set_default("writer_memory_mb", default_writer_memory_mb() as i64)
            .map_err(|e| IndexError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| IndexError::Config(e.to_string()))?
            .set_default("default_index_type", default_index_type())
            .map_err(|e| IndexError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: BATCH_INDEX_STORE_PATH, BATCH_INDEX_WRITER_MEMORY_MB, ...
        builder = builder.add_source(
            Environment::with_prefix("BATCH_INDEX")
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| IndexError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| IndexError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.writer_memory_mb == 0 {
            return Err(IndexError::Config("writer_memory_mb must be > 0".to_string()));
        }
        if self.default_index_type != TYPE_EXACT && self.default_index_type != TYPE_FULLTEXT {
            return Err(IndexError::Config(format!(
                "default_index_type must be '{}' or '{}', got '{}'",
                TYPE_EXACT, TYPE_FULLTEXT, self.default_index_type
            )));
        }
        Ok(())
    }

    /// Defaults template with the configured index type applied.
    pub fn default_template(&self) -> IndexConfig {
        default_config_template().with(CONFIG_TYPE, self.default_index_type.clone())
    }

    pub fn store_path(&self) -> PathBuf {
        expand_home(&self.store_path)
    }

    pub fn index_path(&self) -> PathBuf {
        expand_home(&self.index_path)
    }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::CONFIG_PROVIDER;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.writer_memory_mb, 50);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.default_index_type, "exact");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_with_defaults() {
        let settings = Settings::load(None).unwrap();
        assert!(settings.writer_memory_mb > 0);
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings::default();
        settings.writer_memory_mb = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.default_index_type = "fuzzy".to_string();
        assert!(matches!(settings.validate(), Err(IndexError::Config(_))));
    }

    #[test]
    fn test_default_template_uses_index_type() {
        let mut settings = Settings::default();
        settings.default_index_type = "fulltext".to_string();
        let template = settings.default_template();
        assert_eq!(template.get(CONFIG_TYPE), Some("fulltext"));
        assert_eq!(template.get(CONFIG_PROVIDER), Some("tantivy"));
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/tmp/x"), PathBuf::from("/tmp/x"));
    }
}
