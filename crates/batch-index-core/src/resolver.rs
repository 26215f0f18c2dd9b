//! Index configuration resolution.
//!
//! Resolution order for a named index:
//! 1. the store's defaults template
//! 2. caller-supplied entries on top
//! 3. defaults that depend on the result (fulltext case folding)
//!
//! The first resolution of a name is persisted; later requests must
//! resolve to the same config or fail with [`IndexError::ConfigConflict`].

use tracing::debug;

use batch_index_types::{
    IndexConfig, IndexConfigStore, IndexError, CONFIG_TO_LOWER_CASE, CONFIG_TYPE, TYPE_EXACT,
    TYPE_FULLTEXT,
};

/// Resolves caller configs against the stored config table.
pub struct IndexConfigResolver<'s, S: ?Sized> {
    store: &'s mut S,
}

impl<'s, S: IndexConfigStore + ?Sized> IndexConfigResolver<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    /// Produce the canonical config for `name`, persisting it if new.
    ///
    /// `None` accepts whatever is already stored for the name.
    pub fn resolve(
        &mut self,
        name: &str,
        supplied: Option<&IndexConfig>,
    ) -> Result<IndexConfig, IndexError> {
        let resolution = self.check(name, supplied)?;
        if resolution.is_new {
            self.persist(name, &resolution.config)?;
        }
        Ok(resolution.config)
    }

    /// Resolve without writing to the store.
    ///
    /// A new config is only reported; callers persist it with
    /// [`persist`](Self::persist) once the index behind it has opened.
    pub fn check(
        &self,
        name: &str,
        supplied: Option<&IndexConfig>,
    ) -> Result<Resolution, IndexError> {
        validate_name(name)?;

        let stored = self.store.stored_config(name)?;
        match (stored, supplied) {
            (Some(stored), None) => Ok(Resolution::existing(stored)),
            (Some(stored), Some(supplied)) => {
                let resolved = fill_defaults(&self.store.default_template(), Some(supplied))?;
                if resolved != stored {
                    return Err(IndexError::ConfigConflict {
                        name: name.to_string(),
                        supplied: resolved.to_string(),
                        stored: stored.to_string(),
                    });
                }
                Ok(Resolution::existing(stored))
            }
            (None, supplied) => Ok(Resolution {
                config: fill_defaults(&self.store.default_template(), supplied)?,
                is_new: true,
            }),
        }
    }

    /// Record the config for `name`.
    pub fn persist(&mut self, name: &str, config: &IndexConfig) -> Result<(), IndexError> {
        self.store.store_config(name, config)?;
        debug!(index = name, config = %config, "Stored new index config");
        Ok(())
    }
}

/// Outcome of [`IndexConfigResolver::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub config: IndexConfig,
    /// No config was stored for the name yet
    pub is_new: bool,
}

impl Resolution {
    fn existing(config: IndexConfig) -> Self {
        Self {
            config,
            is_new: false,
        }
    }
}

/// Merge `supplied` over `template` and fill dependent defaults.
pub fn fill_defaults(
    template: &IndexConfig,
    supplied: Option<&IndexConfig>,
) -> Result<IndexConfig, IndexError> {
    let mut config = template.clone();
    if let Some(supplied) = supplied {
        config.merge_from(supplied);
    }

    let index_type = config.get(CONFIG_TYPE).map(str::to_string);
    match index_type.as_deref() {
        None => {
            config.insert(CONFIG_TYPE, TYPE_EXACT);
        }
        Some(TYPE_EXACT) => {}
        Some(TYPE_FULLTEXT) => {
            if !config.contains_key(CONFIG_TO_LOWER_CASE) {
                config.insert(CONFIG_TO_LOWER_CASE, "true");
            }
        }
        Some(other) => {
            return Err(IndexError::InvalidConfig(format!(
                "unknown index type '{}', expected '{}' or '{}'",
                other, TYPE_EXACT, TYPE_FULLTEXT
            )));
        }
    }

    Ok(config)
}

/// Index names double as directory names in on-disk engines.
fn validate_name(name: &str) -> Result<(), IndexError> {
    if name.trim().is_empty() {
        return Err(IndexError::InvalidConfig("index name must not be empty".into()));
    }
    if name.contains(['/', '\\', '\0']) || name == "." || name == ".." {
        return Err(IndexError::InvalidConfig(format!(
            "index name '{}' is not a valid path segment",
            name
        )));
    }
    Ok(())
}
