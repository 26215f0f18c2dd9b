//! Read-only entity lookups and the persisted index config table.

use crate::entity::RelationshipId;
use crate::error::IndexError;
use crate::identifier::{IndexConfig, CONFIG_PROVIDER, CONFIG_TYPE, TYPE_EXACT};

/// Provider name written into every default template.
pub const DEFAULT_PROVIDER: &str = "tantivy";

/// The template new index configs start from.
pub fn default_config_template() -> IndexConfig {
    IndexConfig::new()
        .with(CONFIG_PROVIDER, DEFAULT_PROVIDER)
        .with(CONFIG_TYPE, TYPE_EXACT)
}

/// Entity storage consulted while building documents. Never mutated.
pub trait EntityStore {
    fn node_exists(&self, id: u64) -> Result<bool, IndexError>;

    /// Endpoints of a relationship, `None` if unknown.
    fn relationship(&self, id: u64) -> Result<Option<RelationshipId>, IndexError>;
}

/// Named index configurations and the defaults template.
pub trait IndexConfigStore {
    fn stored_config(&self, name: &str) -> Result<Option<IndexConfig>, IndexError>;

    fn store_config(&mut self, name: &str, config: &IndexConfig) -> Result<(), IndexError>;

    fn default_template(&self) -> IndexConfig {
        default_config_template()
    }
}
