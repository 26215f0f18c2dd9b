//! # batch-index-core
//!
//! Index construction for the bulk-load phase of a graph store.
//!
//! ## Key Components
//!
//! - [`IndexConfigResolver`]: merges caller configs with stored defaults
//! - [`BatchIndexRegistry`]: caches one index per [`IndexIdentifier`] and
//!   closes them all on shutdown
//! - [`IndexHandle`]: borrowed access used to add and look up documents
//! - [`MemoryEngine`] / [`MemoryStore`]: in-memory collaborators
//!
//! ## Example
//!
//! ```
//! use batch_index_core::{BatchIndexRegistry, MemoryEngine, MemoryStore};
//! use batch_index_types::{IndexConfig, ValueEncoding};
//!
//! let mut store = MemoryStore::new();
//! store.add_node(1);
//!
//! let mut registry = BatchIndexRegistry::new(MemoryEngine::new(), store);
//! let config = IndexConfig::new().with("type", "exact");
//!
//! let mut people = registry.node_index("people", Some(&config)).unwrap();
//! people
//!     .add(1, [("age", ValueEncoding::numeric(42).unwrap())])
//!     .unwrap();
//! people.flush().unwrap();
//! assert_eq!(people.get("age", ValueEncoding::numeric(42).unwrap()).unwrap(), vec![1]);
//!
//! registry.shutdown().unwrap();
//! ```
//!
//! [`IndexIdentifier`]: batch_index_types::IndexIdentifier

pub mod index;
pub mod memory;
pub mod registry;
pub mod resolver;

pub use index::{BatchIndex, IndexHandle};
pub use memory::{MemoryEngine, MemoryStore};
pub use registry::BatchIndexRegistry;
pub use resolver::{fill_defaults, IndexConfigResolver, Resolution};
