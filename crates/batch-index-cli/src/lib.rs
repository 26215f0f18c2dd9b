//! Batch index construction tool library.
//!
//! Exposes the CLI definition and command implementations so they can be
//! tested without spawning the binary.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    init_tracing, list_configs, load_settings, lookup_value, run_get, run_import, IndexEntry,
    ImportRecord, ImportSummary,
};
