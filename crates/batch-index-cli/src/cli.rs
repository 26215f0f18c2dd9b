//! CLI argument parsing for the batch-index tool.
//!
//! CLI flags override all other config sources.

use std::path::PathBuf;

use batch_index_types::IndexKind;
use clap::{Parser, Subcommand};

/// Batch index construction
///
/// Bulk-loads graph entities into a store and builds their property
/// indexes in one single-threaded session.
#[derive(Parser, Debug)]
#[command(name = "batch-index")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (in addition to ~/.config/batch-index/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override entity store path
    #[arg(long, global = true)]
    pub store_path: Option<String>,

    /// Override index root directory
    #[arg(long, global = true)]
    pub index_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import entities from a JSON lines file and index them
    Import {
        /// Input file, one record per line
        input: PathBuf,
    },

    /// Look up entity ids by exact property value
    Get {
        /// Index kind (node or relationship)
        kind: IndexKind,

        /// Index name
        index: String,

        /// Property key
        key: String,

        /// Property value
        value: String,

        /// Match the value as a number rather than text
        #[arg(long)]
        numeric: bool,
    },

    /// List persisted index configs
    Configs,
}
