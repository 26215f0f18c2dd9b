//! Batch index construction tool
//!
//! Bulk-loads graph entities and builds their property indexes before the
//! store is opened for concurrent access.
//!
//! # Usage
//!
//! ```bash
//! batch-index import <INPUT.jsonl>
//! batch-index get <node|relationship> <INDEX> <KEY> <VALUE> [--numeric]
//! batch-index configs
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/batch-index/config.toml)
//! 3. Environment variables (BATCH_INDEX_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use batch_index_cli::{
    init_tracing, list_configs, load_settings, lookup_value, run_get, run_import, Cli, Commands,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(
        cli.config.as_deref(),
        cli.log_level.as_deref(),
        cli.store_path.as_deref(),
        cli.index_path.as_deref(),
    )?;
    init_tracing(&settings)?;

    match cli.command {
        Commands::Import { input } => {
            let summary = run_import(&settings, &input)?;
            println!(
                "Imported {} nodes, {} relationships",
                summary.nodes, summary.relationships
            );
            for (index, documents) in &summary.documents {
                println!("  {}: {} documents", index, documents);
            }
            if summary.conflicts > 0 {
                println!("  skipped {} entries with conflicting config", summary.conflicts);
            }
        }
        Commands::Get {
            kind,
            index,
            key,
            value,
            numeric,
        } => {
            let value = lookup_value(&value, numeric)?;
            for id in run_get(&settings, kind, &index, &key, value)? {
                println!("{}", id);
            }
        }
        Commands::Configs => {
            for (name, config) in list_configs(&settings)? {
                println!("{}\t{}", name, config);
            }
        }
    }

    Ok(())
}
