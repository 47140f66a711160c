//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `repo-inventory` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` plus the global
//!   options and performs the command's logic.

pub mod cache;
pub mod host;
pub mod list;

use anyhow::Result;

use crate::cli::GlobalArgs;
use repo_inventory::inventory::Inventory;
use repo_inventory::source;
use repo_inventory::suggestions;

/// Build the inventory for the configured source.
///
/// Library errors come back with user-facing hints attached.
pub(crate) fn build_inventory(global: &GlobalArgs) -> Result<Inventory> {
    source::load_inventory(&global.config, global.refresh_cache)
        .map_err(|e| suggestions::explain(e, &global.config))
}

/// Print a JSON document to stdout.
pub(crate) fn print_json(value: &serde_json::Value, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}
