//! # Cache Command Implementation
//!
//! This module implements the `cache` subcommand, which manages the cached
//! repository lists written when `cache: true` is set in a source.
//!
//! ## Subcommands
//!
//! - **`list`**: Display every cached entry under the cache directory
//! - **`clear`**: Remove the entry of the configured source, or all entries
//!   with `--all`
//!
//! The cache directory is taken from `--cache-root`, then from the source's
//! `cache_connection`, then from the platform default.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::SystemTime;

use crate::cli::GlobalArgs;
use repo_inventory::cache::{CacheEntry, JsonFileCache};
use repo_inventory::config::{self, InventoryConfig};
use repo_inventory::defaults;

/// Manage cached repository lists
#[derive(Args, Debug)]
pub struct CacheArgs {
    /// The directory holding cached results.
    ///
    /// Overrides `cache_connection` from the inventory source. Can also be
    /// set with the `REPO_INVENTORY_CACHE` environment variable.
    #[arg(long, value_name = "DIR", env = "REPO_INVENTORY_CACHE")]
    pub cache_root: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// List cached entries
    List(ListArgs),
    /// Remove cached entries
    Clear(ClearArgs),
}

/// Arguments for the cache list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the cache clear command
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Remove every entry in the cache directory, not just this source's
    #[arg(long)]
    pub all: bool,
}

/// Execute the `cache` command.
pub fn execute(args: CacheArgs, global: &GlobalArgs) -> Result<()> {
    let source = read_source(global);
    let root = args
        .cache_root
        .clone()
        .or_else(|| source.as_ref().and_then(|c| c.cache_connection.clone()))
        .unwrap_or_else(defaults::default_cache_root);
    let store = JsonFileCache::new(root, None);

    match args.command {
        CacheSubcommand::List(list_args) => execute_list(&store, list_args),
        CacheSubcommand::Clear(clear_args) => execute_clear(&store, source.as_ref(), global, clear_args),
    }
}

/// The source options, if the file can be read. Not validated: clearing a
/// cache must work without a token.
fn read_source(global: &GlobalArgs) -> Option<InventoryConfig> {
    let mut source = match config::from_file(&global.config) {
        Ok(source) => source,
        Err(e) => {
            log::debug!("Cannot read {}: {}", global.config.display(), e);
            return None;
        }
    };
    if let Err(e) = source.apply_env() {
        log::warn!("Ignoring environment overrides: {}", e);
    }
    Some(source)
}

/// Execute the `cache list` command.
fn execute_list(store: &JsonFileCache, args: ListArgs) -> Result<()> {
    let entries = store
        .entries()
        .with_context(|| format!("Failed to read cache directory {}", store.root().display()))?;

    if args.json {
        let json: Vec<serde_json::Value> = entries.iter().map(entry_json).collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No cached inventories found in: {}", store.root().display());
        return Ok(());
    }

    println!("Cached inventories in {}:\n", store.root().display());
    println!("{:<48} {:>12} {:>12}", "KEY", "SIZE", "AGE");
    println!("{}", "-".repeat(74));
    for entry in &entries {
        println!(
            "{:<48} {:>12} {:>12}",
            entry.key,
            format_size(entry.size),
            format_age(entry.modified)
        );
    }
    println!("\nTotal: {} cached inventories", entries.len());
    Ok(())
}

/// Execute the `cache clear` command.
fn execute_clear(
    store: &JsonFileCache,
    source: Option<&InventoryConfig>,
    global: &GlobalArgs,
    args: ClearArgs,
) -> Result<()> {
    if args.all {
        let removed = store
            .clear()
            .with_context(|| format!("Failed to clear cache directory {}", store.root().display()))?;
        println!("Removed {} cached inventories from {}", removed, store.root().display());
        return Ok(());
    }

    let source = source.ok_or_else(|| {
        anyhow::anyhow!(
            "Cannot determine which cache entry to clear: {} is not readable\n\n\
             hint: Use -c/--config to point at the inventory source\n\
             hint: Use --all to remove every cached inventory",
            global.config.display()
        )
    })?;

    let key = source.cache_key(&global.config);
    if store.remove(&key)? {
        println!("Removed cached inventory {}", key);
    } else {
        println!("No cached inventory for {}", global.config.display());
    }
    Ok(())
}

fn entry_json(entry: &CacheEntry) -> serde_json::Value {
    serde_json::json!({
        "key": entry.key,
        "path": entry.path.display().to_string(),
        "size": entry.size,
        "age_secs": age_secs(entry.modified),
    })
}

fn age_secs(modified: Option<SystemTime>) -> Option<u64> {
    modified
        .and_then(|m| SystemTime::now().duration_since(m).ok())
        .map(|d| d.as_secs())
}

fn format_age(modified: Option<SystemTime>) -> String {
    match age_secs(modified) {
        Some(secs) if secs < 60 => format!("{}s", secs),
        Some(secs) if secs < 3600 => format!("{}m", secs / 60),
        Some(secs) if secs < 86400 => format!("{}h", secs / 3600),
        Some(secs) => format!("{}d", secs / 86400),
        None => "(unknown)".to_string(),
    }
}

/// Format bytes into human-readable size
fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_format_age() {
        let now = SystemTime::now();
        assert_eq!(format_age(None), "(unknown)");
        assert_eq!(format_age(Some(now - Duration::from_secs(120))), "2m");
        assert_eq!(format_age(Some(now - Duration::from_secs(3 * 86400 + 5))), "3d");
    }

    #[test]
    fn test_entry_json_fields() {
        let entry = CacheEntry {
            key: "github_repositories_abc".to_string(),
            path: PathBuf::from("/c/github_repositories_abc.json"),
            size: 10,
            modified: None,
        };
        let json = entry_json(&entry);
        assert_eq!(json["key"], "github_repositories_abc");
        assert_eq!(json["size"], 10);
        assert!(json["age_secs"].is_null());
    }
}
