//! Default values for repo-inventory configuration.
//!
//! This module provides centralized default values used by the inventory
//! source schema and the CLI, ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Platform URL used when the inventory source does not set `url`.
pub const DEFAULT_URL: &str = "https://github.com/";

/// Inventory source file looked up when `--config` is not given.
pub const DEFAULT_SOURCE_FILE: &str = "github_repositories.yml";

/// Name of this inventory source. Also prefixes its cache keys.
pub const PLUGIN_NAME: &str = "github_repositories";

/// Values of the `plugin` key this tool accepts. Sources written for the
/// Ansible plugin use its full name.
pub const ACCEPTED_PLUGIN_NAMES: [&str; 2] = [PLUGIN_NAME, "github_repositories_inventory"];

/// Seconds a cached repository list stays valid.
pub const DEFAULT_CACHE_TIMEOUT_SECS: u64 = 3600;

/// Seconds a single API request may take.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Returns the default cache root directory.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/repo-inventory` (XDG Base Directory)
/// - macOS: `~/Library/Caches/repo-inventory`
/// - Windows: `{FOLDERID_LocalAppData}\repo-inventory`
///
/// Falls back to `.repo-inventory-cache` in the current directory if the
/// platform cache directory cannot be determined.
///
/// This can be overridden by `cache_connection` in the inventory source.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".repo-inventory-cache"))
        .join("repo-inventory")
}
