//! # Inventory Source Configuration
//!
//! This module defines the schema of the YAML inventory source file and the
//! logic for loading it. A minimal source looks like:
//!
//! ```yaml
//! plugin: github_repositories
//! access_token: ghp_example
//! org: octo-org
//! regex_filter: "(svc)-(\\d+)"
//! group_by_languages: true
//! ```
//!
//! ## Loading order
//!
//! [`load`] reads the file, then applies `GITHUB_INVENTORY_*` environment
//! variables on top of it, then validates the result. Validation happens
//! before any network call, so a missing `org` or `access_token` aborts the
//! run early with a `Config` error.
//!
//! ## Derived values
//!
//! The configuration also knows how to build the pieces the pipeline needs:
//! the [`SearchQuery`], the [`ClassificationConfig`], the cache directory and
//! timeout, and the opaque cache key of the source.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::classify::ClassificationConfig;
use crate::defaults;
use crate::error::{Error, Result};
use crate::fetcher::DEFAULT_ENRICHMENT_WORKERS;
use crate::github::{SearchQuery, SearchSort};
use crate::suggestions;

/// File names recognized as inventory sources.
pub const SOURCE_FILE_SUFFIXES: [&str; 2] = ["github_repositories.yml", "github_repositories.yaml"];

/// Option names accepted in an inventory source.
pub const KNOWN_KEYS: [&str; 15] = [
    "plugin",
    "url",
    "access_token",
    "org",
    "repository_filter",
    "search_filter",
    "name_filter",
    "cache",
    "cache_timeout",
    "cache_connection",
    "regex_filter",
    "group_by_languages",
    "show_archived_repos",
    "timeout",
    "enrichment_workers",
];

/// Environment variables that override file values, by option.
pub mod env_vars {
    pub const URL: &str = "GITHUB_INVENTORY_URL";
    pub const ACCESS_TOKEN: &str = "GITHUB_INVENTORY_ACCESS_TOKEN";
    pub const ORG: &str = "GITHUB_INVENTORY_ORG";
    pub const SEARCH_FILTER: &str = "GITHUB_INVENTORY_SEARCH_FILTER";
    pub const GROUP_BY_LANGUAGES: &str = "GITHUB_INVENTORY_GROUP_BY_LANGUAGES";
    pub const REGEX_FILTER: &str = "GITHUB_INVENTORY_REGEX_GROUP_FILTER";
    pub const ARCHIVED: &str = "GITHUB_INVENTORY_ARCHIVED";
}

/// Options of one inventory source.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Name of the plugin the source is meant for. Must be one of
    /// [`defaults::ACCEPTED_PLUGIN_NAMES`] when present.
    pub plugin: Option<String>,
    /// Base URL of the platform.
    pub url: String,
    /// Personal access token used for every API request.
    pub access_token: String,
    /// Organization (or user) whose repositories are listed.
    pub org: String,
    /// Search terms passed to the repository search.
    #[serde(alias = "search_filter")]
    pub repository_filter: String,
    /// Local name prefix; repositories not starting with it are left out.
    pub name_filter: String,
    /// Reuse results between runs.
    pub cache: bool,
    /// Seconds a cached result stays valid. `0` never expires.
    pub cache_timeout: u64,
    /// Directory holding cached results.
    pub cache_connection: Option<PathBuf>,
    /// Pattern applied to repository names to derive groups.
    pub regex_filter: String,
    /// Look up languages and group repositories by them.
    pub group_by_languages: bool,
    /// Keep archived repositories in the search.
    pub show_archived_repos: bool,
    /// Seconds a single API request may take.
    pub timeout: u64,
    /// Concurrent language lookups.
    pub enrichment_workers: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            plugin: None,
            url: defaults::DEFAULT_URL.to_string(),
            access_token: String::new(),
            org: String::new(),
            repository_filter: String::new(),
            name_filter: String::new(),
            cache: false,
            cache_timeout: defaults::DEFAULT_CACHE_TIMEOUT_SECS,
            cache_connection: None,
            regex_filter: String::new(),
            group_by_languages: false,
            show_archived_repos: false,
            timeout: defaults::DEFAULT_REQUEST_TIMEOUT_SECS,
            enrichment_workers: DEFAULT_ENRICHMENT_WORKERS,
        }
    }
}

impl fmt::Debug for InventoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.access_token.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("InventoryConfig")
            .field("plugin", &self.plugin)
            .field("url", &self.url)
            .field("access_token", &token)
            .field("org", &self.org)
            .field("repository_filter", &self.repository_filter)
            .field("name_filter", &self.name_filter)
            .field("cache", &self.cache)
            .field("cache_timeout", &self.cache_timeout)
            .field("cache_connection", &self.cache_connection)
            .field("regex_filter", &self.regex_filter)
            .field("group_by_languages", &self.group_by_languages)
            .field("show_archived_repos", &self.show_archived_repos)
            .field("timeout", &self.timeout)
            .field("enrichment_workers", &self.enrichment_workers)
            .finish()
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::Config {
            message: format!("{} must be a boolean, got '{}'", name, other),
            hint: Some("Use true or false".to_string()),
        }),
    }
}

impl InventoryConfig {
    /// Overrides options with values from `lookup`, keyed by environment
    /// variable name.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(env_vars::URL) {
            self.url = url;
        }
        if let Some(token) = lookup(env_vars::ACCESS_TOKEN) {
            self.access_token = token;
        }
        if let Some(org) = lookup(env_vars::ORG) {
            self.org = org;
        }
        if let Some(filter) = lookup(env_vars::SEARCH_FILTER) {
            self.repository_filter = filter;
        }
        if let Some(regex) = lookup(env_vars::REGEX_FILTER) {
            self.regex_filter = regex;
        }
        if let Some(value) = lookup(env_vars::GROUP_BY_LANGUAGES) {
            self.group_by_languages = parse_bool(env_vars::GROUP_BY_LANGUAGES, &value)?;
        }
        if let Some(value) = lookup(env_vars::ARCHIVED) {
            self.show_archived_repos = parse_bool(env_vars::ARCHIVED, &value)?;
        }
        Ok(())
    }

    /// Overrides options with the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Checks required options and option values.
    pub fn validate(&self) -> Result<()> {
        if let Some(plugin) = &self.plugin {
            if !defaults::ACCEPTED_PLUGIN_NAMES.contains(&plugin.as_str()) {
                return Err(Error::Config {
                    message: format!("plugin '{}' is not handled by this inventory", plugin),
                    hint: Some(format!("Set 'plugin: {}'", defaults::PLUGIN_NAME)),
                });
            }
        }
        if self.access_token.trim().is_empty() {
            return Err(Error::Config {
                message: "access_token is required".to_string(),
                hint: Some(format!(
                    "Set 'access_token' in the source or {}",
                    env_vars::ACCESS_TOKEN
                )),
            });
        }
        if self.org.trim().is_empty() {
            return Err(Error::Config {
                message: "org is required".to_string(),
                hint: Some(format!("Set 'org' in the source or {}", env_vars::ORG)),
            });
        }
        Url::parse(&self.url).map_err(|e| Error::Config {
            message: format!("url '{}' is invalid: {}", self.url, e),
            hint: Some(format!("Use a URL such as {}", defaults::DEFAULT_URL)),
        })?;
        if self.timeout == 0 {
            return Err(Error::config("timeout must be at least 1 second"));
        }
        Ok(())
    }

    pub fn search_query(&self) -> SearchQuery {
        SearchQuery {
            query: self.repository_filter.clone(),
            owner: self.org.clone(),
            sort: SearchSort::Updated,
            include_archived: self.show_archived_repos,
        }
    }

    pub fn classification(&self) -> ClassificationConfig {
        ClassificationConfig {
            regex_filter: Some(self.regex_filter.clone()).filter(|r| !r.is_empty()),
            group_by_languages: self.group_by_languages,
        }
    }

    /// The local name filter, if set.
    pub fn name_filter(&self) -> Option<&str> {
        Some(self.name_filter.as_str()).filter(|f| !f.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Cache entry lifetime. `None` when entries never expire.
    pub fn cache_ttl(&self) -> Option<Duration> {
        Some(self.cache_timeout)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_connection
            .clone()
            .unwrap_or_else(defaults::default_cache_root)
    }

    /// Opaque cache key of the source at `path`.
    ///
    /// Combines the resolved source path with the options that change what
    /// a fetch returns, so editing any of them invalidates the entry. The key
    /// names a file on disk and must not change between builds, so it is a
    /// SHA-256 digest rather than a `std` hasher.
    pub fn cache_key(&self, path: &Path) -> String {
        let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        let mut hasher = Sha256::new();
        for part in [
            resolved.to_string_lossy().as_ref(),
            self.url.as_str(),
            self.org.as_str(),
            self.repository_filter.as_str(),
            if self.show_archived_repos { "archived" } else { "active" },
            if self.group_by_languages { "languages" } else { "plain" },
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        let digest = hasher.finalize();

        let hex: String = digest[..8].iter().map(|b| format!("{:02x}", b)).collect();
        format!("{}_{}", defaults::PLUGIN_NAME, hex)
    }
}

/// Whether `path` looks like an inventory source for this tool.
pub fn is_inventory_source(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| SOURCE_FILE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)))
}

/// Parse a YAML string into an inventory configuration.
///
/// An empty document yields the defaults.
pub fn parse(yaml_content: &str) -> Result<InventoryConfig> {
    if yaml_content.trim().is_empty() {
        return Ok(InventoryConfig::default());
    }
    Ok(serde_yaml::from_str(yaml_content)?)
}

/// Top-level keys of `yaml_content` that are not inventory options.
pub fn unknown_keys(yaml_content: &str) -> Result<Vec<String>> {
    if yaml_content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mapping: serde_yaml::Mapping = serde_yaml::from_str(yaml_content)?;
    Ok(mapping
        .keys()
        .filter_map(|key| key.as_str())
        .filter(|key| !KNOWN_KEYS.contains(key))
        .map(str::to_string)
        .collect())
}

/// Read and parse an inventory source file, without environment overrides.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<InventoryConfig> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

/// Read a source file, apply the environment and validate.
///
/// Unknown options are logged, not rejected.
pub fn load<P: AsRef<Path>>(path: P) -> Result<InventoryConfig> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    let mut config = parse(&content)?;
    for key in unknown_keys(&content)? {
        warn!("{}", suggestions::unknown_option(&key));
    }
    config.apply_env()?;
    config.validate()?;
    Ok(config)
}
