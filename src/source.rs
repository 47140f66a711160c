//! # Inventory Source
//!
//! Ties the pipeline together for one inventory source:
//!
//! 1. resolve the repository list through the cache, fetching on a miss;
//! 2. populate the sink from that list.
//!
//! The platform client and the cache store are injected, so the same code
//! path runs against the real API and file cache in the binary and against
//! mocks in tests. [`load_inventory`] wires up the real collaborators.

use std::path::Path;

use log::{debug, info, warn};

use crate::cache::{self, CacheStore, JsonFileCache};
use crate::config::{self, InventoryConfig};
use crate::error::Result;
use crate::fetcher::RepositoryFetcher;
use crate::github::{GitHubClient, RepositoryApi};
use crate::inventory::{Inventory, InventorySink};
use crate::model::RepositoryRecord;
use crate::populate::{InventoryPopulator, PopulateReport};

/// Cache store holding repository lists.
pub type RepositoryCache = dyn CacheStore<Vec<RepositoryRecord>>;

/// One configured inventory source with its collaborators.
pub struct InventorySource<'a> {
    config: InventoryConfig,
    cache_key: String,
    api: &'a dyn RepositoryApi,
    cache: &'a RepositoryCache,
}

impl<'a> InventorySource<'a> {
    pub fn new(
        config: InventoryConfig,
        cache_key: impl Into<String>,
        api: &'a dyn RepositoryApi,
        cache: &'a RepositoryCache,
    ) -> Self {
        Self {
            config,
            cache_key: cache_key.into(),
            api,
            cache,
        }
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// The repository list, from the cache when allowed.
    ///
    /// `refresh` bypasses the cached value but still stores the fresh one.
    pub fn repositories(&self, refresh: bool) -> Result<Vec<RepositoryRecord>> {
        let fetcher = RepositoryFetcher::new(self.api).with_workers(self.config.enrichment_workers);
        let query = self.config.search_query();
        let enrich = self.config.group_by_languages;

        cache::resolve(
            &self.cache_key,
            refresh,
            self.config.cache,
            || fetcher.fetch(&query, enrich),
            self.cache,
        )
    }

    /// Fills `sink` from this source.
    ///
    /// Fetch errors abort before the sink is touched. Failures of single
    /// repositories are reported in the returned [`PopulateReport`].
    pub fn parse(&self, sink: &mut dyn InventorySink, refresh: bool) -> Result<PopulateReport> {
        let repos = self.repositories(refresh)?;
        let populator = InventoryPopulator::new(&self.config.classification(), self.config.name_filter());
        let report = populator.populate(&repos, sink);

        info!(
            "Populated {} repositories ({} filtered out, {} failed)",
            report.populated,
            report.skipped,
            report.failed.len()
        );
        Ok(report)
    }
}

/// Builds the inventory for the source file at `path` using the platform
/// API and the file cache.
pub fn load_inventory(path: &Path, refresh: bool) -> Result<Inventory> {
    if !config::is_inventory_source(path) {
        warn!(
            "{} does not end with {}; reading it anyway",
            path.display(),
            config::SOURCE_FILE_SUFFIXES.join(" or ")
        );
    }

    let config = config::load(path)?;
    debug!("Loaded inventory source {}: {:?}", path.display(), config);

    let client = GitHubClient::new(&config.url, &config.access_token, config.request_timeout())?;
    let store = JsonFileCache::new(config.cache_dir(), config.cache_ttl());
    let key = config.cache_key(path);

    let source = InventorySource::new(config, key, &client, &store);
    let mut inventory = Inventory::new();
    source.parse(&mut inventory, refresh)?;
    Ok(inventory)
}
