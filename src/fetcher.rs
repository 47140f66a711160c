//! # Repository Fetcher
//!
//! Runs one repository search, drains every result page into memory and,
//! when asked, attaches each repository's language breakdown.
//!
//! ## Failure behavior
//!
//! - A failing search, or a failing result page, aborts the fetch.
//! - A failing language lookup only affects that repository: its language
//!   map is left empty and the failure is logged. The one exception is a
//!   rate-limited lookup, which aborts the fetch since every further lookup
//!   would be refused as well.
//!
//! Language lookups run in parallel on a bounded rayon pool. The output keeps
//! the order the search API returned.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::error::{Error, FetchStage, Result};
use crate::github::{RepositoryApi, SearchQuery};
use crate::model::RepositoryRecord;

/// Default number of concurrent language lookups.
pub const DEFAULT_ENRICHMENT_WORKERS: usize = 4;

/// Fetches repositories through a [`RepositoryApi`].
pub struct RepositoryFetcher<'a> {
    api: &'a dyn RepositoryApi,
    workers: usize,
}

impl<'a> RepositoryFetcher<'a> {
    pub fn new(api: &'a dyn RepositoryApi) -> Self {
        Self {
            api,
            workers: DEFAULT_ENRICHMENT_WORKERS,
        }
    }

    /// Sets the number of concurrent language lookups. Zero is treated as one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Runs the search and returns every repository it yields, in API order.
    ///
    /// With `enrich_languages`, every record carries a language map (possibly
    /// empty). Without it, every record's language map is `None`.
    pub fn fetch(&self, query: &SearchQuery, enrich_languages: bool) -> Result<Vec<RepositoryRecord>> {
        if query.owner.trim().is_empty() {
            return Err(Error::Config {
                message: "an owner is required to search repositories".to_string(),
                hint: Some("Set 'org' in the inventory source".to_string()),
            });
        }

        let stream = self.api.search_repositories(query)?;
        let mut repos = Vec::new();
        for (count, item) in stream.enumerate() {
            let mut repo = item?;
            debug!("Counter: {} - {}", count + 1, repo.name);
            repo.languages = None;
            repos.push(repo);
        }
        info!(
            "Search '{}' returned {} repositories",
            query.to_query_string(),
            repos.len()
        );

        if enrich_languages {
            repos = self.enrich(repos, &query.owner)?;
        }
        Ok(repos)
    }

    fn enrich(&self, repos: Vec<RepositoryRecord>, owner: &str) -> Result<Vec<RepositoryRecord>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| Error::fetch(FetchStage::Enrichment, e.to_string()))?;

        pool.install(|| {
            repos
                .into_par_iter()
                .map(|mut repo| -> Result<RepositoryRecord> {
                    repo.languages = Some(self.languages_or_empty(owner, &repo)?);
                    Ok(repo)
                })
                .collect()
        })
    }

    fn languages_or_empty(&self, owner: &str, repo: &RepositoryRecord) -> Result<BTreeMap<String, u64>> {
        match self.api.languages(owner, repo) {
            Ok(languages) => Ok(languages),
            Err(e) if e.fetch_stage() == Some(FetchStage::RateLimited) => Err(e),
            Err(e) => {
                warn!("Language lookup failed for {}, leaving it without languages: {}", repo.name, e);
                Ok(BTreeMap::new())
            }
        }
    }
}
