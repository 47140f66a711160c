//! # GitHub API Access
//!
//! The inventory pipeline talks to the code-hosting platform through the
//! [`RepositoryApi`] trait. It has two operations: a repository search that
//! yields records lazily, page by page, and a per-repository language lookup.
//!
//! [`GitHubClient`] implements the trait against the GitHub REST API using a
//! blocking `reqwest` client. Tests substitute their own implementation.
//!
//! ## Failure classification
//!
//! Every failure is an [`Error::Fetch`] tagged with the stage it happened in.
//! HTTP 429, and HTTP 403 with an exhausted `x-ratelimit-remaining`, are
//! reported as [`FetchStage::RateLimited`]; client timeouts as
//! [`FetchStage::Timeout`]. The client never retries.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::error::{Error, FetchStage, Result};
use crate::model::RepositoryRecord;

/// Results requested per search page. 100 is the API maximum.
pub const PER_PAGE: u32 = 100;

/// The search API never returns more than this many results for one query.
pub const SEARCH_RESULT_LIMIT: u64 = 1000;

const PUBLIC_API: &str = "https://api.github.com/";

/// Sort key of a repository search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchSort {
    /// Most recently updated first.
    #[default]
    Updated,
}

impl fmt::Display for SearchSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchSort::Updated => f.write_str("updated"),
        }
    }
}

/// Parameters of one repository search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-text search terms. May be empty.
    pub query: String,
    /// User or organization owning the repositories.
    pub owner: String,
    pub sort: SearchSort,
    /// When false, archived repositories are excluded.
    pub include_archived: bool,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            owner: owner.into(),
            sort: SearchSort::Updated,
            include_archived: false,
        }
    }

    /// The `q` parameter: search terms followed by qualifiers.
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        let terms = self.query.trim();
        if !terms.is_empty() {
            parts.push(terms.to_string());
        }
        parts.push(format!("user:{}", self.owner));
        if !self.include_archived {
            parts.push("archived:false".to_string());
        }
        parts.join(" ")
    }
}

/// Lazily drained sequence of search results.
pub type RepositoryStream<'a> = Box<dyn Iterator<Item = Result<RepositoryRecord>> + 'a>;

/// Read-only access to the code-hosting platform.
pub trait RepositoryApi: Send + Sync {
    /// Starts a repository search.
    ///
    /// An error here means the search itself failed. Errors yielded by the
    /// stream come from later result pages.
    fn search_repositories(&self, query: &SearchQuery) -> Result<RepositoryStream<'_>>;

    /// Language name to byte count for one repository.
    fn languages(&self, owner: &str, repo: &RepositoryRecord) -> Result<BTreeMap<String, u64>>;
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    total_count: u64,
    #[serde(default)]
    incomplete_results: bool,
    items: Vec<RepositoryRecord>,
}

/// Derives the REST API root from the platform URL.
///
/// `https://github.com/` maps to `https://api.github.com/`; any other host is
/// treated as GitHub Enterprise and gets `/api/v3/` appended.
pub fn api_base_for(platform_url: &str) -> Result<Url> {
    let url = Url::parse(platform_url)?;
    match url.host_str() {
        Some("github.com") | Some("www.github.com") | Some("api.github.com") => {
            Ok(Url::parse(PUBLIC_API)?)
        }
        Some(_) => {
            let path = url.path().trim_end_matches('/');
            let api_path = if path.ends_with("/api/v3") {
                format!("{}/", path)
            } else {
                format!("{}/api/v3/", path)
            };
            let mut api = url.clone();
            api.set_path(&api_path);
            api.set_query(None);
            Ok(api)
        }
        None => Err(Error::Config {
            message: format!("url '{}' has no host", platform_url),
            hint: Some("Use a URL such as https://github.com/".to_string()),
        }),
    }
}

/// Maps an unsuccessful HTTP status to the fetch stage it represents.
///
/// Returns `None` for successful statuses.
pub fn status_stage(
    status: StatusCode,
    ratelimit_remaining: Option<&str>,
    stage: FetchStage,
) -> Option<FetchStage> {
    if status.is_success() {
        return None;
    }
    let exhausted = ratelimit_remaining.map(str::trim) == Some("0");
    if status == StatusCode::TOO_MANY_REQUESTS || (status == StatusCode::FORBIDDEN && exhausted) {
        Some(FetchStage::RateLimited)
    } else {
        Some(stage)
    }
}

fn transport_error(stage: FetchStage, url: &Url, err: reqwest::Error) -> Error {
    let stage = if err.is_timeout() {
        FetchStage::Timeout
    } else {
        stage
    };
    Error::fetch(stage, format!("{}: {}", url, err))
}

/// Blocking GitHub REST client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: Url,
    token: String,
}

impl GitHubClient {
    /// Builds a client for the platform at `platform_url`.
    ///
    /// `timeout` bounds every request, connection included.
    pub fn new(platform_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let api_base = api_base_for(platform_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("repo-inventory/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base,
            token: token.to_string(),
        })
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url, stage: FetchStage) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| transport_error(stage, &url, e))?;

        let status = response.status();
        let remaining = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if let Some(failed) = status_stage(status, remaining.as_deref(), stage) {
            let body = response.text().unwrap_or_default();
            return Err(Error::fetch(
                failed,
                format!("{} returned HTTP {}: {}", url, status.as_u16(), body.trim()),
            ));
        }

        response
            .json::<T>()
            .map_err(|e| transport_error(stage, &url, e))
    }

    fn search_page(&self, q: &str, sort: SearchSort, page: u32) -> Result<SearchPage> {
        let mut url = self.api_base.join("search/repositories")?;
        url.query_pairs_mut()
            .append_pair("q", q)
            .append_pair("sort", &sort.to_string())
            .append_pair("order", "desc")
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", &page.to_string());
        let result: SearchPage = self.get_json(url, FetchStage::Search)?;
        if result.incomplete_results {
            log::warn!("Search results for '{}' page {} are incomplete", q, page);
        }
        Ok(result)
    }
}

impl RepositoryApi for GitHubClient {
    fn search_repositories(&self, query: &SearchQuery) -> Result<RepositoryStream<'_>> {
        let q = query.to_query_string();
        debug!("Searching repositories with q='{}'", q);
        let first = self.search_page(&q, query.sort, 1)?;
        let mut pages = SearchPages {
            client: self,
            q,
            sort: query.sort,
            next_page: None,
            buffer: Vec::new().into_iter(),
            seen: 0,
        };
        pages.accept(1, first);
        Ok(Box::new(pages))
    }

    fn languages(&self, owner: &str, repo: &RepositoryRecord) -> Result<BTreeMap<String, u64>> {
        let url = self
            .api_base
            .join(&format!("repos/{}/languages", repo.full_name(owner)))?;
        self.get_json(url, FetchStage::Enrichment)
    }
}

/// Walks the result pages of one search.
struct SearchPages<'a> {
    client: &'a GitHubClient,
    q: String,
    sort: SearchSort,
    next_page: Option<u32>,
    buffer: std::vec::IntoIter<RepositoryRecord>,
    seen: u64,
}

impl SearchPages<'_> {
    fn accept(&mut self, page: u32, result: SearchPage) {
        let count = result.items.len() as u64;
        self.seen += count;
        let limit = result.total_count.min(SEARCH_RESULT_LIMIT);
        self.next_page = if count < u64::from(PER_PAGE) || self.seen >= limit {
            None
        } else {
            Some(page + 1)
        };
        self.buffer = result.items.into_iter();
    }
}

impl Iterator for SearchPages<'_> {
    type Item = Result<RepositoryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.next() {
                return Some(Ok(record));
            }
            let page = self.next_page.take()?;
            match self.client.search_page(&self.q, self.sort, page) {
                Ok(result) => self.accept(page, result),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
