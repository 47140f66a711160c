//! Integration tests for the inventory pipeline.
//!
//! These tests drive `InventorySource` end to end with an in-process API
//! double and the real file cache, then check the rendered Ansible JSON.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use repo_inventory::cache::{CacheStore, JsonFileCache};
use repo_inventory::config;
use repo_inventory::error::{Error, FetchStage, Result};
use repo_inventory::github::{RepositoryApi, RepositoryStream, SearchQuery};
use repo_inventory::inventory::Inventory;
use repo_inventory::model::{HostVar, RepositoryRecord};
use repo_inventory::source::InventorySource;
use serde_json::json;
use tempfile::TempDir;

/// API double serving a fixed organization.
struct FakeOrg {
    repos: Vec<RepositoryRecord>,
    languages: BTreeMap<String, BTreeMap<String, u64>>,
    searches: AtomicUsize,
    queries: Mutex<Vec<String>>,
    rate_limited: bool,
}

impl FakeOrg {
    fn new() -> Self {
        let repos = vec![
            RepositoryRecord::new(101u64, "svc-42-deploy")
                .with_topics(["team-platform", "ansible"])
                .with_field("full_name", "octo-org/svc-42-deploy")
                .with_field("private", true),
            RepositoryRecord::new(102u64, "svc-7-api").with_field("full_name", "octo-org/svc-7-api"),
            RepositoryRecord::new(103u64, "website")
                .with_topics(["team-web"])
                .with_field("full_name", "octo-org/website"),
        ];
        let languages = BTreeMap::from([
            (
                "svc-7-api".to_string(),
                BTreeMap::from([("Go".to_string(), 9000), ("Shell".to_string(), 20)]),
            ),
            ("website".to_string(), BTreeMap::from([("C++".to_string(), 5)])),
        ]);
        Self {
            repos,
            languages,
            searches: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
            rate_limited: false,
        }
    }
}

impl RepositoryApi for FakeOrg {
    fn search_repositories(&self, query: &SearchQuery) -> Result<RepositoryStream<'_>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_query_string());
        Ok(Box::new(self.repos.clone().into_iter().map(Ok)))
    }

    fn languages(&self, _owner: &str, repo: &RepositoryRecord) -> Result<BTreeMap<String, u64>> {
        if self.rate_limited {
            return Err(Error::fetch(FetchStage::RateLimited, "HTTP 429"));
        }
        Ok(self.languages.get(&repo.name).cloned().unwrap_or_default())
    }
}

const SOURCE: &str = r#"
plugin: github_repositories
access_token: test-token
org: octo-org
search_filter: svc
regex_filter: "(svc)-(\\d+)"
group_by_languages: true
cache: true
"#;

fn build(api: &FakeOrg, store: &JsonFileCache, source: &str, refresh: bool) -> Result<Inventory> {
    let cfg = config::parse(source)?;
    cfg.validate()?;
    let source = InventorySource::new(cfg, "github_repositories_test", api, store);
    let mut inventory = Inventory::new();
    source.parse(&mut inventory, refresh)?;
    Ok(inventory)
}

#[test]
fn test_full_pipeline_renders_groups() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileCache::new(temp.path(), None);
    let api = FakeOrg::new();

    let inventory = build(&api, &store, SOURCE, false).unwrap();
    let doc = inventory.to_list_json().unwrap();

    assert_eq!(
        api.queries.lock().unwrap().as_slice(),
        ["svc user:octo-org archived:false"]
    );
    assert_eq!(doc["team_platform"]["hosts"], json!(["101"]));
    assert_eq!(doc["team_web"]["hosts"], json!(["103"]));
    assert_eq!(doc["main_svc"]["hosts"], json!(["101", "102"]));
    assert_eq!(doc["svc"]["hosts"], json!(["101", "102"]));
    assert_eq!(doc["42"]["hosts"], json!(["101"]));
    assert_eq!(doc["7"]["hosts"], json!(["102"]));
    assert_eq!(doc["unassigned"]["hosts"], json!(["102"]));
    assert_eq!(doc["go"]["hosts"], json!(["102"]));
    assert_eq!(doc["c__"]["hosts"], json!(["103"]));

    let children = doc["all"]["children"].as_array().unwrap();
    assert!(children.contains(&json!("team_platform")));
    assert!(children.contains(&json!("unassigned")));

    let vars = &doc["_meta"]["hostvars"]["101"];
    assert_eq!(vars["ansible_host"], "localhost");
    assert_eq!(vars["ansible_connection"], "local");
    assert_eq!(vars["team"], "team-platform");
    assert_eq!(vars["full_name"], "octo-org/svc-42-deploy");
    assert_eq!(vars["private"], true);
    assert_eq!(vars["languages"], json!({}));

    let vars = &doc["_meta"]["hostvars"]["102"];
    assert_eq!(vars["languages"], json!({"Go": 9000, "Shell": 20}));
    assert!(vars.get("team").is_none());
}

#[test]
fn test_second_run_is_served_from_file_cache() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileCache::new(temp.path(), None);
    let api = FakeOrg::new();

    let first = build(&api, &store, SOURCE, false).unwrap();
    assert!(store.entry_path("github_repositories_test").exists());

    let second = build(&api, &store, SOURCE, false).unwrap();
    assert_eq!(api.searches.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);

    build(&api, &store, SOURCE, true).unwrap();
    assert_eq!(api.searches.load(Ordering::SeqCst), 2);
}

#[test]
fn test_cached_records_keep_languages() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileCache::new(temp.path(), None);
    build(&FakeOrg::new(), &store, SOURCE, false).unwrap();

    let cached: Vec<RepositoryRecord> = store.get("github_repositories_test").unwrap().unwrap();
    assert_eq!(cached.len(), 3);
    let api_repo = cached.iter().find(|r| r.name == "svc-7-api").unwrap();
    assert_eq!(api_repo.languages.as_ref().unwrap().get("Go"), Some(&9000));
    assert_eq!(api_repo.extra.get("full_name"), Some(&HostVar::from("octo-org/svc-7-api")));
}

#[test]
fn test_rate_limit_aborts_and_stores_nothing() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileCache::new(temp.path(), None);
    let mut api = FakeOrg::new();
    api.rate_limited = true;

    let err = build(&api, &store, SOURCE, false).unwrap_err();
    assert_eq!(err.fetch_stage(), Some(FetchStage::RateLimited));
    assert!(store.entries().unwrap().is_empty());
}

#[test]
fn test_archived_repositories_and_disabled_cache() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileCache::new(temp.path(), None);
    let api = FakeOrg::new();
    let source = "access_token: t\norg: octo-org\nshow_archived_repos: true\n";

    let inventory = build(&api, &store, source, false).unwrap();
    build(&api, &store, source, false).unwrap();

    assert_eq!(api.queries.lock().unwrap()[0], "user:octo-org");
    assert_eq!(api.searches.load(Ordering::SeqCst), 2);
    assert!(store.entries().unwrap().is_empty());
    assert_eq!(inventory.hosts_in("unassigned"), ["101", "102", "103"]);
    assert!(inventory.host_vars("101").unwrap().get("languages") == Some(&HostVar::Null));
}

#[test]
fn test_name_filter_limits_hosts() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileCache::new(temp.path(), None);
    let source = "access_token: t\norg: octo-org\nname_filter: svc-\n";

    let inventory = build(&FakeOrg::new(), &store, source, false).unwrap();
    assert_eq!(inventory.host_count(), 2);
    assert!(inventory.host_vars("103").is_none());
    assert_eq!(inventory.host_vars_json("103").unwrap(), json!({}));
}
