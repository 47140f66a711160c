//! # Repository Inventory Library
//!
//! This library discovers the repositories of a GitHub organization, sorts
//! them into groups and publishes them as an Ansible inventory. It is used
//! by the `repo-inventory` dynamic inventory executable but the pipeline
//! pieces can be driven on their own.
//!
//! ## Quick Example
//!
//! ```
//! use repo_inventory::classify::{classify, ClassificationConfig};
//! use repo_inventory::inventory::Inventory;
//! use repo_inventory::model::RepositoryRecord;
//! use repo_inventory::populate::populate;
//!
//! let repos = vec![
//!     RepositoryRecord::new(1u64, "svc-42-deploy").with_topics(["team-platform"]),
//!     RepositoryRecord::new(2u64, "website"),
//! ];
//! let config = ClassificationConfig {
//!     regex_filter: Some(r"(svc)-(\d+)".to_string()),
//!     group_by_languages: false,
//! };
//!
//! let groups = classify(&repos[0], &config);
//! assert!(groups.contains("main-svc"));
//!
//! let mut inventory = Inventory::new();
//! let report = populate(&repos, &config, None, &mut inventory);
//! assert!(report.is_complete());
//! assert_eq!(inventory.hosts_in("team_platform"), ["1"]);
//! assert_eq!(inventory.hosts_in("unassigned"), ["2"]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: The YAML inventory source, environment
//!   overrides and validation.
//! - **Platform access (`github`, `fetcher`)**: The `RepositoryApi` trait, its
//!   HTTP implementation, and the fetcher that drains searches and looks up
//!   languages concurrently.
//! - **Classification (`classify`)**: Team topics, regex captures and
//!   languages become group names.
//! - **Caching (`cache`)**: Cache-or-fetch resolution over a `CacheStore`.
//! - **Population (`inventory`, `populate`)**: Groups, hosts and host
//!   variables written through an `InventorySink`.
//!
//! ## Execution Flow
//!
//! `source::InventorySource::parse` runs one source end to end:
//!
//! 1.  **Resolve**: Return the cached repository list when caching is on and
//!     no refresh was asked for.
//! 2.  **Fetch**: Otherwise search the organization, optionally look up
//!     languages, and store the result.
//! 3.  **Populate**: Classify every repository and add it to the sink.

pub mod cache;
pub mod classify;
pub mod config;
pub mod defaults;
pub mod error;
pub mod fetcher;
pub mod github;
pub mod inventory;
pub mod model;
pub mod populate;
pub mod source;
pub mod suggestions;

#[cfg(test)]
mod classify_proptest;
