//! # Inventory Population
//!
//! Turns fetched repositories into inventory groups, hosts and variables.
//!
//! For every repository that passes the name filter, in input order:
//!
//! 1. classify it into groups;
//! 2. create each group and add the repository's host (its id) to it;
//! 3. set the host variables once: `ansible_host=localhost`,
//!    `ansible_connection=local`, every field of the record, and `team` when
//!    a team topic was found.
//!
//! A derived group name that cannot be used (empty, containing whitespace,
//! or shadowing `_meta` or `all`) is dropped with a warning and the host
//! keeps its other groups. A repository left with no usable group goes into
//! `unassigned`. A repository the sink rejects is logged and skipped; the
//! repositories after it are still populated. Running the same input against the same sink twice leaves it
//! in the same state as running it once.

use log::{debug, warn};

use crate::classify::{ClassificationConfig, ClassificationResult, GroupClassifier, UNASSIGNED_GROUP};
use crate::error::{Error, Result};
use crate::inventory::{validate_group_name, InventorySink};
use crate::model::{HostVar, RepositoryRecord};

/// Outcome of one population pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateReport {
    /// Repositories fully added to the inventory.
    pub populated: usize,
    /// Repositories dropped by the name filter.
    pub skipped: usize,
    /// Group names dropped because they are unusable, with the repository.
    pub dropped_groups: Vec<(String, String)>,
    /// Repositories that failed, with the reason.
    pub failed: Vec<(String, String)>,
}

impl PopulateReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Populates an inventory sink from repositories.
#[derive(Debug)]
pub struct InventoryPopulator {
    classifier: GroupClassifier,
    name_filter: String,
}

impl InventoryPopulator {
    /// `name_filter`, when non-empty, keeps only repositories whose name
    /// starts with it.
    pub fn new(config: &ClassificationConfig, name_filter: Option<&str>) -> Self {
        Self {
            classifier: GroupClassifier::new(config),
            name_filter: name_filter.unwrap_or_default().to_string(),
        }
    }

    fn keeps(&self, repo: &RepositoryRecord) -> bool {
        self.name_filter.is_empty() || repo.name.starts_with(&self.name_filter)
    }

    pub fn populate(&self, repos: &[RepositoryRecord], sink: &mut dyn InventorySink) -> PopulateReport {
        let mut report = PopulateReport::default();
        for repo in repos {
            if !self.keeps(repo) {
                debug!("Skipping {}: name does not start with '{}'", repo.name, self.name_filter);
                report.skipped += 1;
                continue;
            }
            match self.populate_one(repo, sink, &mut report) {
                Ok(groups) => {
                    debug!("Added {} ({}) to {:?}", repo.name, repo.id, groups);
                    report.populated += 1;
                }
                Err(e) => {
                    warn!("Skipping repository {} ({}): {}", repo.name, repo.id, e);
                    report.failed.push((repo.name.clone(), e.to_string()));
                }
            }
        }
        report
    }

    fn populate_one(
        &self,
        repo: &RepositoryRecord,
        sink: &mut dyn InventorySink,
        report: &mut PopulateReport,
    ) -> Result<Vec<String>> {
        let result = self.classifier.classify(repo);
        let host = repo.host_key();
        let groups = usable_groups(repo, &result, report);

        for group in &groups {
            sink.add_group(group).map_err(|e| for_host(e, &host))?;
            sink.add_host(&host, group)?;
        }

        sink.set_variable(&host, "ansible_host", HostVar::from("localhost"))?;
        sink.set_variable(&host, "ansible_connection", HostVar::from("local"))?;
        for (key, value) in repo.host_vars() {
            sink.set_variable(&host, &key, value)?;
        }
        if let Some(team) = result.team() {
            sink.set_variable(&host, "team", HostVar::from(team))?;
        }

        Ok(groups)
    }
}

/// The inventory groups of `result` that are valid group names.
///
/// Runs before the sink is touched. Unusable names are recorded in `report`.
fn usable_groups(repo: &RepositoryRecord, result: &ClassificationResult, report: &mut PopulateReport) -> Vec<String> {
    let mut groups = Vec::new();
    for group in result.inventory_groups() {
        match validate_group_name(&group) {
            Ok(()) => groups.push(group),
            Err(message) => {
                let err = Error::Classification {
                    repository: repo.name.clone(),
                    message,
                };
                warn!("Dropping group of {} ({}): {}", repo.name, repo.id, err);
                report.dropped_groups.push((repo.name.clone(), group));
            }
        }
    }
    if groups.is_empty() {
        groups.push(UNASSIGNED_GROUP.to_string());
    }
    groups
}

/// Attributes a host-less population error to `host`.
fn for_host(err: Error, host: &str) -> Error {
    match err {
        Error::Population { host: h, message } if h.is_empty() => Error::Population {
            host: host.to_string(),
            message,
        },
        other => other,
    }
}

/// Populates `sink` from `repos` with a one-off populator.
pub fn populate(
    repos: &[RepositoryRecord],
    config: &ClassificationConfig,
    name_filter: Option<&str>,
    sink: &mut dyn InventorySink,
) -> PopulateReport {
    InventoryPopulator::new(config, name_filter).populate(repos, sink)
}
