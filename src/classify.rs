//! # Group Classification
//!
//! Computes the inventory groups a repository belongs to. The rules are
//! applied in a fixed order and accumulate into an ordered set:
//!
//! 1. **Team topic**: the first topic starting with `team-` becomes a group
//!    and the repository's `team`. Without one, the sentinel `unassigned` is
//!    added instead.
//! 2. **Regex filter**: when configured, the pattern is applied to the
//!    repository name. `main-<first capture of first match>` is added, then
//!    every capture of every match.
//! 3. **No regex**: `unassigned` is added when no regex is configured and it
//!    is not already present. A repository with a team topic and no regex
//!    therefore ends up without `unassigned`.
//! 4. **Languages**: with `group_by_languages`, each language of the record
//!    becomes a lowercased, space-free group.
//!
//! Classification never fails. A pattern that does not compile or does not
//! match simply contributes no groups; the problem is logged.
//!
//! The names in a `ClassificationResult` are the raw derived names. Use
//! [`ClassificationResult::inventory_groups`] to get them normalized for the
//! inventory (hyphens become underscores).

use log::{debug, warn};
use regex::Regex;

use crate::error::{Error, Result};
use crate::model::RepositoryRecord;

/// Prefix marking a topic as a team assignment.
pub const TEAM_TOPIC_PREFIX: &str = "team-";

/// Group used when no rule assigns a repository anywhere else.
pub const UNASSIGNED_GROUP: &str = "unassigned";

/// Prefix of the synthetic group built from the first regex capture.
pub const MAIN_GROUP_PREFIX: &str = "main-";

/// Options that drive classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationConfig {
    /// Pattern applied to repository names. Empty or `None` disables it.
    pub regex_filter: Option<String>,
    /// Add one group per language of the repository.
    pub group_by_languages: bool,
}

/// The distinct groups of one repository, in derivation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationResult {
    groups: Vec<String>,
    team: Option<String>,
}

impl ClassificationResult {
    /// Adds a group unless it is already present or empty.
    fn insert(&mut self, group: impl Into<String>) -> bool {
        let group = group.into();
        if group.is_empty() || self.groups.contains(&group) {
            return false;
        }
        self.groups.push(group);
        true
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn contains(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    /// The team topic, if one was found.
    pub fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group names as they go into the inventory: normalized, deduplicated.
    pub fn inventory_groups(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let normalized = normalize_group_name(group);
            if !out.contains(&normalized) {
                out.push(normalized);
            }
        }
        out
    }
}

/// Replaces hyphens with underscores.
pub fn normalize_group_name(name: &str) -> String {
    name.replace('-', "_")
}

/// Derives a group name from a language name.
///
/// Lowercases and drops whitespace ("C Sharp" becomes "csharp"). Characters
/// that are not valid in a group name are replaced with underscores, so "C++"
/// becomes "c__".
pub fn language_group_name(language: &str) -> String {
    language
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

/// Applies the classification rules to repositories.
///
/// The regex is compiled once at construction. An invalid pattern is kept as
/// an error and reported for every repository it would have applied to.
#[derive(Debug)]
pub struct GroupClassifier {
    regex: Option<std::result::Result<Regex, regex::Error>>,
    group_by_languages: bool,
}

impl GroupClassifier {
    pub fn new(config: &ClassificationConfig) -> Self {
        let regex = config
            .regex_filter
            .as_deref()
            .filter(|pattern| !pattern.is_empty())
            .map(Regex::new);

        if let Some(Err(e)) = &regex {
            warn!("Regex filter does not compile, no regex groups will be derived: {}", e);
        }

        Self {
            regex,
            group_by_languages: config.group_by_languages,
        }
    }

    /// Whether a regex filter is configured, valid or not.
    pub fn has_regex(&self) -> bool {
        self.regex.is_some()
    }

    /// Computes the groups of `repo`. Never fails.
    pub fn classify(&self, repo: &RepositoryRecord) -> ClassificationResult {
        let mut result = ClassificationResult::default();

        let team = repo
            .topics
            .iter()
            .find(|topic| topic.starts_with(TEAM_TOPIC_PREFIX))
            .cloned();
        match &team {
            Some(team) => {
                result.insert(team.as_str());
            }
            None => {
                result.insert(UNASSIGNED_GROUP);
            }
        }
        result.team = team;

        if self.has_regex() {
            match self.regex_groups(&repo.name) {
                Ok(groups) => {
                    for group in groups {
                        result.insert(group);
                    }
                }
                Err(e) => debug!("No regex groups for {}: {}", repo.name, e),
            }
        } else {
            result.insert(UNASSIGNED_GROUP);
        }

        if self.group_by_languages {
            if let Some(languages) = &repo.languages {
                for language in languages.keys() {
                    result.insert(language_group_name(language));
                }
            }
        }

        debug!("Groups for {}: {:?}", repo.name, result.groups);
        result
    }

    /// Groups derived from the regex filter for a repository name.
    ///
    /// Returns [`Error::Regex`] when the pattern is invalid and
    /// [`Error::Classification`] when it does not match.
    /// Captures that did not participate in a match, or matched the empty
    /// string, are skipped.
    pub fn regex_groups(&self, name: &str) -> Result<Vec<String>> {
        let regex = match &self.regex {
            Some(Ok(regex)) => regex,
            Some(Err(e)) => return Err(Error::Regex(e.clone())),
            None => return Ok(Vec::new()),
        };

        let matches: Vec<regex::Captures<'_>> = regex.captures_iter(name).collect();
        if matches.is_empty() {
            return Err(Error::Classification {
                repository: name.to_string(),
                message: format!("regex filter '{}' does not match", regex.as_str()),
            });
        }

        let mut groups = Vec::new();
        let first_capture = matches[0]
            .get(1)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty());
        if let Some(first) = first_capture {
            groups.push(format!("{}{}", MAIN_GROUP_PREFIX, first));
        }

        for captures in &matches {
            for capture in captures.iter().skip(1).flatten() {
                if !capture.as_str().is_empty() {
                    groups.push(capture.as_str().to_string());
                }
            }
        }

        Ok(groups)
    }
}

/// Classifies one repository with a one-off classifier.
pub fn classify(repo: &RepositoryRecord, config: &ClassificationConfig) -> ClassificationResult {
    GroupClassifier::new(config).classify(repo)
}
