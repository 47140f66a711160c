//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Errors should tell users what went
//! wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use repo_inventory::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Inventory source not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::config_not_found(path));
//! ```

use std::path::Path;

use crate::config::{env_vars, KNOWN_KEYS};
use crate::error::{Error, FetchStage};

/// Generate an error for when the inventory source file is not found.
///
/// Includes hints about:
/// - Creating a source file
/// - Using the -c/--config flag
/// - Using the REPO_INVENTORY_CONFIG environment variable
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Inventory source not found: {path}\n\n\
         hint: Create a github_repositories.yml file with 'org' and 'access_token'\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set REPO_INVENTORY_CONFIG environment variable",
        path = path.display()
    )
}

/// Generate an error for an exhausted API rate limit.
pub fn rate_limited(message: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "API rate limit exceeded: {message}\n\n\
         hint: Enable 'cache' in the inventory source to reuse earlier results\n\
         hint: Disable 'group_by_languages' to make one request per page instead of per repository\n\
         hint: Wait for the rate limit window to reset and retry"
    )
}

/// Generate an error for a request that did not finish in time.
pub fn request_timeout(message: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Request timed out: {message}\n\n\
         hint: Raise 'timeout' in the inventory source\n\
         hint: Check that 'url' (or {url_var}) points at a reachable server",
        url_var = env_vars::URL
    )
}

/// Generate an error for a failed search.
pub fn search_failed(message: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Repository search failed: {message}\n\n\
         hint: Check that 'access_token' is valid and can read the 'org' repositories\n\
         hint: Check 'repository_filter' for invalid search syntax"
    )
}

/// Generate a warning for an option the inventory source does not know.
///
/// Suggests the closest known option when there is one.
pub fn unknown_option(key: &str) -> anyhow::Error {
    let did_you_mean = find_similar(key, &KNOWN_KEYS)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Unknown option in inventory source: {key}{did_you_mean}\n\n\
         Known options are: {keys}",
        keys = KNOWN_KEYS.join(", ")
    )
}

/// Turn a library error into a user-facing diagnostic.
///
/// `path` is the inventory source being read.
pub fn explain(error: Error, path: &Path) -> anyhow::Error {
    match error {
        Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => config_not_found(path),
        Error::Fetch {
            stage: FetchStage::RateLimited,
            message,
        } => rate_limited(&message),
        Error::Fetch {
            stage: FetchStage::Timeout,
            message,
        } => request_timeout(&message),
        Error::Fetch {
            stage: FetchStage::Search,
            message,
        } => search_failed(&message),
        other => anyhow::Error::new(other),
    }
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0usize; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}
