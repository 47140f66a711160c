//! # Error Handling
//!
//! This module defines the centralized error type for `repo-inventory`. It
//! uses `thiserror` to build a single `Error` enum that covers every failure
//! the inventory pipeline can hit, from a missing `org` option to a
//! rate-limited search request.
//!
//! ## Fatal and recovered errors
//!
//! Not every variant aborts a run:
//!
//! - **`Config`** and **`Fetch`** with `FetchStage::Search`,
//!   `FetchStage::RateLimited` or `FetchStage::Timeout` are fatal. The binary
//!   reports them once and exits non-zero.
//! - **`Fetch`** with `FetchStage::Enrichment`, **`Classification`**,
//!   **`Population`** and **`Cache`** are recovered where they occur. They are
//!   logged and the run still produces a (possibly partial) inventory.
//!
//! The `Result<T>` alias is used throughout the library.

use std::fmt;

use thiserror::Error;

/// The stage of a repository fetch at which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    /// The search request itself, or one of its result pages.
    Search,
    /// A per-repository language lookup.
    Enrichment,
    /// The API refused the request because the rate limit was exhausted.
    RateLimited,
    /// The request did not complete within the configured timeout.
    Timeout,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            FetchStage::Search => "search",
            FetchStage::Enrichment => "enrichment",
            FetchStage::RateLimited => "rate limited",
            FetchStage::Timeout => "timeout",
        };
        f.write_str(stage)
    }
}

/// Main error type for repo-inventory operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required option is missing or an option has an invalid value.
    ///
    /// Raised before any network call is made.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Config {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A request against the code-hosting API failed.
    #[error("Fetch error ({stage}): {message}")]
    Fetch { stage: FetchStage, message: String },

    /// A repository could not be classified into groups.
    #[error("Classification error for {repository}: {message}")]
    Classification { repository: String, message: String },

    /// The inventory sink rejected a group, host or variable.
    #[error("Population error for {host}: {message}")]
    Population { host: String, message: String },

    /// A cache store read or write failed.
    #[error("Cache operation error: {message}")]
    Cache { message: String },

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON (de)serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Shorthand for a `Fetch` error at the given stage.
    pub fn fetch(stage: FetchStage, message: impl Into<String>) -> Self {
        Error::Fetch {
            stage,
            message: message.into(),
        }
    }

    /// Shorthand for a `Config` error without a hint.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            hint: None,
        }
    }

    /// The fetch stage, when this is a `Fetch` error.
    pub fn fetch_stage(&self) -> Option<FetchStage> {
        match self {
            Error::Fetch { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
