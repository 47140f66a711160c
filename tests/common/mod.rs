//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_source(sources::MINIMAL);
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
#[allow(unused_imports)]
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::sources;
    pub use super::TestFixture;
}

/// Inventory source YAML snippets for testing.
#[allow(dead_code)]
pub mod sources {
    /// Minimal valid source.
    pub const MINIMAL: &str = r#"
plugin: github_repositories
access_token: test-token
org: octo-org
"#;

    /// Source pointing at a port nothing listens on.
    pub const UNREACHABLE: &str = r#"
plugin: github_repositories
url: http://127.0.0.1:9/
access_token: test-token
org: octo-org
timeout: 2
"#;

    /// Source without an access token.
    pub const NO_TOKEN: &str = r#"
plugin: github_repositories
org: octo-org
"#;

    /// Source written for another inventory plugin.
    pub const FOREIGN_PLUGIN: &str = r#"
plugin: amazon.aws.aws_ec2
access_token: test-token
org: octo-org
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "org: [unclosed";
}

/// Environment variables the binary reads that must not leak into tests.
#[allow(dead_code)]
pub const ISOLATED_ENV: [&str; 9] = [
    "REPO_INVENTORY_CONFIG",
    "REPO_INVENTORY_CACHE",
    "GITHUB_INVENTORY_URL",
    "GITHUB_INVENTORY_ACCESS_TOKEN",
    "GITHUB_INVENTORY_ORG",
    "GITHUB_INVENTORY_SEARCH_FILTER",
    "GITHUB_INVENTORY_GROUP_BY_LANGUAGES",
    "GITHUB_INVENTORY_REGEX_GROUP_FILTER",
    "GITHUB_INVENTORY_ARCHIVED",
];

/// A temporary directory holding an inventory source and a cache directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `github_repositories.yml` source with the given content.
    pub fn with_source(self, content: &str) -> Self {
        self.temp_dir
            .child("github_repositories.yml")
            .write_str(content)
            .expect("Failed to write inventory source");
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the inventory source.
    pub fn source_path(&self) -> PathBuf {
        self.temp_dir.path().join("github_repositories.yml")
    }

    /// Get the path to the cache directory.
    pub fn cache_path(&self) -> PathBuf {
        self.temp_dir.path().join("cache")
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A command for the binary running in the fixture directory with a
    /// clean environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("repo-inventory");
        cmd.current_dir(self.path());
        for var in ISOLATED_ENV {
            cmd.env_remove(var);
        }
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
