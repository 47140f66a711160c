//! End-to-end tests for the `cache` command.
//!
//! These tests invoke the actual CLI binary and validate cache command
//! behavior from a user's perspective.

mod common;
use common::prelude::*;

const ENTRY: &str = r#"{"written_at": 0, "value": []}"#;

/// Test that cache --help shows help information
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_cache_help() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["cache", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Manage cached repository lists"));
}

/// Test that cache list on a missing directory reports no entries
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_cache_list_empty() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("cache")
        .arg("--cache-root")
        .arg(fixture.cache_path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached inventories found"));
}

/// Test that cache list shows existing entries
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_cache_list_entries() {
    let fixture = TestFixture::new()
        .with_file("cache/github_repositories_1a2b.json", ENTRY)
        .with_file("cache/github_repositories_3c4d.json", ENTRY);

    fixture
        .command()
        .arg("cache")
        .arg("--cache-root")
        .arg(fixture.cache_path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("github_repositories_1a2b"))
        .stdout(predicate::str::contains("github_repositories_3c4d"))
        .stdout(predicate::str::contains("Total: 2 cached inventories"));
}

/// Test that cache list --json emits an array
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_cache_list_json() {
    let fixture = TestFixture::new().with_file("cache/github_repositories_1a2b.json", ENTRY);

    let output = fixture
        .command()
        .arg("cache")
        .arg("--cache-root")
        .arg(fixture.cache_path())
        .args(["list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["key"], "github_repositories_1a2b");
}

/// Test that cache clear --all removes every entry
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_cache_clear_all() {
    let fixture = TestFixture::new()
        .with_file("cache/github_repositories_1a2b.json", ENTRY)
        .with_file("cache/github_repositories_3c4d.json", ENTRY);

    fixture
        .command()
        .arg("cache")
        .arg("--cache-root")
        .arg(fixture.cache_path())
        .args(["clear", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 cached inventories"));

    fixture
        .child("cache/github_repositories_1a2b.json")
        .assert(predicate::path::missing());
}

/// Test that cache clear without --all needs a readable source
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_cache_clear_without_source() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("cache")
        .arg("--cache-root")
        .arg(fixture.cache_path())
        .arg("clear")
        .assert()
        .failure()
        .stderr(predicate::str::contains("hint: Use --all"));
}

/// Test that cache clear only touches the configured source's entry
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_cache_clear_source_entry() {
    let fixture = TestFixture::new()
        .with_source(sources::MINIMAL)
        .with_file("cache/other_source.json", ENTRY);

    // Without a matching entry nothing is removed
    fixture
        .command()
        .arg("cache")
        .arg("--cache-root")
        .arg(fixture.cache_path())
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached inventory for"));

    fixture
        .child("cache/other_source.json")
        .assert(predicate::path::exists());
}

/// Test that cache clear works for a source without a token
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_cache_clear_does_not_validate_source() {
    let fixture = TestFixture::new().with_source(sources::NO_TOKEN);

    fixture
        .command()
        .arg("cache")
        .arg("--cache-root")
        .arg(fixture.cache_path())
        .arg("clear")
        .assert()
        .success();
}
