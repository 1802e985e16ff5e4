//! Unit tests for assertion sets
//!
//! Tests cover:
//! - Loading files and isolating syntax errors
//! - Counter validation against a catalog
//! - Per-file statistics
//! - Fatal arithmetic errors
//! - Assertion file discovery with default and integrity files

use crate::common::*;
use std::path::PathBuf;
use tac::tac::assertions::{AssertionError, AssertionSet};
use tac::tac::config::TacConfig;
use tac::tac::counters::CounterSet;
use tac::tac::report::FileStatistics;

const HTTP_RULES: &str = "\
# http checks
LAST cport1.http.succeeds == cport1.http.attempts
ANY cport1.http.attempts >= 0

LAST cport3.http.attempts == 0
";

fn http_history() -> tac::tac::samples::SampleHistory {
    let port = client_port();
    tac::tac::samples::SampleHistory::new(vec![
        tac::tac::samples::Sample::new()
            .with_counter(&port, "http.attempts", 10.0)
            .with_counter(&port, "http.succeeds", 10.0),
        tac::tac::samples::Sample::new()
            .with_counter(&port, "http.attempts", 4.0)
            .with_counter(&port, "http.succeeds", 3.0),
    ])
}

#[test]
fn test_statistics_per_file() {
    let mut set = AssertionSet::new();
    set.load_source("http.assertions", HTTP_RULES);
    set.load_source("fail.assertions", "LAST cport1.http.succeeds > 10\n");

    set.check(&client_server_topology(), &http_history()).unwrap();

    assert_eq!(
        set.statistics(),
        vec![
            FileStatistics {
                file: "http.assertions".to_string(),
                passed: 2,
                failed: 0,
                ignored: 1,
            },
            FileStatistics {
                file: "fail.assertions".to_string(),
                passed: 0,
                failed: 1,
                ignored: 0,
            },
        ]
    );
    assert!(!set.passed());
}

#[test]
fn test_ignored_assertions_do_not_fail_set() {
    let mut set = AssertionSet::new();
    set.load_source("http.assertions", HTTP_RULES);
    set.check(&client_server_topology(), &http_history()).unwrap();
    assert!(set.passed());
    assert_eq!(set.statistics()[0].total(), 3);
}

#[test]
fn test_referenced_counters() {
    let mut set = AssertionSet::new();
    set.load_source("http.assertions", HTTP_RULES);
    let counters: Vec<String> = set.referenced_counters().into_iter().collect();
    assert_eq!(counters, vec!["http.attempts", "http.succeeds"]);
}

#[test]
fn test_catalog_validation() {
    let mut set = AssertionSet::new();
    set.load_source(
        "http.assertions",
        "LAST http.attempts > 0\nLAST http.bogus > 0\nANY sport.tcp.bogus == 0\n",
    );
    let catalog: CounterSet = vec!["http.attempts".to_string()].into_iter().collect();
    assert_eq!(set.validate_counters(&catalog), 2);

    let stats = &set.statistics()[0];
    assert_eq!((stats.passed, stats.ignored), (1, 2));
}

#[test]
fn test_division_by_zero_aborts_check() {
    let mut set = AssertionSet::new();
    set.load_source("math.assertions", "LAST cport1.http.attempts / 0 > 1\n");
    let err = set
        .check(&client_server_topology(), &http_history())
        .unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("math.assertions:1"));
}

#[test]
fn test_load_failure_keeps_other_files() {
    let mut set = AssertionSet::new();
    set.load_source("broken.assertions", "LAST (x > 1\n");
    set.load_source("http.assertions", HTTP_RULES);
    assert_eq!(set.len(), 3);
    assert_eq!(set.load_failures().len(), 1);
    assert!(matches!(
        &set.load_failures()[0].error,
        AssertionError::InFile { line: 1, .. }
    ));
    assert!(!set.passed());
}

// =============================================================================
// File discovery
// =============================================================================

fn config_with(default: Option<PathBuf>, integrity: Option<PathBuf>) -> TacConfig {
    TacConfig {
        default_assertions: default,
        integrity_assertions: integrity,
        ..TacConfig::default()
    }
}

#[test]
fn test_project_files_replace_default() {
    let home = tempfile::tempdir().unwrap();
    let project = tempfile::tempdir().unwrap();
    let default = home.path().join("default.assertions");
    let integrity = home.path().join("integrity.assertions");
    std::fs::write(&default, "LAST x == 0\n").unwrap();
    std::fs::write(&integrity, "LAST y == 0\n").unwrap();
    std::fs::write(project.path().join("b.assertions"), "LAST x == 0\n").unwrap();
    std::fs::write(project.path().join("a.assertions"), "LAST x == 0\n").unwrap();
    std::fs::write(project.path().join(".hidden.assertions"), "LAST x == 0\n").unwrap();
    std::fs::write(project.path().join("notes.txt"), "").unwrap();

    let config = config_with(Some(default), Some(integrity.clone()));
    let files = AssertionSet::discover_files(project.path(), &config).unwrap();
    assert_eq!(
        files,
        vec![
            integrity,
            project.path().join("a.assertions"),
            project.path().join("b.assertions"),
        ]
    );
}

#[test]
fn test_default_used_without_project_files() {
    let home = tempfile::tempdir().unwrap();
    let project = tempfile::tempdir().unwrap();
    let default = home.path().join("default.assertions");
    std::fs::write(&default, "LAST x == 0\n").unwrap();

    let config = config_with(Some(default.clone()), Some(home.path().join("missing")));
    let files = AssertionSet::discover_files(project.path(), &config).unwrap();
    assert_eq!(files, vec![default]);
}

#[test]
fn test_no_assertion_files_lists_searched_paths() {
    let project = tempfile::tempdir().unwrap();
    let config = config_with(Some(PathBuf::from("/nonexistent/default.assertions")), None);
    match AssertionSet::discover_files(project.path(), &config) {
        Err(AssertionError::NoAssertionFiles { searched }) => {
            assert_eq!(searched.len(), 2);
            assert!(searched[0].ends_with("*.assertions"));
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_load_files_names_by_base_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("http.assertions");
    std::fs::write(&path, HTTP_RULES).unwrap();
    let set = AssertionSet::load_files(&[path, dir.path().join("gone.assertions")]);
    assert_eq!(set.len(), 3);
    assert_eq!(set.assertions()[0].source_file, "http.assertions");
    assert_eq!(set.load_failures()[0].file, "gone.assertions");
}
