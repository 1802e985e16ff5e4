//! Unit tests for configuration lookup
//!
//! These tests change process environment variables and run serially.

use serial_test::serial;
use std::path::PathBuf;
use tac::tac::config::{tac_home, ConfigError, TacConfig, TAC_HOME_ENV};

#[test]
#[serial]
fn test_tac_home_prefers_env() {
    let previous = std::env::var_os(TAC_HOME_ENV);
    std::env::set_var(TAC_HOME_ENV, "/opt/tac");
    assert_eq!(tac_home(), Some(PathBuf::from("/opt/tac")));
    match previous {
        Some(value) => std::env::set_var(TAC_HOME_ENV, value),
        None => std::env::remove_var(TAC_HOME_ENV),
    }
}

#[test]
#[serial]
fn test_load_from_tac_home() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(
        home.path().join("config.yaml"),
        "max_depth: 4\ncounters_file: counters.txt\n",
    )
    .unwrap();

    let previous = std::env::var_os(TAC_HOME_ENV);
    std::env::set_var(TAC_HOME_ENV, home.path());
    let config = TacConfig::load(None);
    match previous {
        Some(value) => std::env::set_var(TAC_HOME_ENV, value),
        None => std::env::remove_var(TAC_HOME_ENV),
    }

    let config = config.unwrap();
    assert_eq!(config.max_depth, 4);
    assert_eq!(config.counters_file, Some(home.path().join("counters.txt")));
    assert_eq!(
        config.default_assertions,
        Some(home.path().join("default.assertions"))
    );
}

#[test]
#[serial]
fn test_defaults_resolved_against_home() {
    let home = tempfile::tempdir().unwrap();
    let previous = std::env::var_os(TAC_HOME_ENV);
    std::env::set_var(TAC_HOME_ENV, home.path());
    let config = TacConfig::load(None);
    match previous {
        Some(value) => std::env::set_var(TAC_HOME_ENV, value),
        None => std::env::remove_var(TAC_HOME_ENV),
    }

    let config = config.unwrap();
    assert_eq!(config.max_depth, 256);
    assert_eq!(
        config.integrity_assertions,
        Some(home.path().join("integrity.assertions"))
    );
}

#[test]
fn test_explicit_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.yaml");
    std::fs::write(&path, "results_dir: Runs\ntopology_file: ports.yaml\n").unwrap();

    let config = TacConfig::load(Some(&path)).unwrap();
    assert_eq!(config.results_dir, "Runs");
    assert_eq!(config.topology_file, "ports.yaml");
}

#[test]
fn test_bad_yaml_names_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "max_depth: [not a number\n").unwrap();

    match TacConfig::load(Some(&path)) {
        Err(ConfigError::ParseError { file, .. }) => assert_eq!(file, path),
        other => panic!("unexpected result {:?}", other),
    }
}
