//! Unit tests for summary loading and topology files

use std::collections::BTreeSet;
use tac::tac::samples::{SampleError, SampleProvider, SummaryDirectory};
use tac::tac::topology::{PhysicalPort, Topology, TopologyError};

fn write(dir: &std::path::Path, name: &str, lines: &[&str]) {
    std::fs::write(dir.join(name), lines.join("\n")).unwrap();
}

#[test]
fn test_history_from_summary_files() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "Client Port 1 (10.0.0.1 port 3).sum",
        &[r#"{"x": 1, "y": 9}"#, r#"{"x": 2, "y": 9}"#, r#"{"x": 3, "y": 9}"#],
    );
    write(
        dir.path(),
        "Server Port 1 (10.0.0.1 port 4).summary",
        &[r#"{"x": 10}"#],
    );
    write(dir.path(), "notes.txt", &["ignored"]);

    let counters: BTreeSet<String> = ["x".to_string()].into_iter().collect();
    let history = SummaryDirectory::new(dir.path())
        .load_history(&counters)
        .unwrap();

    let client = PhysicalPort::new(3, "10.0.0.1");
    let server = PhysicalPort::new(4, "10.0.0.1");
    assert_eq!(history.len(), 4);
    assert_eq!(history.value(0, &client, "x"), Some(3.0));
    assert_eq!(history.value(0, &server, "x"), Some(10.0));
    assert_eq!(history.value(2, &client, "x"), Some(2.0));
    // ended stream contributes empty snapshots
    assert_eq!(history.value(2, &server, "x"), Some(0.0));
    // unrequested counters are dropped
    assert!(!history.counter_names().contains("y"));
}

#[test]
fn test_no_summary_files() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        SummaryDirectory::new(dir.path()).load_history(&BTreeSet::new()),
        Err(SampleError::NoSummaryFiles { .. })
    ));
}

#[test]
fn test_bad_summary_line() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "Client Port 1 (10.0.0.1 port 3).sum",
        &[r#"{"x": 1}"#, "not json"],
    );
    match SummaryDirectory::new(dir.path()).load_history(&BTreeSet::new()) {
        Err(SampleError::BadSummaryLine { line, .. }) => assert_eq!(line, 2),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_topology_file() {
    let yaml = "\
ports:
  - kind: server
    number: 2
    appliance: 10.0.0.2
    port: 1
  - kind: client
    number: 1
    appliance: 10.0.0.1
    port: 3
";
    let topology = Topology::from_yaml(yaml).unwrap();
    let labels: Vec<String> = topology
        .mapping()
        .iter()
        .map(|(l, _)| l.label())
        .collect();
    assert_eq!(labels, vec!["sport2", "cport1"]);
    assert_eq!(topology.ports()[1], PhysicalPort::new(3, "10.0.0.1"));
}

#[test]
fn test_topology_duplicates_rejected() {
    let duplicate_logical = "\
ports:
  - {kind: client, number: 1, appliance: 10.0.0.1, port: 3}
  - {kind: client, number: 1, appliance: 10.0.0.1, port: 4}
";
    assert!(matches!(
        Topology::from_yaml(duplicate_logical),
        Err(TopologyError::DuplicateLogicalPort { .. })
    ));

    let bad_address = "ports:\n  - {kind: client, number: 1, appliance: appliance-1, port: 3}\n";
    assert!(matches!(
        Topology::from_yaml(bad_address),
        Err(TopologyError::InvalidAppliance { .. })
    ));
}
