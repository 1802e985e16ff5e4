//! Unit tests for project discovery and results directory selection

use std::path::Path;
use tac::tac::config::TacConfig;
use tac::tac::project::{
    discover_projects, latest_results_dir, read_test_list, Project, ProjectError,
};

fn make_project(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("topology.yaml"), "ports: []\n").unwrap();
}

fn make_results(project: &Path, name: &str, with_summary: bool) {
    let dir = project.join("Results").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    if with_summary {
        std::fs::write(
            dir.join("Client Port 1 (10.0.0.1 port 3).sum"),
            "{\"x\": 1}\n",
        )
        .unwrap();
    }
}

#[test]
fn test_project_is_not_searched_further() {
    let root = tempfile::tempdir().unwrap();
    let outer = root.path().join("outer");
    make_project(&outer);
    make_project(&outer.join("inner"));
    make_project(&root.path().join("second"));

    let found = discover_projects(root.path(), 256, &TacConfig::default()).unwrap();
    assert_eq!(found, vec![outer, root.path().join("second")]);
}

#[test]
fn test_latest_results_with_summaries() {
    let root = tempfile::tempdir().unwrap();
    let project = root.path();
    make_project(project);
    make_results(project, "03_14_2024 09-00-00 AM", true);
    make_results(project, "03_14_2024 01-00-00 PM", true);
    make_results(project, "03_15_2024 08-00-00 AM", false);
    make_results(project, "not a timestamp", true);

    let latest = latest_results_dir(project, &TacConfig::default()).unwrap();
    assert_eq!(latest, project.join("Results").join("03_14_2024 01-00-00 PM"));
}

#[test]
fn test_missing_results_dir() {
    let root = tempfile::tempdir().unwrap();
    make_project(root.path());
    assert!(matches!(
        Project::open(root.path(), &TacConfig::default()),
        Err(ProjectError::NoResultsDir { .. })
    ));
}

#[test]
fn test_read_test_list() {
    let root = tempfile::tempdir().unwrap();
    let a = root.path().join("a");
    let b = root.path().join("b");
    std::fs::create_dir_all(&a).unwrap();
    std::fs::create_dir_all(&b).unwrap();
    let list = root.path().join("tests.list");
    std::fs::write(
        &list,
        format!(
            "# nightly\n{}\n\"{}\"\n {}\n{}\n",
            a.display(),
            b.display(),
            a.display(),
            root.path().join("missing").display()
        ),
    )
    .unwrap();

    assert_eq!(read_test_list(&list).unwrap(), vec![a, b]);
}

#[test]
fn test_project_topology_uses_summary_ports() {
    let root = tempfile::tempdir().unwrap();
    let project = root.path();
    std::fs::write(
        project.join("topology.yaml"),
        "ports:\n  - kind: client\n    number: 1\n    appliance: 10.0.0.1\n    port: 3\n  - kind: server\n    number: 1\n    appliance: 10.0.0.1\n    port: 4\n",
    )
    .unwrap();
    make_results(project, "03_14_2024 09-00-00 AM", true);

    let opened = Project::open(project, &TacConfig::default()).unwrap();
    let topology = opened.topology().unwrap();
    assert_eq!(topology.mapping().len(), 2);
    assert_eq!(topology.ports().len(), 1);
    assert_eq!(topology.ports()[0].number, 3);
}
