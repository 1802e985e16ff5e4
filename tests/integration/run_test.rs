//! End-to-end tests running the checker over projects on disk
//!
//! Each test builds a home directory (config plus default and integrity
//! assertion files) and one or more projects with a topology, a results
//! directory holding per-port summary files and project assertion files.

use std::path::{Path, PathBuf};
use tac::tac::cli::{check_project, run, RunConfig};
use tac::tac::config::TacConfig;
use tac::tac::report::{write_report, OutputFormat, ProjectStatus};

const TOPOLOGY: &str = "\
ports:
  - kind: client
    number: 1
    appliance: 10.0.0.1
    port: 3
  - kind: server
    number: 1
    appliance: 10.0.0.1
    port: 4
";

const RESULTS: &str = "03_14_2024 02-05-09 PM";

struct Fixture {
    _root: tempfile::TempDir,
    home: PathBuf,
    projects: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let home = root.path().join("home");
        let projects = root.path().join("projects");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::create_dir_all(&projects).unwrap();
        std::fs::write(
            home.join("integrity.assertions"),
            "# integrity\nLAST tcp.resets == 0\n",
        )
        .unwrap();
        std::fs::write(
            home.join("default.assertions"),
            "LAST http.succeeds == http.attempts\n",
        )
        .unwrap();
        Self {
            _root: root,
            home,
            projects,
        }
    }

    fn config(&self) -> TacConfig {
        TacConfig {
            default_assertions: Some(self.home.join("default.assertions")),
            integrity_assertions: Some(self.home.join("integrity.assertions")),
            ..TacConfig::default()
        }
    }

    /// Project with client and server summaries, succeeds lagging
    /// attempts by `lag` at the end of the run
    fn project(&self, name: &str, lag: u32, assertions: Option<&str>) -> PathBuf {
        let dir = self.projects.join(name);
        let results = dir.join("Results").join(RESULTS);
        std::fs::create_dir_all(&results).unwrap();
        std::fs::write(dir.join("topology.yaml"), TOPOLOGY).unwrap();
        if let Some(text) = assertions {
            std::fs::write(dir.join("http.assertions"), text).unwrap();
        }

        let client: Vec<String> = (1..=6)
            .map(|i| {
                let succeeds = if i == 6 { i * 10 - lag } else { i * 10 };
                format!(
                    r#"{{"http.attempts": {}, "http.succeeds": {}, "tcp.resets": 0}}"#,
                    i * 10,
                    succeeds
                )
            })
            .collect();
        let server: Vec<String> = (1..=6)
            .map(|i| format!(r#"{{"http.responses": {}, "tcp.resets": 0}}"#, i * 10))
            .collect();
        write_lines(&results.join("Client Port 1 (10.0.0.1 port 3).sum"), &client);
        write_lines(&results.join("Server Port 1 (10.0.0.1 port 4).sum"), &server);
        dir
    }
}

fn write_lines(path: &Path, lines: &[String]) {
    std::fs::write(path, lines.join("\n")).unwrap();
}

#[test]
fn test_default_assertions_pass() {
    let fixture = Fixture::new();
    let project = fixture.project("http_get", 0, None);

    let report = check_project(&project, &fixture.config());
    assert_eq!(report.status, ProjectStatus::Passed);
    let files: Vec<&str> = report.files.iter().map(|f| f.file.as_str()).collect();
    assert_eq!(files, vec!["integrity.assertions", "default.assertions"]);
    assert!(report
        .results_dir
        .as_deref()
        .unwrap()
        .ends_with(RESULTS));
}

#[test]
fn test_project_assertions_fail() {
    let fixture = Fixture::new();
    let project = fixture.project(
        "http_lag",
        3,
        Some(
            "LAST cport1.http.succeeds == cport1.http.attempts\n\
             ANY cport.http.attempts@sec <= 20\n\
             LAST sport1.http.responses == cport1.http.attempts\n\
             LAST cport7.http.attempts > 0\n\
             LAST http.unknown_counter == 0\n",
        ),
    );

    let report = check_project(&project, &fixture.config());
    assert_eq!(report.status, ProjectStatus::Failed);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].contains("cport1.http.succeeds=57"));

    let http = report
        .files
        .iter()
        .find(|f| f.file == "http.assertions")
        .unwrap();
    assert_eq!((http.passed, http.failed, http.ignored), (2, 1, 2));
}

#[test]
fn test_syntax_error_fails_project() {
    let fixture = Fixture::new();
    let project = fixture.project("typo", 0, Some("LAST http.attempts = 60\n"));

    let report = check_project(&project, &fixture.config());
    assert_eq!(report.status, ProjectStatus::Failed);
    assert_eq!(report.load_failures.len(), 1);
    assert!(report.load_failures[0].contains("http.assertions:1"));
}

#[test]
fn test_division_by_zero_aborts_project() {
    let fixture = Fixture::new();
    let project = fixture.project(
        "math",
        0,
        Some("LAST cport1.http.attempts / sport1.http.attempts > 1\n"),
    );

    let report = check_project(&project, &fixture.config());
    assert_eq!(report.status, ProjectStatus::Aborted);
    assert!(report.error.unwrap().contains("Division by zero"));
}

#[test]
fn test_run_over_folder() {
    let fixture = Fixture::new();
    fixture.project("a_pass", 0, None);
    fixture.project("b_fail", 1, None);
    std::fs::create_dir_all(fixture.projects.join("c_not_a_project")).unwrap();

    let run_config = RunConfig {
        folders: vec![fixture.projects.clone()],
        test_list: None,
        depth: None,
    };
    let report = run(&run_config, &fixture.config()).unwrap();
    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.passed, 1);
    assert_eq!(report.summary.failed, 1);
    assert!(!report.passed());

    let mut out = Vec::new();
    write_report(&report, OutputFormat::Text, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Statistics for default.assertions:"));
    assert!(text.contains("\tTotal failed:    1"));
}

#[test]
fn test_no_projects_found() {
    let fixture = Fixture::new();
    let run_config = RunConfig {
        folders: vec![fixture.projects.clone()],
        test_list: None,
        depth: Some(3),
    };
    assert!(run(&run_config, &fixture.config()).is_err());
}

#[test]
fn test_unscoped_counter_uses_first_mapped_port() {
    let fixture = Fixture::new();
    let dir = fixture.projects.join("server_first");
    let results = dir.join("Results").join(RESULTS);
    std::fs::create_dir_all(&results).unwrap();
    std::fs::write(
        dir.join("topology.yaml"),
        "\
ports:
  - kind: server
    number: 1
    appliance: 10.0.0.1
    port: 4
  - kind: client
    number: 1
    appliance: 10.0.0.1
    port: 3
",
    )
    .unwrap();
    std::fs::write(
        dir.join("order.assertions"),
        "LAST cport.a == sport.b & x == 2\n",
    )
    .unwrap();
    write_lines(
        &results.join("Client Port 1 (10.0.0.1 port 3).sum"),
        &[r#"{"a": 1, "x": 1}"#.to_string()],
    );
    write_lines(
        &results.join("Server Port 1 (10.0.0.1 port 4).sum"),
        &[r#"{"b": 1, "x": 2}"#.to_string()],
    );

    let report = check_project(&dir, &fixture.config());
    assert_eq!(report.status, ProjectStatus::Passed, "{:?}", report.failures);
    let order = report
        .files
        .iter()
        .find(|f| f.file == "order.assertions")
        .unwrap();
    assert_eq!((order.passed, order.failed), (1, 0));
}
