//! Offline check runner behind the `tac` binary
//!
//! For each discovered project: pick the latest results directory, load the
//! topology, assertion files and summary files, validate counters, check
//! every assertion and collect a [`ProjectReport`].

use super::assertions::{AssertionSet, AssertionState};
use super::config::TacConfig;
use super::counters::CounterSet;
use super::error::TacResult;
use super::project::{self, Project, ProjectError};
use super::report::{ProjectReport, ProjectStatus, RunReport};
use super::samples::{SampleProvider, SummaryDirectory};
use std::path::{Path, PathBuf};

/// Parameters of one checker run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directories searched for projects
    pub folders: Vec<PathBuf>,
    /// File listing more directories to search
    pub test_list: Option<PathBuf>,
    /// Search depth, defaults to the configured depth
    pub depth: Option<usize>,
}

/// Every project named by the run parameters, in argument order
pub fn collect_projects(run: &RunConfig, config: &TacConfig) -> TacResult<Vec<PathBuf>> {
    let depth = run.depth.unwrap_or(config.max_depth);
    let mut roots = run.folders.clone();
    if let Some(list) = &run.test_list {
        roots.extend(project::read_test_list(list)?);
    }

    let mut projects = Vec::new();
    for root in &roots {
        for found in project::discover_projects(root, depth, config)? {
            if !projects.contains(&found) {
                projects.push(found);
            }
        }
    }
    if projects.is_empty() {
        return Err(ProjectError::NoProjects.into());
    }

    log::debug!("The following folders have been added to execution list:");
    for dir in &projects {
        log::debug!("{}", dir.display());
    }
    Ok(projects)
}

/// Check one project; setup errors abort the project, not the run
pub fn check_project(dir: &Path, config: &TacConfig) -> ProjectReport {
    match try_check_project(dir, config) {
        Ok(report) => report,
        Err(e) => {
            log::error!("{}", e);
            ProjectReport::aborted(dir.display().to_string(), e)
        }
    }
}

fn try_check_project(dir: &Path, config: &TacConfig) -> TacResult<ProjectReport> {
    let opened = Project::open(dir, config)?;
    log::info!("Checking project {}", opened.name());
    let topology = opened.topology()?;

    let logs_clean = project::check_port_logs(&opened.results_dir)?;

    let files = AssertionSet::discover_files(dir, config)?;
    let mut set = AssertionSet::load_files(&files);

    let history =
        SummaryDirectory::new(&opened.results_dir).load_history(&set.referenced_counters())?;

    let catalog = match &config.counters_file {
        Some(path) if path.is_file() => CounterSet::from_file(path)?,
        _ => CounterSet::from_history(&history),
    };
    set.validate_counters(&catalog);

    set.check(&topology, &history)?;

    let mut failures: Vec<String> = set
        .assertions()
        .iter()
        .filter_map(|a| match a.state() {
            AssertionState::Failed { message } => Some(message.clone()),
            _ => None,
        })
        .collect();
    if !logs_clean {
        failures.push("Port logs contain error records".to_string());
    }
    let load_failures: Vec<String> = set
        .load_failures()
        .iter()
        .map(|f| f.error.to_string())
        .collect();

    let files = set.statistics();
    for stats in &files {
        log::info!(
            "Statistics for {}: Total: {}, Passed: {}, Failed: {}, Ignored: {}",
            stats.file,
            stats.total(),
            stats.passed,
            stats.failed,
            stats.ignored
        );
    }

    let status = if set.passed() && logs_clean {
        ProjectStatus::Passed
    } else {
        ProjectStatus::Failed
    };

    Ok(ProjectReport {
        project: dir.display().to_string(),
        results_dir: Some(opened.results_dir.display().to_string()),
        status,
        files,
        failures,
        load_failures,
        error: None,
    })
}

/// Check every project of the run
pub fn run(run: &RunConfig, config: &TacConfig) -> TacResult<RunReport> {
    let projects = collect_projects(run, config)?;
    log::info!("Number of tests to check: {}", projects.len());

    let mut report = RunReport::new();
    for dir in &projects {
        log::info!("Checking {}", dir.display());
        let project = check_project(dir, config);
        match project.status {
            ProjectStatus::Passed => log::info!("\"{}\" passed", dir.display()),
            ProjectStatus::Failed => log::info!("\"{}\" failed", dir.display()),
            ProjectStatus::Aborted => log::info!("\"{}\" aborted", dir.display()),
        }
        report.add_project(project);
    }
    report.finish();

    log::info!("\tTotal attempted: {}", report.summary.total);
    log::info!("\tTotal passed:    {}", report.summary.passed);
    log::info!("\tTotal aborted:   {}", report.summary.aborted);
    log::info!("\tTotal failed:    {}", report.summary.failed);
    Ok(report)
}
