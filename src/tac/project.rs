//! Test project discovery
//!
//! A project is a directory holding a topology file. Each run of a project
//! leaves a timestamped directory under `<project>/Results/`, named like
//! `03_14_2024 02-05-09 PM`, holding the per-port summary and log files.

use super::config::TacConfig;
use super::samples::SummaryDirectory;
use super::topology::Topology;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Deepest directory level searched for projects
pub const MAX_DEPTH: usize = 256;

/// Name format of run results directories
pub const RESULTS_DIR_FORMAT: &str = "%m_%d_%Y %I-%M-%S %p";

/// Errors raised while locating projects and their results
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("No test projects found in arguments paths")]
    NoProjects,

    #[error("Cannot find result directory in {}", .project.display())]
    NoResultsDir { project: PathBuf },

    #[error("IO error for '{}': {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ProjectResult<T> = Result<T, ProjectError>;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ProjectError + '_ {
    move |source| ProjectError::IoError {
        path: path.to_path_buf(),
        source,
    }
}

/// Whether `path` is a project directory
pub fn is_project(path: &Path, config: &TacConfig) -> bool {
    path.join(&config.topology_file).is_file()
}

/// Projects at or below `path`.
///
/// A project directory is not searched further. `depth == 0` only tests
/// `path` itself; larger depths are capped at [`MAX_DEPTH`].
pub fn discover_projects(path: &Path, depth: usize, config: &TacConfig) -> ProjectResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    dig(path, depth.min(MAX_DEPTH), config, &mut found)?;
    Ok(found)
}

fn dig(path: &Path, depth: usize, config: &TacConfig, found: &mut Vec<PathBuf>) -> ProjectResult<()> {
    if is_project(path, config) {
        found.push(path.to_path_buf());
        return Ok(());
    }
    if depth == 0 || !path.is_dir() {
        return Ok(());
    }

    let mut subdirs = Vec::new();
    for entry in std::fs::read_dir(path).map_err(io_error(path))? {
        let entry_path = entry.map_err(io_error(path))?.path();
        if entry_path.is_dir() {
            subdirs.push(entry_path);
        }
    }
    subdirs.sort();
    for subdir in subdirs {
        dig(&subdir, depth - 1, config, found)?;
    }
    Ok(())
}

/// Paths listed in a test list file.
///
/// One path per line, optionally quoted. Lines starting with `#` or a space
/// are skipped, as are paths that do not exist.
pub fn read_test_list(path: &Path) -> ProjectResult<Vec<PathBuf>> {
    let content = std::fs::read_to_string(path).map_err(io_error(path))?;
    let mut paths = Vec::new();
    for line in content.lines() {
        if line.is_empty() || line.starts_with('#') || line.starts_with(' ') {
            continue;
        }
        let entry = PathBuf::from(line.trim_end_matches('\r').trim_matches('"'));
        if entry.exists() {
            paths.push(entry);
        } else {
            log::warn!("Test list entry {} does not exist", entry.display());
        }
    }
    Ok(paths)
}

/// Timestamp encoded in a results directory name
pub fn parse_results_timestamp(name: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(name, RESULTS_DIR_FORMAT).ok()
}

/// Most recent results directory of a project that holds summary files
pub fn latest_results_dir(project_dir: &Path, config: &TacConfig) -> ProjectResult<PathBuf> {
    let results = project_dir.join(&config.results_dir);
    let not_found = || ProjectError::NoResultsDir {
        project: project_dir.to_path_buf(),
    };
    if !results.is_dir() {
        return Err(not_found());
    }

    let mut latest: Option<(NaiveDateTime, PathBuf)> = None;
    for entry in std::fs::read_dir(&results).map_err(io_error(&results))? {
        let path = entry.map_err(io_error(&results))?.path();
        let Some(stamp) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_results_timestamp)
        else {
            continue;
        };
        if !path.is_dir() || latest.as_ref().map(|(t, _)| stamp <= *t).unwrap_or(false) {
            continue;
        }
        let has_summaries = SummaryDirectory::new(&path)
            .summary_files()
            .map(|files| !files.is_empty())
            .unwrap_or(false);
        if has_summaries {
            latest = Some((stamp, path));
        }
    }
    latest.map(|(_, path)| path).ok_or_else(not_found)
}

/// Scan per-port `.log` files of a results directory for error records
/// (`<3>` and `<4>` priorities). Returns whether the logs are clean.
pub fn check_port_logs(results_dir: &Path) -> ProjectResult<bool> {
    let mut logs = Vec::new();
    for entry in std::fs::read_dir(results_dir).map_err(io_error(results_dir))? {
        let path = entry.map_err(io_error(results_dir))?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("log") && path.is_file() {
            logs.push(path);
        }
    }
    logs.sort();

    let mut clean = true;
    for log_path in logs {
        let content = std::fs::read_to_string(&log_path).map_err(io_error(&log_path))?;
        let name = log_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        for (index, line) in content.lines().enumerate() {
            if line.starts_with("<3>") || line.starts_with("<4>") {
                log::error!("{}:{}:{}", name, index + 1, line);
                clean = false;
            }
        }
    }
    Ok(clean)
}

/// A project with its topology and latest results located
#[derive(Debug, Clone)]
pub struct Project {
    pub dir: PathBuf,
    pub topology_path: PathBuf,
    pub results_dir: PathBuf,
}

impl Project {
    /// Locate the topology file and latest results directory
    pub fn open(dir: &Path, config: &TacConfig) -> ProjectResult<Self> {
        let results_dir = latest_results_dir(dir, config)?;
        log::info!("Using results directory {}", results_dir.display());
        Ok(Self {
            dir: dir.to_path_buf(),
            topology_path: dir.join(&config.topology_file),
            results_dir,
        })
    }

    pub fn name(&self) -> String {
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.dir.display().to_string())
    }

    /// Load the project topology; the run's port list is the summary files
    /// present in the results directory, in topology order
    pub fn topology(&self) -> Result<Topology, super::error::TacError> {
        let base = Topology::from_file(&self.topology_path)?;
        let ports = SummaryDirectory::new(&self.results_dir)
            .summary_files()?
            .into_iter()
            .map(|(_, name)| name.physical)
            .collect();
        Ok(Topology::with_ports(base.mapping().clone(), ports))
    }
}
