//! Run report generation
//!
//! Generates reports in two formats:
//! - Text (human-readable console output)
//! - JSON (machine-readable)

use serde::{Deserialize, Serialize};
use std::io::Write;

/// Assertion counts for one assertion file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatistics {
    /// File base name
    pub file: String,
    pub passed: usize,
    pub failed: usize,
    pub ignored: usize,
}

impl FileStatistics {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.ignored
    }
}

/// Final status of one project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Passed,
    Failed,
    /// Setup error, the assertions could not be checked
    Aborted,
}

/// Report for a single project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectReport {
    /// Project directory
    pub project: String,

    /// Results directory that was checked
    #[serde(default)]
    pub results_dir: Option<String>,

    pub status: ProjectStatus,

    /// Per assertion file counts
    #[serde(default)]
    pub files: Vec<FileStatistics>,

    /// Messages of failed assertions
    #[serde(default)]
    pub failures: Vec<String>,

    /// Assertion files that could not be loaded
    #[serde(default)]
    pub load_failures: Vec<String>,

    /// Setup error for aborted projects
    #[serde(default)]
    pub error: Option<String>,
}

impl ProjectReport {
    pub fn aborted(project: impl Into<String>, error: impl ToString) -> Self {
        Self {
            project: project.into(),
            results_dir: None,
            status: ProjectStatus::Aborted,
            files: Vec::new(),
            failures: Vec::new(),
            load_failures: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Summary statistics over all projects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub aborted: usize,
}

/// Complete run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Start time (ISO 8601)
    pub start_time: String,

    /// End time (ISO 8601)
    pub end_time: String,

    pub summary: RunSummary,

    pub projects: Vec<ProjectReport>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            start_time: chrono::Utc::now().to_rfc3339(),
            end_time: String::new(),
            summary: RunSummary::default(),
            projects: Vec::new(),
        }
    }

    pub fn add_project(&mut self, project: ProjectReport) {
        self.summary.total += 1;
        match project.status {
            ProjectStatus::Passed => self.summary.passed += 1,
            ProjectStatus::Failed => self.summary.failed += 1,
            ProjectStatus::Aborted => self.summary.aborted += 1,
        }
        self.projects.push(project);
    }

    pub fn finish(&mut self) {
        self.end_time = chrono::Utc::now().to_rfc3339();
    }

    /// Every project passed
    pub fn passed(&self) -> bool {
        self.summary.failed == 0 && self.summary.aborted == 0
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Write report to output
pub fn write_report(
    report: &RunReport,
    format: OutputFormat,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Text => write_text_report(report, writer),
        OutputFormat::Json => write_json_report(report, writer),
    }
}

/// Per-file block of the text report
pub fn write_file_statistics(stats: &FileStatistics, writer: &mut dyn Write) -> std::io::Result<()> {
    writeln!(writer, "Statistics for {}:", stats.file)?;
    writeln!(writer, "\tTotal:   {}", stats.total())?;
    writeln!(writer, "\tPassed:  {}", stats.passed)?;
    writeln!(writer, "\tFailed:  {}", stats.failed)?;
    writeln!(writer, "\tIgnored: {}", stats.ignored)
}

fn write_text_report(report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
    for project in &report.projects {
        writeln!(writer, "{}", project.project)?;
        if let Some(ref dir) = project.results_dir {
            writeln!(writer, "Results: {}", dir)?;
        }
        if let Some(ref error) = project.error {
            writeln!(writer, "ERROR: {}", error)?;
        }
        for failure in &project.load_failures {
            writeln!(writer, "LOAD FAILED: {}", failure)?;
        }
        for stats in &project.files {
            write_file_statistics(stats, writer)?;
        }
        let status = match project.status {
            ProjectStatus::Passed => "passed",
            ProjectStatus::Failed => "failed",
            ProjectStatus::Aborted => "aborted",
        };
        writeln!(writer, "\"{}\" {}", project.project, status)?;
        writeln!(writer)?;
    }

    writeln!(writer, "\tTotal attempted: {}", report.summary.total)?;
    writeln!(writer, "\tTotal passed:    {}", report.summary.passed)?;
    writeln!(writer, "\tTotal aborted:   {}", report.summary.aborted)?;
    writeln!(writer, "\tTotal failed:    {}", report.summary.failed)?;
    Ok(())
}

fn write_json_report(report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    writeln!(writer, "{}", json)
}
