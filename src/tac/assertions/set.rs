//! All assertions of one run
//!
//! Files are loaded independently: a syntax error aborts loading of the
//! file it appears in and is kept as a [`LoadFailure`], other files still
//! load. Any load failure makes the set fail as a whole.

use super::assertion::{Assertion, AssertionState};
use super::error::{AssertionError, AssertionResult};
use crate::tac::config::TacConfig;
use crate::tac::counters::CounterCatalog;
use crate::tac::report::FileStatistics;
use crate::tac::samples::SampleHistory;
use crate::tac::topology::Topology;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Extension of assertion files inside a project directory
pub const ASSERTION_FILE_EXTENSION: &str = "assertions";

/// Unknown counter names listed in the grouped validation message
const MAX_LISTED_COUNTERS: usize = 11;

/// An assertion file that could not be loaded
#[derive(Debug)]
pub struct LoadFailure {
    pub file: String,
    pub error: AssertionError,
}

#[derive(Debug, Default)]
pub struct AssertionSet {
    assertions: Vec<Assertion>,
    /// Loaded file names, in load order
    files: Vec<String>,
    failures: Vec<LoadFailure>,
}

impl AssertionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every rule line of one file; the first error aborts the file
    pub fn parse_source(name: &str, text: &str) -> AssertionResult<Vec<Assertion>> {
        let mut assertions = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let assertion =
                Assertion::parse(line, name, index + 1).map_err(|e| e.in_file(name, index + 1))?;
            assertions.push(assertion);
        }
        Ok(assertions)
    }

    /// Add the assertions of one file, or record why it failed to load
    pub fn load_source(&mut self, name: &str, text: &str) {
        match Self::parse_source(name, text) {
            Ok(assertions) => {
                log::debug!("Assertions loaded: {} ({})", name, assertions.len());
                self.files.push(name.to_string());
                self.assertions.extend(assertions);
            }
            Err(error) => {
                log::error!("Failed to load assertions file {}: {}", name, error);
                self.failures.push(LoadFailure {
                    file: name.to_string(),
                    error,
                });
            }
        }
    }

    /// Load assertion files; each file is named by its base name
    pub fn load_files(paths: &[PathBuf]) -> Self {
        let mut set = Self::new();
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            match std::fs::read_to_string(path) {
                Ok(text) => set.load_source(&name, &text),
                Err(e) => {
                    let error = AssertionError::io(path, e);
                    log::error!("Failed to load assertions file {}: {}", name, error);
                    set.failures.push(LoadFailure { file: name, error });
                }
            }
        }
        set
    }

    /// Assertion files for a project.
    ///
    /// The project's own non-hidden `*.assertions` files, sorted by name;
    /// the configured default file when the project has none; the
    /// configured integrity file, if it exists, always comes first.
    pub fn discover_files(project_dir: &Path, config: &TacConfig) -> AssertionResult<Vec<PathBuf>> {
        let entries =
            std::fs::read_dir(project_dir).map_err(|e| AssertionError::io(project_dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| AssertionError::io(project_dir, e))?.path();
            let hidden = path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(true);
            let is_assertions =
                path.extension().and_then(|e| e.to_str()) == Some(ASSERTION_FILE_EXTENSION);
            if !hidden && is_assertions && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            if let Some(default) = config.default_assertions.as_ref().filter(|p| p.is_file()) {
                files.push(default.clone());
            }
        }
        if let Some(integrity) = config.integrity_assertions.as_ref().filter(|p| p.is_file()) {
            files.insert(0, integrity.clone());
        }

        if files.is_empty() {
            let mut searched = vec![project_dir.join(format!("*.{}", ASSERTION_FILE_EXTENSION))];
            searched.extend(config.default_assertions.iter().cloned());
            searched.extend(config.integrity_assertions.iter().cloned());
            return Err(AssertionError::NoAssertionFiles { searched });
        }
        log::debug!("Assertion files: {:?}", files);
        Ok(files)
    }

    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    pub fn load_failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }

    /// Counter names read by active assertions
    pub fn referenced_counters(&self) -> BTreeSet<String> {
        self.assertions
            .iter()
            .filter(|a| a.is_active())
            .flat_map(|a| a.counters())
            .map(str::to_string)
            .collect()
    }

    /// Ignore every assertion reading a counter the catalog does not know.
    ///
    /// Returns the number of assertions ignored.
    pub fn validate_counters(&mut self, catalog: &dyn CounterCatalog) -> usize {
        let mut unknown: BTreeSet<String> = BTreeSet::new();
        let mut ignored = 0;

        for assertion in self.assertions.iter_mut().filter(|a| a.is_active()) {
            let missing: Vec<String> = assertion
                .counters()
                .into_iter()
                .filter(|c| !catalog.counter_exists(c))
                .map(str::to_string)
                .collect();
            if missing.is_empty() {
                continue;
            }
            assertion.ignore(format!("with invalid counter(s) {}", missing.join(", ")));
            unknown.extend(missing);
            ignored += 1;
        }

        if !unknown.is_empty() {
            let mut message = format!(
                "{} assertion{} with the following invalid counter{} ignored:",
                ignored,
                if ignored > 1 { "s" } else { "" },
                if unknown.len() > 1 { "s are" } else { " is" },
            );
            for name in unknown.iter().take(MAX_LISTED_COUNTERS) {
                message.push_str(&format!("\n\t{}", name));
            }
            if unknown.len() > MAX_LISTED_COUNTERS {
                message.push_str(&format!("\n<...> Total {} items.", unknown.len()));
            }
            log::error!("{}", message);
        }
        ignored
    }

    /// Check every active assertion; the first fatal error aborts the pass
    pub fn check(&mut self, topology: &Topology, history: &SampleHistory) -> AssertionResult<()> {
        log::debug!("Checking assertions...");
        for assertion in self.assertions.iter_mut() {
            assertion.check(topology, history)?;
        }
        Ok(())
    }

    /// Per-file counts, in load order
    pub fn statistics(&self) -> Vec<FileStatistics> {
        self.files
            .iter()
            .map(|file| {
                let mut stats = FileStatistics::new(file.clone());
                for assertion in self.assertions.iter().filter(|a| &a.source_file == file) {
                    match assertion.state() {
                        AssertionState::Active => stats.passed += 1,
                        AssertionState::Failed { .. } => stats.failed += 1,
                        AssertionState::Ignored { .. } => stats.ignored += 1,
                    }
                }
                stats
            })
            .collect()
    }

    /// No load failures and no failed assertions
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
            && self
                .assertions
                .iter()
                .all(|a| !matches!(a.state(), AssertionState::Failed { .. }))
    }
}
