//! Counter existence oracle
//!
//! Assertions that reference a counter the oracle does not recognize are
//! ignored before the check pass runs.

use super::samples::SampleHistory;
use std::collections::HashSet;
use std::path::Path;

/// Answers whether a counter name is a recognized statistic
pub trait CounterCatalog {
    fn counter_exists(&self, name: &str) -> bool;
}

/// Set-backed catalog
#[derive(Debug, Clone, Default)]
pub struct CounterSet {
    names: HashSet<String>,
}

impl CounterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Counters observed anywhere in a sample history
    pub fn from_history(history: &SampleHistory) -> Self {
        history.counter_names().into_iter().collect()
    }

    /// One counter name per line; blank lines and `#` comments are skipped
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect())
    }
}

impl FromIterator<String> for CounterSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

impl CounterCatalog for CounterSet {
    fn counter_exists(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}
