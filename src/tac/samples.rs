//! Counter sample history
//!
//! A [`SampleHistory`] is the complete, already-collected list of counter
//! snapshots of one run. Index 0 holds the final aggregate snapshot of every
//! port; indices 1..N-1 are forward ticks in chronological order at
//! [`TICKS_PER_SECOND`].
//!
//! Histories are assembled from per-port snapshot streams. The summary file
//! provider reads one stream per port from a results directory where files
//! are named `Client Port 1 (10.0.0.1 port 3).sum` and hold one JSON object
//! per line:
//!
//! ```text
//! {"http.attempts": 10, "http.succeeds": 10}
//! {"http.attempts": 25, "http.succeeds": 24}
//! ```

use super::topology::{LogicalPort, PhysicalPort, PortKind};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Sampling cadence of forward ticks
pub const TICKS_PER_SECOND: usize = 2;

/// Counter name -> value for one port at one tick
pub type Counters = HashMap<String, f64>;

lazy_static::lazy_static! {
    static ref SUMMARY_FILE_PATTERN: regex::Regex = regex::Regex::new(
        r"^([Cc]lient|[Ss]erver)\s+[Pp]ort\s+([0-9]+)\s*\(([0-9.]+) [Pp]ort ([0-9]+)\)\.sum(mary)?$"
    ).expect("Failed to compile summary file name pattern");
}

/// Errors raised while loading samples
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("Summary files not found in {}", .dir.display())]
    NoSummaryFiles { dir: PathBuf },

    #[error("Bad summary line {line} in {}: {message}", .file.display())]
    BadSummaryLine {
        file: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Summary file {} appears more than once for {port}", .file.display())]
    DuplicatePort { file: PathBuf, port: PhysicalPort },

    #[error("IO error for '{}': {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type SampleResult<T> = Result<T, SampleError>;

/// Counter snapshot of every port at one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    ports: HashMap<PhysicalPort, Counters>,
}

impl Sample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, port: PhysicalPort, counters: Counters) {
        self.ports.insert(port, counters);
    }

    /// Builder-style insert for a single counter
    pub fn with_counter(mut self, port: &PhysicalPort, counter: &str, value: f64) -> Self {
        self.ports
            .entry(port.clone())
            .or_default()
            .insert(counter.to_string(), value);
        self
    }

    pub fn port(&self, port: &PhysicalPort) -> Option<&Counters> {
        self.ports.get(port)
    }

    pub fn ports(&self) -> impl Iterator<Item = (&PhysicalPort, &Counters)> {
        self.ports.iter()
    }
}

/// Index-0-reserved, chronologically ordered sample list
#[derive(Debug, Clone, Default)]
pub struct SampleHistory {
    samples: Vec<Sample>,
}

impl SampleHistory {
    /// Wrap samples that already follow the index layout (0 = final)
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Merge per-port snapshot streams of possibly different lengths.
    ///
    /// Forward ticks are taken from every stream in lock step. Once a
    /// stream runs out, its port contributes empty snapshots; its last real
    /// snapshot becomes its entry in the final sample at index 0.
    pub fn assemble(streams: Vec<(PhysicalPort, Vec<Counters>)>) -> Self {
        let total = streams.len();
        let mut iters: Vec<_> = streams
            .into_iter()
            .map(|(port, snapshots)| (port, snapshots.into_iter()))
            .collect();
        let mut forward: Vec<Sample> = Vec::new();
        let mut last = Sample::new();

        loop {
            let mut sample = Sample::new();
            for (port, iter) in iters.iter_mut() {
                match iter.next() {
                    Some(counters) => sample.insert(port.clone(), counters),
                    None => {
                        if last.port(port).is_none() {
                            let final_counters = forward
                                .last()
                                .and_then(|s| s.port(port))
                                .cloned()
                                .unwrap_or_default();
                            last.insert(port.clone(), final_counters);
                        }
                        sample.insert(port.clone(), Counters::new());
                    }
                }
            }
            if last.ports.len() == total {
                break;
            }
            forward.push(sample);
        }

        let mut samples = Vec::with_capacity(forward.len() + 1);
        samples.push(last);
        samples.extend(forward);
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Raw counter value; `None` when the port has no snapshot at the tick,
    /// `0.0` when the snapshot lacks the counter
    pub fn value(&self, tick: usize, port: &PhysicalPort, counter: &str) -> Option<f64> {
        let counters = self.samples.get(tick)?.port(port)?;
        Some(counters.get(counter).copied().unwrap_or(0.0))
    }

    /// Counter delta over the last `window` ticks.
    ///
    /// Ticks closer to the start than the window length are extrapolated
    /// from the cumulative value: `value * window / (tick + 1)`.
    pub fn windowed_value(
        &self,
        tick: usize,
        port: &PhysicalPort,
        counter: &str,
        window: usize,
    ) -> Option<f64> {
        let value = self.value(tick, port, counter)?;
        if tick < window {
            Some(value / (tick + 1) as f64 * window as f64)
        } else {
            let earlier = self.value(tick - window, port, counter).unwrap_or(0.0);
            Some(value - earlier)
        }
    }

    /// Every counter name present anywhere in the history
    pub fn counter_names(&self) -> BTreeSet<String> {
        self.samples
            .iter()
            .flat_map(|s| s.ports.values())
            .flat_map(|c| c.keys().cloned())
            .collect()
    }
}

/// Wall clock offset in whole seconds of a forward tick
pub fn tick_seconds(tick: usize) -> u64 {
    ((tick + 1) / TICKS_PER_SECOND) as u64
}

/// Source of the sample history of one run
pub trait SampleProvider {
    /// Load the history; only `counters` need to be retained
    fn load_history(&self, counters: &BTreeSet<String>) -> SampleResult<SampleHistory>;
}

/// Parsed `(Client|Server) Port N (ip port M).sum` file name
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryFileName {
    pub logical: LogicalPort,
    pub physical: PhysicalPort,
}

impl SummaryFileName {
    pub fn parse(name: &str) -> Option<Self> {
        let caps = SUMMARY_FILE_PATTERN.captures(name)?;
        let kind = if caps[1].eq_ignore_ascii_case("client") {
            PortKind::Client
        } else {
            PortKind::Server
        };
        let logical_number = caps[2].parse().ok()?;
        let physical_number = caps[4].parse().ok()?;
        Some(Self {
            logical: LogicalPort::new(logical_number, kind),
            physical: PhysicalPort::new(physical_number, &caps[3]),
        })
    }
}

/// Reads per-port summary files from a results directory
#[derive(Debug, Clone)]
pub struct SummaryDirectory {
    dir: PathBuf,
}

impl SummaryDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Summary files in the directory, sorted by file name
    pub fn summary_files(&self) -> SampleResult<Vec<(PathBuf, SummaryFileName)>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| SampleError::IoError {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SampleError::IoError {
                path: self.dir.clone(),
                source: e,
            })?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            if let Some(parsed) = SummaryFileName::parse(&name) {
                files.push((entry.path(), parsed));
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }

    /// Read one summary file, keeping only the requested counters (an empty
    /// set keeps every counter)
    pub fn read_summary(
        path: &Path,
        counters: &BTreeSet<String>,
    ) -> SampleResult<Vec<Counters>> {
        let content = std::fs::read_to_string(path).map_err(|e| SampleError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut snapshots = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let all: HashMap<String, f64> =
                serde_json::from_str(line).map_err(|e| SampleError::BadSummaryLine {
                    file: path.to_path_buf(),
                    line: index + 1,
                    message: e.to_string(),
                })?;
            snapshots.push(
                all.into_iter()
                    .filter(|(name, _)| counters.is_empty() || counters.contains(name))
                    .collect(),
            );
        }
        Ok(snapshots)
    }
}

impl SampleProvider for SummaryDirectory {
    fn load_history(&self, counters: &BTreeSet<String>) -> SampleResult<SampleHistory> {
        let files = self.summary_files()?;
        if files.is_empty() {
            return Err(SampleError::NoSummaryFiles {
                dir: self.dir.clone(),
            });
        }

        log::info!("Loading summary files...");
        let mut seen = HashSet::new();
        let mut streams = Vec::with_capacity(files.len());
        for (path, name) in files {
            log::debug!("{}", path.display());
            if !seen.insert(name.physical.clone()) {
                return Err(SampleError::DuplicatePort {
                    file: path,
                    port: name.physical,
                });
            }
            let snapshots = Self::read_summary(&path, counters)?;
            streams.push((name.physical, snapshots));
        }
        Ok(SampleHistory::assemble(streams))
    }
}
