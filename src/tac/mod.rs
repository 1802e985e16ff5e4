//! Traffic assertion checker
//!
//! Decides, after a load test run, whether the collected per-port counters
//! satisfy the pass/fail rules of a project.
//!
//! # Usage
//!
//! ```bash
//! # Check every project below a folder
//! tac tests/http
//!
//! # Projects listed in a file, JSON report
//! tac -t nightly.list -o json
//! ```

pub mod assertions;
pub mod cli;
pub mod config;
pub mod counters;
pub mod error;
pub mod logging;
pub mod project;
pub mod report;
pub mod samples;
pub mod topology;

pub use assertions::{Assertion, AssertionError, AssertionSet, CheckOutcome};
pub use config::TacConfig;
pub use counters::{CounterCatalog, CounterSet};
pub use error::{TacError, TacResult};
pub use report::{FileStatistics, OutputFormat, ProjectReport, RunReport};
pub use samples::{Sample, SampleHistory, SampleProvider, SummaryDirectory};
pub use topology::{LogicalPort, PhysicalPort, PortKind, PortMapping, Topology};
