//! # tac
//!
//! Traffic assertion checker for network load test runs.
//!
//! Rules such as `ANY cport.http.attempts@sec < 1000` are compiled into
//! reverse polish programs and evaluated over the per-port counter samples
//! of a finished run, through a logical to physical port topology.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tac::tac::{AssertionSet, SummaryDirectory, SampleProvider, Topology};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let topology = Topology::from_file("project/topology.yaml")?;
//! let mut set = AssertionSet::new();
//! set.load_source("http.assertions", "LAST http.succeeds == http.attempts\n");
//!
//! let results = SummaryDirectory::new("project/Results/03_14_2024 02-05-09 PM");
//! let history = results.load_history(&set.referenced_counters())?;
//! set.check(&topology, &history)?;
//! println!("passed: {}", set.passed());
//! # Ok(())
//! # }
//! ```

pub mod tac;

pub use tac::assertions::{AssertionError, AssertionResult};
pub use tac::error::{TacError, TacResult};
