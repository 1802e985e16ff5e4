//! Traffic Assertion Checker
//!
//! Checks the latest results of load test projects against their
//! assertion files.
//!
//! Usage:
//!   tac tests/http tests/tcp
//!   tac -t nightly.list --depth 2 -o json
//!   tac -v -l ~/.tac/tac.log tests/
//!
//! Exits with 0 when every project passed and 2 otherwise.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tac::tac::cli::{self, RunConfig};
use tac::tac::config::TacConfig;
use tac::tac::logging::init_logging;
use tac::tac::report::{write_report, OutputFormat};

/// Exit status for a failed or aborted run
const EXIT_FAILURE: u8 = 2;

#[derive(Parser)]
#[command(name = "tac")]
#[command(about = "Traffic Assertion Checker")]
#[command(version)]
struct Cli {
    /// Folders searched for test projects
    folders: Vec<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Also write the log to this file
    #[arg(short, long = "log-file")]
    log_file: Option<PathBuf>,

    /// File listing paths to tests, one per line
    #[arg(short, long = "test-list")]
    test_list: Option<PathBuf>,

    /// Depth of search for test projects in folders
    #[arg(short, long)]
    depth: Option<usize>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report format: text, json
    #[arg(short, long, default_value = "text")]
    output: String,
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let config = match TacConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let log_file = args.log_file.clone().or_else(|| config.log_file.clone());
    if let Err(e) = init_logging(args.verbose, log_file.as_deref()) {
        eprintln!("Cannot open log file: {}", e);
        return ExitCode::from(EXIT_FAILURE);
    }

    let format: OutputFormat = match args.output.parse() {
        Ok(format) => format,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let run = RunConfig {
        folders: args.folders,
        test_list: args.test_list,
        depth: args.depth,
    };

    let report = match cli::run(&run, &config) {
        Ok(report) => report,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let mut stdout = std::io::stdout();
    if let Err(e) = write_report(&report, format, &mut stdout) {
        log::error!("Failed to write report: {}", e);
        return ExitCode::from(EXIT_FAILURE);
    }

    if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILURE)
    }
}
