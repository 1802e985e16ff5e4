//! Logger setup for the `tac` binary
//!
//! Records go to stderr through `env_logger`. With a log file configured
//! every record is also appended to that file. `RUST_LOG` overrides the
//! level chosen from the verbose flag.

use log::LevelFilter;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Writes every record to stderr and a file
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Default level: `debug` in verbose mode, `info` otherwise
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initialize the global logger; later calls are no-ops
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> io::Result<()> {
    let level = default_level(verbose).to_string().to_lowercase();
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    builder.format_target(false);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(TeeWriter { file })));
    }

    // a logger already installed (tests, embedding) is kept
    if let Err(e) = builder.try_init() {
        match log_file {
            Some(path) => log::warn!("Not logging to {}: {}", path.display(), e),
            None => log::debug!("Keeping installed logger: {}", e),
        }
    }
    Ok(())
}
