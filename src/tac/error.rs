//! Top-level error type of the checker

use super::assertions::AssertionError;
use super::config::ConfigError;
use super::project::ProjectError;
use super::samples::SampleError;
use super::topology::TopologyError;

/// Any error that aborts checking a project or the whole run
#[derive(Debug, thiserror::Error)]
pub enum TacError {
    #[error(transparent)]
    Assertion(#[from] AssertionError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TacResult<T> = Result<T, TacError>;
