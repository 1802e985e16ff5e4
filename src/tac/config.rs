//! Checker configuration
//!
//! Loaded from `config.yaml`, looked up in order:
//! - the path given with `--config`
//! - `$TAC_HOME/config.yaml`
//! - `$HOME/.tac/config.yaml`
//!
//! Without any file the built-in defaults apply. Relative paths inside the
//! file are resolved against the directory holding it.
//!
//! ```yaml
//! default_assertions: default.assertions
//! integrity_assertions: integrity.assertions
//! max_depth: 256
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the checker home directory
pub const TAC_HOME_ENV: &str = "TAC_HOME";

/// Configuration file name inside the home directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config parse error in {}: {message}", .file.display())]
    ParseError { file: PathBuf, message: String },

    #[error("IO error reading config {}: {source}", .file.display())]
    IoError {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Checker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TacConfig {
    /// Used when a project has no assertion files of its own
    #[serde(default = "default_assertions_file")]
    pub default_assertions: Option<PathBuf>,

    /// Always loaded first, when it exists
    #[serde(default = "default_integrity_file")]
    pub integrity_assertions: Option<PathBuf>,

    /// Known counter names, one per line; counters observed in the run are
    /// used when unset
    #[serde(default)]
    pub counters_file: Option<PathBuf>,

    /// Maximum directory depth searched for projects
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Topology file name inside a project directory
    #[serde(default = "default_topology_file")]
    pub topology_file: String,

    /// Results directory name inside a project directory
    #[serde(default = "default_results_dir")]
    pub results_dir: String,

    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_assertions_file() -> Option<PathBuf> {
    Some(PathBuf::from("default.assertions"))
}

fn default_integrity_file() -> Option<PathBuf> {
    Some(PathBuf::from("integrity.assertions"))
}

fn default_max_depth() -> usize {
    256
}

fn default_topology_file() -> String {
    "topology.yaml".to_string()
}

fn default_results_dir() -> String {
    "Results".to_string()
}

impl Default for TacConfig {
    fn default() -> Self {
        Self {
            default_assertions: default_assertions_file(),
            integrity_assertions: default_integrity_file(),
            counters_file: None,
            max_depth: default_max_depth(),
            topology_file: default_topology_file(),
            results_dir: default_results_dir(),
            log_file: None,
        }
    }
}

impl TacConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            file: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                file: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        Ok(config.resolved_against(path.parent().unwrap_or_else(|| Path::new("."))))
    }

    /// Parse configuration from YAML text; paths are left as written
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: PathBuf::new(),
            message: e.to_string(),
        })
    }

    /// Load the configuration following the lookup order
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let config = match explicit {
            Some(path) => {
                log::debug!("Using config {}", path.display());
                Self::from_file(path)?
            }
            None => match tac_home().map(|home| home.join(CONFIG_FILE_NAME)) {
                Some(path) if path.is_file() => {
                    log::debug!("Using config {}", path.display());
                    Self::from_file(path)?
                }
                _ => {
                    log::debug!("No config file found, using defaults");
                    let defaults = Self::default();
                    match tac_home() {
                        Some(home) => defaults.resolved_against(&home),
                        None => defaults,
                    }
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid {
                message: "max_depth must be at least 1".to_string(),
            });
        }
        if self.topology_file.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "topology_file must not be empty".to_string(),
            });
        }
        if self.results_dir.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "results_dir must not be empty".to_string(),
            });
        }
        Ok(())
    }

    fn resolved_against(mut self, base: &Path) -> Self {
        let resolve = |p: Option<PathBuf>| {
            p.map(|p| if p.is_relative() { base.join(p) } else { p })
        };
        self.default_assertions = resolve(self.default_assertions);
        self.integrity_assertions = resolve(self.integrity_assertions);
        self.counters_file = resolve(self.counters_file);
        self.log_file = resolve(self.log_file);
        self
    }
}

/// Checker home directory: `$TAC_HOME`, else `$HOME/.tac`
pub fn tac_home() -> Option<PathBuf> {
    match std::env::var_os(TAC_HOME_ENV) {
        Some(home) if !home.is_empty() => Some(PathBuf::from(home)),
        _ => std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".tac")),
    }
}
