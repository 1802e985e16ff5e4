//! Port topology: logical test roles mapped onto physical appliance ports
//!
//! The mapping is built once per run and is read-only afterwards. Its
//! enumeration order is the insertion order of the source it was loaded
//! from; multiport assertions pick the first port (in that order) that
//! defines a counter, so the order is part of the contract.
//!
//! ## Topology file
//!
//! ```yaml
//! ports:
//!   - kind: client
//!     number: 1
//!     appliance: 10.0.0.1
//!     port: 3
//!   - kind: server
//!     number: 1
//!     appliance: 10.0.0.1
//!     port: 4
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

/// Role of a logical port in the test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    Client,
    Server,
}

impl PortKind {
    /// Kind for the `c`/`s` letter of a counter reference prefix
    pub fn from_prefix_letter(letter: &str) -> Option<Self> {
        match letter {
            "c" => Some(PortKind::Client),
            "s" => Some(PortKind::Server),
            _ => None,
        }
    }

    /// Counter reference prefix (`cport` / `sport`)
    pub fn prefix(&self) -> &'static str {
        match self {
            PortKind::Client => "cport",
            PortKind::Server => "sport",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PortKind::Client => "client",
            PortKind::Server => "server",
        }
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract client/server role; `number == None` means any port of the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogicalPort {
    pub number: Option<u32>,
    pub kind: PortKind,
}

impl LogicalPort {
    pub fn new(number: u32, kind: PortKind) -> Self {
        Self {
            number: Some(number),
            kind,
        }
    }

    pub fn any_of(kind: PortKind) -> Self {
        Self { number: None, kind }
    }

    /// Short label used in diagnostics, e.g. `cport1`
    pub fn label(&self) -> String {
        match self.number {
            Some(n) => format!("{}{}", self.kind.prefix(), n),
            None => self.kind.prefix().to_string(),
        }
    }
}

impl fmt::Display for LogicalPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(n) => write!(f, "{} port {}", self.kind, n),
            None => write!(f, "any {} port", self.kind),
        }
    }
}

/// Concrete appliance port that ran traffic
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhysicalPort {
    pub number: u32,
    pub appliance: String,
}

impl PhysicalPort {
    pub fn new(number: u32, appliance: impl Into<String>) -> Self {
        Self {
            number,
            appliance: appliance.into(),
        }
    }
}

impl fmt::Display for PhysicalPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.appliance, self.number)
    }
}

/// Errors raised while building a topology
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("{port} mapped to more than one physical port")]
    DuplicateLogicalPort { port: LogicalPort },

    #[error("{port} mapped to more than one logical port")]
    DuplicatePhysicalPort { port: PhysicalPort },

    #[error("Logical port '{port}' must have a number to be mapped")]
    UnnumberedLogicalPort { port: LogicalPort },

    #[error("No valid physical port IP address '{appliance}' for {port}")]
    InvalidAppliance { appliance: String, port: LogicalPort },

    #[error("Topology parse error in {}: {message}", .file.display())]
    ParseError { file: PathBuf, message: String },

    #[error("IO error reading topology {}: {source}", .file.display())]
    IoError {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type TopologyResult<T> = Result<T, TopologyError>;

/// Bidirectional logical <-> physical port map with stable insertion order
#[derive(Debug, Clone, Default)]
pub struct PortMapping {
    pairs: Vec<(LogicalPort, PhysicalPort)>,
    l2p: HashMap<LogicalPort, usize>,
    p2l: HashMap<PhysicalPort, usize>,
}

impl PortMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one pair; both sides must be unique within the mapping
    pub fn insert(&mut self, logical: LogicalPort, physical: PhysicalPort) -> TopologyResult<()> {
        if logical.number.is_none() {
            return Err(TopologyError::UnnumberedLogicalPort { port: logical });
        }
        if self.l2p.contains_key(&logical) {
            return Err(TopologyError::DuplicateLogicalPort { port: logical });
        }
        if self.p2l.contains_key(&physical) {
            return Err(TopologyError::DuplicatePhysicalPort { port: physical });
        }
        let index = self.pairs.len();
        self.l2p.insert(logical, index);
        self.p2l.insert(physical.clone(), index);
        self.pairs.push((logical, physical));
        Ok(())
    }

    pub fn physical_for(&self, logical: &LogicalPort) -> Option<&PhysicalPort> {
        self.l2p.get(logical).map(|&i| &self.pairs[i].1)
    }

    pub fn logical_for(&self, physical: &PhysicalPort) -> Option<&LogicalPort> {
        self.p2l.get(physical).map(|&i| &self.pairs[i].0)
    }

    /// Pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &(LogicalPort, PhysicalPort)> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Port mapping plus the ordered list of physical ports taking part in a run
#[derive(Debug, Clone, Default)]
pub struct Topology {
    mapping: PortMapping,
    ports: Vec<PhysicalPort>,
}

impl Topology {
    /// Every mapped physical port takes part, in mapping order
    pub fn new(mapping: PortMapping) -> Self {
        let ports = mapping.iter().map(|(_, p)| p.clone()).collect();
        Self { mapping, ports }
    }

    /// Explicit run port list; ports missing from the mapping are allowed.
    /// Mapped ports are kept in mapping order, unmapped ones follow sorted.
    pub fn with_ports(mapping: PortMapping, ports: Vec<PhysicalPort>) -> Self {
        let (mapped, mut unmapped): (Vec<PhysicalPort>, Vec<PhysicalPort>) = ports
            .into_iter()
            .partition(|port| mapping.logical_for(port).is_some());
        for port in &unmapped {
            log::warn!("No logical port found for {}", port);
        }
        unmapped.sort();
        unmapped.dedup();

        let mut ordered: Vec<PhysicalPort> = mapping
            .iter()
            .map(|(_, physical)| physical)
            .filter(|physical| mapped.contains(physical))
            .cloned()
            .collect();
        ordered.extend(unmapped);
        Self {
            mapping,
            ports: ordered,
        }
    }

    pub fn mapping(&self) -> &PortMapping {
        &self.mapping
    }

    pub fn ports(&self) -> &[PhysicalPort] {
        &self.ports
    }

    /// Load a topology from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> TopologyResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TopologyError::IoError {
            file: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            TopologyError::ParseError { message, .. } => TopologyError::ParseError {
                file: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parse a topology from YAML text
    pub fn from_yaml(yaml: &str) -> TopologyResult<Self> {
        let file: TopologyFile =
            serde_yaml::from_str(yaml).map_err(|e| TopologyError::ParseError {
                file: PathBuf::new(),
                message: e.to_string(),
            })?;

        let mut mapping = PortMapping::new();
        for entry in file.ports {
            let logical = LogicalPort::new(entry.number, entry.kind);
            if entry.appliance.parse::<Ipv4Addr>().is_err() {
                return Err(TopologyError::InvalidAppliance {
                    appliance: entry.appliance,
                    port: logical,
                });
            }
            let physical = PhysicalPort::new(entry.port, entry.appliance);
            log::debug!("{} - {}", logical, physical);
            mapping.insert(logical, physical)?;
        }
        Ok(Self::new(mapping))
    }
}

#[derive(Debug, Deserialize)]
struct TopologyFile {
    #[serde(default)]
    ports: Vec<PortEntry>,
}

#[derive(Debug, Deserialize)]
struct PortEntry {
    kind: PortKind,
    number: u32,
    appliance: String,
    port: u32,
}
