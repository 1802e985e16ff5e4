//! Shared fixtures for unit tests

use tac::tac::samples::{Sample, SampleHistory};
use tac::tac::topology::{LogicalPort, PhysicalPort, PortKind, PortMapping, Topology};

pub const APPLIANCE: &str = "10.0.0.1";

pub fn client_port() -> PhysicalPort {
    PhysicalPort::new(3, APPLIANCE)
}

pub fn server_port() -> PhysicalPort {
    PhysicalPort::new(4, APPLIANCE)
}

/// cport1 -> 10.0.0.1:3, sport1 -> 10.0.0.1:4
pub fn client_server_topology() -> Topology {
    let mut mapping = PortMapping::new();
    mapping
        .insert(LogicalPort::new(1, PortKind::Client), client_port())
        .unwrap();
    mapping
        .insert(LogicalPort::new(1, PortKind::Server), server_port())
        .unwrap();
    Topology::new(mapping)
}

/// cport1 -> 10.0.0.1:3 only
pub fn client_topology() -> Topology {
    let mut mapping = PortMapping::new();
    mapping
        .insert(LogicalPort::new(1, PortKind::Client), client_port())
        .unwrap();
    Topology::new(mapping)
}

/// History where counter `name` on the client port takes `values[tick]`
pub fn client_history(name: &str, values: &[f64]) -> SampleHistory {
    let port = client_port();
    SampleHistory::new(
        values
            .iter()
            .map(|v| Sample::new().with_counter(&port, name, *v))
            .collect(),
    )
}

/// History with the same counter on both ports
pub fn both_ports_history(name: &str, client: &[f64], server: &[f64]) -> SampleHistory {
    let (c, s) = (client_port(), server_port());
    SampleHistory::new(
        client
            .iter()
            .zip(server)
            .map(|(cv, sv)| {
                Sample::new()
                    .with_counter(&c, name, *cv)
                    .with_counter(&s, name, *sv)
            })
            .collect(),
    )
}
