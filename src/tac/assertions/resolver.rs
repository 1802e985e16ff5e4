//! Binding of classified variables to physical port values

use super::evaluator::{PortBinding, TickBinding};
use super::variable::{PortScope, VariableRef};
use crate::tac::samples::SampleHistory;
use crate::tac::topology::{PhysicalPort, Topology};
use std::collections::{BTreeMap, HashMap};

/// Result of binding the variables of one assertion at one tick
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Bound(TickBinding),
    /// The assertion cannot be checked against this run
    Unresolved(String),
}

/// Reads variable values out of a history through a topology
pub struct Resolver<'a> {
    topology: &'a Topology,
    history: &'a SampleHistory,
}

impl<'a> Resolver<'a> {
    pub fn new(topology: &'a Topology, history: &'a SampleHistory) -> Self {
        Self { topology, history }
    }

    /// Bind every variable at `tick`
    pub fn bind(&self, variables: &BTreeMap<String, VariableRef>, tick: usize) -> Binding {
        let mut binding = TickBinding::default();

        for (key, var) in variables {
            let PortScope::Exact(logical) = var.scope else {
                continue;
            };
            let Some(physical) = self.topology.mapping().physical_for(&logical) else {
                return Binding::Unresolved(format!(
                    "with non-configured {}",
                    logical
                ));
            };
            match self.read(tick, physical, var) {
                Some(value) => {
                    binding.shared.insert(key.clone(), value);
                }
                None => return self.missing(physical),
            }
        }

        let wildcards: Vec<(&String, &VariableRef)> =
            variables.iter().filter(|(_, v)| v.is_wildcard()).collect();
        if wildcards.is_empty() {
            return Binding::Bound(binding);
        }

        for physical in self.topology.ports() {
            let logical = self.topology.mapping().logical_for(physical);
            let mut values = HashMap::new();

            for (key, var) in &wildcards {
                let applies = match var.scope {
                    PortScope::Any => true,
                    PortScope::Kind(kind) => logical.map(|l| l.kind == kind).unwrap_or(false),
                    PortScope::Exact(_) => false,
                };
                if !applies {
                    continue;
                }
                match self.read(tick, physical, var) {
                    Some(value) => {
                        values.insert((*key).clone(), value);
                    }
                    None => return self.missing(physical),
                }
            }

            if !values.is_empty() {
                binding.ports.push(PortBinding {
                    label: logical
                        .map(|l| l.label())
                        .unwrap_or_else(|| physical.to_string()),
                    values,
                });
            }
        }

        Binding::Bound(binding)
    }

    fn read(&self, tick: usize, port: &PhysicalPort, var: &VariableRef) -> Option<f64> {
        match var.modifier {
            Some(modifier) => {
                self.history
                    .windowed_value(tick, port, &var.counter, modifier.window())
            }
            None => self.history.value(tick, port, &var.counter),
        }
    }

    fn missing(&self, port: &PhysicalPort) -> Binding {
        Binding::Unresolved(format!("with no samples for physical port {}", port))
    }
}
