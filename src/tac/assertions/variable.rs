//! Counter references classified into typed port scopes
//!
//! Each variable token is classified once, when its assertion is compiled:
//!
//! | written as          | scope                          |
//! |---------------------|--------------------------------|
//! | `http.attempts`     | any port of any kind           |
//! | `cport.http.attempts` | any client port              |
//! | `sport2.http.attempts` | server port 2 only          |

use super::error::{AssertionError, AssertionResult};
use super::lexer::{Modifier, Token, TokenKind, COUNTER_PATTERN};
use crate::tac::topology::{LogicalPort, PortKind};
use std::collections::{BTreeMap, BTreeSet};

/// Which physical ports a variable reads its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortScope {
    /// Every physical port, whatever its logical kind
    Any,
    /// Every physical port mapped to a logical port of this kind
    Kind(PortKind),
    /// The single physical port mapped to this logical port
    Exact(LogicalPort),
}

/// A resolved counter reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableRef {
    pub scope: PortScope,
    pub counter: String,
    pub modifier: Option<Modifier>,
}

impl VariableRef {
    /// Classify a counter reference as written in an assertion
    pub fn parse(name: &str, modifier: Option<Modifier>) -> AssertionResult<Self> {
        let caps = COUNTER_PATTERN
            .captures(name)
            .ok_or_else(|| AssertionError::UnknownToken {
                token: name.to_string(),
                expression: name.to_string(),
            })?;

        let kind = caps
            .get(1)
            .and_then(|m| PortKind::from_prefix_letter(m.as_str()));
        let number = match caps.get(2) {
            Some(m) => Some(m.as_str().parse::<u32>().map_err(|_| {
                AssertionError::UnknownToken {
                    token: name.to_string(),
                    expression: name.to_string(),
                }
            })?),
            None => None,
        };
        let counter = caps[3].to_string();

        let scope = match (kind, number) {
            (Some(kind), Some(number)) => PortScope::Exact(LogicalPort::new(number, kind)),
            (Some(kind), None) => PortScope::Kind(kind),
            _ => PortScope::Any,
        };

        Ok(Self {
            scope,
            counter,
            modifier,
        })
    }

    /// Logical port kind the variable is tied to, if any
    pub fn kind(&self) -> Option<PortKind> {
        match self.scope {
            PortScope::Any => None,
            PortScope::Kind(kind) => Some(kind),
            PortScope::Exact(port) => Some(port.kind),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        !matches!(self.scope, PortScope::Exact(_))
    }
}

/// Classify every variable of a token stream, keyed by binding key
pub fn collect_variables(tokens: &[Token]) -> AssertionResult<BTreeMap<String, VariableRef>> {
    let mut variables = BTreeMap::new();
    for token in tokens {
        if let (TokenKind::Variable(name), Some(key)) = (&token.kind, token.variable_key()) {
            if !variables.contains_key(&key) {
                variables.insert(key, VariableRef::parse(name, token.modifier)?);
            }
        }
    }
    Ok(variables)
}

/// An assertion is multiport when its variables reference more than one
/// logical port kind
pub fn is_multiport<'a>(variables: impl IntoIterator<Item = &'a VariableRef>) -> bool {
    let kinds: BTreeSet<PortKind> = variables.into_iter().filter_map(|v| v.kind()).collect();
    kinds.len() > 1
}
