//! A single compiled assertion and its check state

use super::compiler::{compile, Program};
use super::error::AssertionResult;
use super::evaluator::evaluate_tick;
use super::lexer::tokenize_assertion;
use super::resolver::{Binding, Resolver};
use super::rule::RulePrefix;
use super::variable::{collect_variables, is_multiport, VariableRef};
use super::window::{format_elapsed, run_window, TickResult, WindowVerdict};
use crate::tac::samples::SampleHistory;
use crate::tac::topology::Topology;
use std::collections::{BTreeMap, BTreeSet};

/// Check state; leaves `Active` at most once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionState {
    Active,
    Ignored { reason: String },
    Failed { message: String },
}

/// Soft outcome of checking one assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed,
    Failed(String),
    Ignored(String),
}

/// One line of an assertion file, compiled
#[derive(Debug, Clone)]
pub struct Assertion {
    pub source_file: String,
    pub line: usize,
    pub expression: String,
    pub rule: RulePrefix,
    pub program: Program,
    /// Binding key -> classified reference
    pub variables: BTreeMap<String, VariableRef>,
    pub multiport: bool,
    state: AssertionState,
}

impl Assertion {
    /// Compile one assertion line
    pub fn parse(
        expression: &str,
        source_file: impl Into<String>,
        line: usize,
    ) -> AssertionResult<Self> {
        let (rule, tokens) = tokenize_assertion(expression)?;
        let program = compile(&tokens, expression)?;
        let variables = collect_variables(&program)?;
        let multiport = is_multiport(variables.values());

        Ok(Self {
            source_file: source_file.into(),
            line,
            expression: expression.to_string(),
            rule,
            program,
            variables,
            multiport,
            state: AssertionState::Active,
        })
    }

    pub fn state(&self) -> &AssertionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == AssertionState::Active
    }

    /// Counter names read by this assertion, without port prefixes
    pub fn counters(&self) -> BTreeSet<&str> {
        self.variables.values().map(|v| v.counter.as_str()).collect()
    }

    /// Move to `Ignored`; no effect unless active
    pub fn ignore(&mut self, reason: impl Into<String>) {
        if self.is_active() {
            self.state = AssertionState::Ignored {
                reason: reason.into(),
            };
        }
    }

    /// Move to `Failed`; no effect unless active
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.is_active() {
            self.state = AssertionState::Failed {
                message: message.into(),
            };
        }
    }

    /// Evaluate the assertion over a history.
    ///
    /// Binding problems ignore the assertion; arithmetic errors are returned
    /// with file and line attached. Assertions that already left `Active`
    /// are not evaluated again.
    pub fn check(
        &mut self,
        topology: &Topology,
        history: &SampleHistory,
    ) -> AssertionResult<CheckOutcome> {
        if !self.is_active() {
            return Ok(self.outcome());
        }

        let resolver = Resolver::new(topology, history);
        let verdict = run_window(self.rule, history.len(), |tick| {
            match resolver.bind(&self.variables, tick) {
                Binding::Bound(binding) => {
                    evaluate_tick(&self.program, &binding, self.multiport)
                        .map(TickResult::Evaluated)
                }
                Binding::Unresolved(reason) => Ok(TickResult::Unresolved(reason)),
            }
        })
        .map_err(|e| e.in_file(self.source_file.clone(), self.line))?;

        match verdict {
            WindowVerdict::Passed => {}
            WindowVerdict::Failed {
                elapsed_secs,
                trace,
                ..
            } => {
                let message = format!(
                    "{} Assertion failed ('{}' in {}): {}",
                    format_elapsed(elapsed_secs),
                    self.expression,
                    self.source_file,
                    trace
                );
                log::error!("{}", message);
                self.fail(message);
            }
            WindowVerdict::Ignored { reason } => {
                log::info!(
                    "{} '{}' ignored {}",
                    self.source_file,
                    self.expression,
                    reason
                );
                self.ignore(reason);
            }
        }
        Ok(self.outcome())
    }

    fn outcome(&self) -> CheckOutcome {
        match &self.state {
            AssertionState::Active => CheckOutcome::Passed,
            AssertionState::Failed { message } => CheckOutcome::Failed(message.clone()),
            AssertionState::Ignored { reason } => CheckOutcome::Ignored(reason.clone()),
        }
    }
}
