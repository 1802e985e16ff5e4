//! Stack machine executing compiled assertion programs
//!
//! Values are numbers or booleans. Comparisons and `!` produce booleans,
//! arithmetic produces numbers, and `&` / `|` hand back one of their
//! operands unchanged:
//!
//! ```text
//! a & b  ->  a when a is falsy, otherwise b
//! a | b  ->  a when a is truthy, otherwise b
//! ```
//!
//! so `LAST 0 | 5` evaluates to `5`, not `true`.

use super::compiler::Program;
use super::error::{AssertionError, AssertionResult};
use super::lexer::{Operator, TokenKind};
use std::collections::HashMap;
use std::fmt;

/// Evaluation stack value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
}

impl Value {
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(true) => 1.0,
            Value::Bool(false) => 0.0,
        }
    }

    /// Numbers are truthy when non-zero
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::Bool(b) => *b,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
        }
    }
}

/// Outcome of running a program once
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: Value,
    /// `name=value` pairs of every variable read, in program order
    pub trace: String,
}

impl Evaluation {
    pub fn is_truthy(&self) -> bool {
        self.value.is_truthy()
    }
}

/// Run a program, looking variables up by binding key
pub fn evaluate<F>(program: &Program, mut lookup: F) -> AssertionResult<Evaluation>
where
    F: FnMut(&str) -> f64,
{
    let mut stack: Vec<Value> = Vec::with_capacity(program.len());
    let mut trace = String::new();

    for token in program {
        match &token.kind {
            TokenKind::Number(n) => stack.push(Value::Number(*n)),
            TokenKind::Variable(_) => {
                let key = token.variable_key().unwrap_or_default();
                let value = lookup(&key);
                trace.push_str(&format!("{}={} ", key, value));
                stack.push(Value::Number(value));
            }
            TokenKind::Operator(Operator::Not) => {
                let a = pop(&mut stack)?;
                stack.push(Value::Bool(!a.is_truthy()));
            }
            TokenKind::Operator(op) => {
                let b = pop(&mut stack)?;
                let a = pop(&mut stack)?;
                stack.push(apply(*op, a, b, &trace)?);
            }
            TokenKind::LeftParen | TokenKind::RightParen | TokenKind::Rule(_) => {
                return Err(AssertionError::MalformedExpression {
                    reason: format!("unexpected token '{}' in program", token),
                    expression: super::compiler::render(program),
                })
            }
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(value), true) => Ok(Evaluation {
            value,
            trace: trace.trim_end().to_string(),
        }),
        _ => Err(AssertionError::MalformedExpression {
            reason: "program must leave exactly one value".to_string(),
            expression: super::compiler::render(program),
        }),
    }
}

fn pop(stack: &mut Vec<Value>) -> AssertionResult<Value> {
    stack.pop().ok_or_else(|| AssertionError::MalformedExpression {
        reason: "stack underflow".to_string(),
        expression: String::new(),
    })
}

fn apply(op: Operator, a: Value, b: Value, trace: &str) -> AssertionResult<Value> {
    let (x, y) = (a.as_f64(), b.as_f64());
    let value = match op {
        Operator::Multiply => Value::Number(x * y),
        Operator::Divide => {
            if y == 0.0 {
                return Err(division_by_zero(trace));
            }
            Value::Number(x / y)
        }
        Operator::Modulo => {
            if y == 0.0 {
                return Err(division_by_zero(trace));
            }
            // sign follows the divisor
            Value::Number(x - y * (x / y).floor())
        }
        Operator::Add => Value::Number(x + y),
        Operator::Subtract => Value::Number(x - y),
        Operator::Less => Value::Bool(x < y),
        Operator::LessOrEqual => Value::Bool(x <= y),
        Operator::Greater => Value::Bool(x > y),
        Operator::GreaterOrEqual => Value::Bool(x >= y),
        Operator::Equal => Value::Bool(x == y),
        Operator::NotEqual => Value::Bool(x != y),
        Operator::And => {
            if a.is_truthy() {
                b
            } else {
                a
            }
        }
        Operator::Or => {
            if a.is_truthy() {
                a
            } else {
                b
            }
        }
        Operator::Not => Value::Bool(!b.is_truthy()),
    };
    Ok(value)
}

fn division_by_zero(trace: &str) -> AssertionError {
    AssertionError::DivisionByZero {
        trace: trace.trim_end().to_string(),
    }
}

/// Values bound on one physical port for one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortBinding {
    /// Diagnostic label, e.g. `cport1`
    pub label: String,
    pub values: HashMap<String, f64>,
}

/// Everything a program may read at one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickBinding {
    /// Exact-port values, visible to every evaluation
    pub shared: HashMap<String, f64>,
    /// Wildcard values per contributing port, in topology order
    pub ports: Vec<PortBinding>,
}

impl TickBinding {
    /// Value of a key in multiport mode: shared first, then the first port
    /// defining it
    fn merged(&self, key: &str) -> Option<f64> {
        self.shared
            .get(key)
            .copied()
            .or_else(|| self.ports.iter().find_map(|p| p.values.get(key).copied()))
    }
}

/// Evaluate a program for one tick.
///
/// Multiport programs are evaluated once over the merged binding. Other
/// programs are evaluated once per contributing port, and the first falsy
/// evaluation is the result of the tick; with no contributing ports they
/// are evaluated once over the shared values.
pub fn evaluate_tick(
    program: &Program,
    binding: &TickBinding,
    multiport: bool,
) -> AssertionResult<Evaluation> {
    if multiport || binding.ports.is_empty() {
        return evaluate(program, |key| binding.merged(key).unwrap_or(0.0));
    }

    let mut last = None;
    for port in &binding.ports {
        let mut evaluation = evaluate(program, |key| {
            port.values
                .get(key)
                .or_else(|| binding.shared.get(key))
                .copied()
                .unwrap_or(0.0)
        })?;
        evaluation.trace = format!("{}: {}", port.label, evaluation.trace);
        if !evaluation.is_truthy() {
            return Ok(evaluation);
        }
        last = Some(evaluation);
    }
    match last {
        Some(evaluation) => Ok(evaluation),
        None => evaluate(program, |key| binding.shared.get(key).copied().unwrap_or(0.0)),
    }
}
