//! Error types for assertion loading and checking
//!
//! Syntax errors are raised while a line is tokenized or compiled and abort
//! loading of the file they were found in. Arithmetic errors are raised while
//! checking and abort the whole check pass. Soft conditions (unmapped ports,
//! unknown counters) never travel through this type, see
//! [`CheckOutcome`](super::CheckOutcome).

use std::path::{Path, PathBuf};

/// Main error type for assertion operations
#[derive(Debug, thiserror::Error)]
pub enum AssertionError {
    /// A word matched none of the token classes
    #[error("Syntax error, unknown token '{token}' in expression: {expression}")]
    UnknownToken { token: String, expression: String },

    /// `@` was followed by something other than a known modifier
    #[error("Incorrect modifier '{modifier}': {expression}")]
    UnknownModifier { modifier: String, expression: String },

    /// `SPAN[a:b]` with `b < a`
    #[error("Incorrect time span values: {expression}")]
    InvalidSpan { expression: String },

    /// Nothing left after tokenization
    #[error("Bad syntax in expression: {expression}")]
    EmptyExpression { expression: String },

    /// The first token is not one of the rule prefixes
    #[error("Bad rule prefix in expression: {expression}")]
    MissingRulePrefix { expression: String },

    /// A rule prefix somewhere after the first position
    #[error("Rule prefix '{rule}' is only allowed at the start of expression: {expression}")]
    MisplacedRulePrefix { rule: String, expression: String },

    /// `(` without `)` or the other way around
    #[error("Unbalanced parentheses in expression: {expression}")]
    UnbalancedParentheses { expression: String },

    /// Operator arity does not add up to exactly one result
    #[error("Malformed expression ({reason}): {expression}")]
    MalformedExpression { reason: String, expression: String },

    /// Division or modulo by zero during evaluation
    #[error("Division by zero ({trace})")]
    DivisionByZero { trace: String },

    /// Error attributed to one line of one assertion file
    #[error("{file}:{line}: {source}")]
    InFile {
        file: String,
        line: usize,
        #[source]
        source: Box<AssertionError>,
    },

    /// Neither the project nor the configured fallbacks provided a file
    #[error("No assertion files found in either of the following paths:{}", format_paths(.searched))]
    NoAssertionFiles { searched: Vec<PathBuf> },

    /// Reading an assertion file or listing a directory failed
    #[error("IO error for '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AssertionError {
    /// Attach file and line context to an error
    pub fn in_file(self, file: impl Into<String>, line: usize) -> Self {
        AssertionError::InFile {
            file: file.into(),
            line,
            source: Box::new(self),
        }
    }

    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        AssertionError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether the error aborts a whole check pass rather than one file
    pub fn is_fatal(&self) -> bool {
        match self {
            AssertionError::DivisionByZero { .. } | AssertionError::NoAssertionFiles { .. } => {
                true
            }
            AssertionError::InFile { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("\n\t{}", p.display()))
        .collect()
}

/// Result type alias for assertion operations
pub type AssertionResult<T> = Result<T, AssertionError>;
