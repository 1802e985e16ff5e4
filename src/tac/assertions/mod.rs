//! Assertion expression engine
//!
//! An assertion is one line of an `*.assertions` file:
//!
//! ```text
//! ANY cport.http.attempts@sec < 1000
//! LAST sport1.tcp.resets == 0
//! SPAN[10:20] httpenc.ce_total.succeeds >= httpenc.ce_total.attempts - 5
//! ```
//!
//! # Architecture
//!
//! ```text
//! line ─► lexer ─► (rule prefix, tokens) ─► compiler ─► RPN program
//!                                                           │
//!  topology + sample history ─► resolver ─► tick binding ─► evaluator
//!                                                           │
//!                         window (LAST / ANY / ANY_EXCEPT_LAST / SPAN)
//!                                                           │
//!                                       assertion state ─► set statistics
//! ```

pub mod assertion;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod resolver;
pub mod rule;
pub mod set;
pub mod variable;
pub mod window;

pub use assertion::{Assertion, AssertionState, CheckOutcome};
pub use compiler::{compile, render, Program};
pub use error::{AssertionError, AssertionResult};
pub use evaluator::{evaluate, evaluate_tick, Evaluation, PortBinding, TickBinding, Value};
pub use lexer::{tokenize, tokenize_assertion, Modifier, Operator, Token, TokenKind};
pub use resolver::{Binding, Resolver};
pub use rule::RulePrefix;
pub use set::{AssertionSet, LoadFailure};
pub use variable::{PortScope, VariableRef};
pub use window::{format_elapsed, run_window, TickResult, WindowVerdict};
