//! Time-window driver running an evaluation over a sample history

use super::error::AssertionResult;
use super::evaluator::Evaluation;
use super::rule::RulePrefix;
use crate::tac::samples::{tick_seconds, TICKS_PER_SECOND};

/// Per-tick result handed back to the window driver
#[derive(Debug, Clone, PartialEq)]
pub enum TickResult {
    Evaluated(Evaluation),
    /// Variables could not be bound; the assertion is skipped
    Unresolved(String),
}

/// Verdict of a rule over a whole history
#[derive(Debug, Clone, PartialEq)]
pub enum WindowVerdict {
    Passed,
    Failed {
        tick: usize,
        elapsed_secs: u64,
        trace: String,
    },
    Ignored {
        reason: String,
    },
}

/// Drive `evaluate_at` over the ticks selected by `rule`.
///
/// Forward ticks are scanned first and the scan stops at the first falsy
/// constraining tick. Rules with a final expectation then evaluate index 0,
/// unless the scan already failed.
pub fn run_window<F>(rule: RulePrefix, len: usize, mut evaluate_at: F) -> AssertionResult<WindowVerdict>
where
    F: FnMut(usize) -> AssertionResult<TickResult>,
{
    if len == 0 {
        return Ok(WindowVerdict::Ignored {
            reason: "with empty sample history".to_string(),
        });
    }

    for tick in rule.forward_ticks(len) {
        if !rule.constrains(tick) {
            continue;
        }
        match evaluate_at(tick)? {
            TickResult::Evaluated(evaluation) if evaluation.is_truthy() => {}
            TickResult::Evaluated(evaluation) => {
                return Ok(WindowVerdict::Failed {
                    tick,
                    elapsed_secs: tick_seconds(tick),
                    trace: evaluation.trace,
                })
            }
            TickResult::Unresolved(reason) => return Ok(WindowVerdict::Ignored { reason }),
        }
    }

    if let Some(expected) = rule.final_expectation() {
        match evaluate_at(0)? {
            TickResult::Evaluated(evaluation) if evaluation.is_truthy() == expected => {}
            TickResult::Evaluated(evaluation) => {
                return Ok(WindowVerdict::Failed {
                    tick: 0,
                    elapsed_secs: (len / TICKS_PER_SECOND) as u64,
                    trace: evaluation.trace,
                })
            }
            TickResult::Unresolved(reason) => return Ok(WindowVerdict::Ignored { reason }),
        }
    }

    Ok(WindowVerdict::Passed)
}

/// `H:MM:SS` rendering of a run offset
pub fn format_elapsed(secs: u64) -> String {
    let elapsed = chrono::Duration::seconds(secs as i64);
    format!(
        "{}:{:02}:{:02}",
        elapsed.num_hours(),
        elapsed.num_minutes() % 60,
        elapsed.num_seconds() % 60
    )
}
