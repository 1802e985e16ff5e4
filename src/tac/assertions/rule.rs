//! Rule prefixes selecting the time-windowing semantics of an assertion

use std::fmt;
use std::ops::Range;

use crate::tac::samples::tick_seconds;

lazy_static::lazy_static! {
    static ref RULE_PATTERN: regex::Regex = regex::Regex::new(
        r"^(?:ANY_EXCEPT_LAST|ANY|LAST|SPAN\[([0-9]+):([0-9]+)\])$"
    ).expect("Failed to compile rule prefix pattern");
}

/// Leading keyword of an assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RulePrefix {
    /// Evaluate once, on the final aggregate sample
    Last,
    /// Must hold on every forward tick
    Any,
    /// Must hold on every forward tick but no longer on the final sample
    AnyExceptLast,
    /// Must hold on forward ticks whose offset in seconds is in `start..=end`
    Span { start: u64, end: u64 },
}

/// Result of matching a word against the rule grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMatch {
    /// Not a rule prefix
    NoMatch,
    Rule(RulePrefix),
    /// `SPAN[a:b]` with `b < a`
    InvalidSpan,
}

impl RulePrefix {
    /// Classify a whole word
    pub fn parse(word: &str) -> RuleMatch {
        let Some(caps) = RULE_PATTERN.captures(word) else {
            return RuleMatch::NoMatch;
        };
        match (caps.get(1), caps.get(2)) {
            (Some(start), Some(end)) => {
                // digits only, overflow is the only failure mode
                let (Ok(start), Ok(end)) = (start.as_str().parse(), end.as_str().parse()) else {
                    return RuleMatch::InvalidSpan;
                };
                if end >= start {
                    RuleMatch::Rule(RulePrefix::Span { start, end })
                } else {
                    RuleMatch::InvalidSpan
                }
            }
            _ => match word {
                "ANY" => RuleMatch::Rule(RulePrefix::Any),
                "ANY_EXCEPT_LAST" => RuleMatch::Rule(RulePrefix::AnyExceptLast),
                _ => RuleMatch::Rule(RulePrefix::Last),
            },
        }
    }

    /// Forward ticks scanned for a history of `len` samples
    pub fn forward_ticks(&self, len: usize) -> Range<usize> {
        match self {
            RulePrefix::Last => 0..0,
            RulePrefix::Any | RulePrefix::Span { .. } => 1..len.max(1),
            RulePrefix::AnyExceptLast => 1..len.saturating_sub(1).max(1),
        }
    }

    /// Whether a forward tick's result counts towards the verdict
    pub fn constrains(&self, tick: usize) -> bool {
        match self {
            RulePrefix::Span { start, end } => {
                let sec = tick_seconds(tick);
                *start <= sec && sec <= *end
            }
            _ => true,
        }
    }

    /// Whether the final aggregate sample is evaluated, and the truth value
    /// it must have for the assertion to pass
    pub fn final_expectation(&self) -> Option<bool> {
        match self {
            RulePrefix::Last => Some(true),
            RulePrefix::AnyExceptLast => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for RulePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulePrefix::Last => f.write_str("LAST"),
            RulePrefix::Any => f.write_str("ANY"),
            RulePrefix::AnyExceptLast => f.write_str("ANY_EXCEPT_LAST"),
            RulePrefix::Span { start, end } => write!(f, "SPAN[{}:{}]", start, end),
        }
    }
}
