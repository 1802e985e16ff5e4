//! Unit tests for rule windows over a run

use crate::common::*;
use tac::tac::assertions::{Assertion, CheckOutcome};

fn outcome(rule: &str, values: &[f64]) -> CheckOutcome {
    let topology = client_topology();
    let history = client_history("x", values);
    let mut assertion = Assertion::parse(rule, "window.assertions", 1).unwrap();
    assertion.check(&topology, &history).unwrap()
}

#[test]
fn test_any_ignores_final_sample() {
    assert_eq!(outcome("ANY cport1.x > 0", &[0.0, 1.0, 2.0]), CheckOutcome::Passed);
}

#[test]
fn test_any_fails_on_forward_tick() {
    assert!(matches!(
        outcome("ANY cport1.x > 0", &[5.0, 1.0, 0.0, 1.0]),
        CheckOutcome::Failed(_)
    ));
}

#[test]
fn test_any_except_last_skips_last_forward_tick() {
    // the last forward tick may already be falsy
    assert_eq!(
        outcome("ANY_EXCEPT_LAST cport1.x > 0", &[0.0, 1.0, 1.0, 0.0]),
        CheckOutcome::Passed
    );
}

#[test]
fn test_span_only_constrains_its_seconds() {
    // tick -> sec: 1->1 2->1 3->2 4->2 5->3
    let values = [0.0, 0.0, 0.0, 1.0, 1.0, 0.0];
    assert_eq!(outcome("SPAN[2:2] cport1.x > 0", &values), CheckOutcome::Passed);
    assert!(matches!(
        outcome("SPAN[2:3] cport1.x > 0", &values),
        CheckOutcome::Failed(_)
    ));
    assert!(matches!(
        outcome("SPAN[0:1] cport1.x > 0", &values),
        CheckOutcome::Failed(_)
    ));
}

#[test]
fn test_span_outside_run_passes() {
    assert_eq!(
        outcome("SPAN[100:200] cport1.x > 0", &[0.0, 0.0, 0.0]),
        CheckOutcome::Passed
    );
}

#[test]
fn test_single_sample_run() {
    assert_eq!(outcome("LAST cport1.x == 3", &[3.0]), CheckOutcome::Passed);
    assert_eq!(outcome("ANY cport1.x == 3", &[0.0]), CheckOutcome::Passed);
}

#[test]
fn test_empty_run_is_ignored() {
    assert!(matches!(
        outcome("LAST cport1.x == 3", &[]),
        CheckOutcome::Ignored(_)
    ));
}
