//! Readiness-gate tests, run as integration tests so the scripted fakes
//! from `test-support` implement the same trait instance under test.

use engage_bridge::readiness::{CancelToken, ReadinessGate, ReadinessOutcome};
use std::time::{Duration, Instant};
use test_support::FakeVendorSdk;

fn fast_gate() -> ReadinessGate {
    ReadinessGate::new(Duration::from_millis(1), 20)
}

#[test]
fn already_ready_returns_without_engaging() {
    let sdk = FakeVendorSdk::new();
    sdk.set_ready(true);
    let outcome = fast_gate().ensure_ready(&sdk, &CancelToken::new());
    assert_eq!(outcome, ReadinessOutcome::Ready);
    assert_eq!(sdk.re_engage_calls(), 0);
}

#[test]
fn not_ready_triggers_re_engagement_then_polls() {
    let sdk = FakeVendorSdk::new();
    sdk.become_ready_after_checks(3);
    let outcome = fast_gate().ensure_ready(&sdk, &CancelToken::new());
    assert_eq!(outcome, ReadinessOutcome::Ready);
    assert_eq!(sdk.re_engage_calls(), 1);
}

#[test]
fn wait_is_bounded_even_when_readiness_never_arrives() {
    let sdk = FakeVendorSdk::new();
    let gate = ReadinessGate::new(Duration::from_millis(1), 10);
    let started = Instant::now();
    let outcome = gate.ensure_ready(&sdk, &CancelToken::new());
    assert_eq!(outcome, ReadinessOutcome::TimedOut);
    // One interval of slack over the configured bound.
    assert!(started.elapsed() < Duration::from_millis(11 * 20));
}

#[test]
fn re_engagement_failure_degrades_to_polling() {
    let sdk = FakeVendorSdk::new();
    sdk.fail_re_engage("engagement backend unavailable");
    sdk.become_ready_after_checks(2);
    let outcome = fast_gate().ensure_ready(&sdk, &CancelToken::new());
    assert_eq!(outcome, ReadinessOutcome::Ready);
}

#[test]
fn cancellation_terminates_the_wait_immediately() {
    let sdk = FakeVendorSdk::new();
    let cancel = CancelToken::new();
    cancel.cancel();
    let outcome = ReadinessGate::default().ensure_ready(&sdk, &cancel);
    assert_eq!(outcome, ReadinessOutcome::Cancelled);
}
