//! Permission-negotiation tests, run as integration tests so the scripted
//! fakes from `test-support` implement the same trait instance under test.

use engage_bridge::error::{NEGOTIATION_IN_FLIGHT, PERMISSION_PERMANENTLY_DENIED};
use engage_bridge::{
    MethodResponse, PermissionNegotiator, PreferenceStore, POST_NOTIFICATIONS_PERMISSION,
    REQUESTED_PERMISSIONS_KEY, RUNTIME_PERMISSION_API_LEVEL,
};
use test_support::{capture_sink, FakeHostPlatform, InMemoryPreferenceStore};

fn negotiator() -> PermissionNegotiator {
    PermissionNegotiator::new()
}

#[test]
fn platforms_below_the_policy_level_grant_without_a_request() {
    let platform = FakeHostPlatform::with_api_level(RUNTIME_PERMISSION_API_LEVEL - 1);
    let store = InMemoryPreferenceStore::new();
    let (sink, response) = capture_sink();

    negotiator().request(&platform, &store, sink);

    assert_eq!(response.take().expect("resolved"), MethodResponse::success(true));
    assert!(platform.permission_requests().is_empty());
    assert!(store.string_set(REQUESTED_PERMISSIONS_KEY).is_empty());
}

#[test]
fn os_level_grant_short_circuits() {
    let platform = FakeHostPlatform::with_api_level(34);
    platform.grant(POST_NOTIFICATIONS_PERMISSION);
    let store = InMemoryPreferenceStore::new();
    let (sink, response) = capture_sink();

    negotiator().request(&platform, &store, sink);

    assert_eq!(response.take().expect("resolved"), MethodResponse::success(true));
    assert!(platform.permission_requests().is_empty());
}

#[test]
fn first_request_persists_and_issues_exactly_one_os_request() {
    let platform = FakeHostPlatform::with_api_level(34);
    let store = InMemoryPreferenceStore::new();
    let negotiator = negotiator();
    let (sink, response) = capture_sink();

    negotiator.request(&platform, &store, sink);

    assert!(response.take().is_none(), "must await the OS result");
    let requests = platform.permission_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, POST_NOTIFICATIONS_PERMISSION);
    assert!(store
        .string_set(REQUESTED_PERMISSIONS_KEY)
        .contains(POST_NOTIFICATIONS_PERMISSION));
    assert!(negotiator.has_pending());
}

#[test]
fn matching_grant_resolves_granted() {
    let platform = FakeHostPlatform::with_api_level(34);
    let store = InMemoryPreferenceStore::new();
    let negotiator = negotiator();
    let (sink, response) = capture_sink();
    negotiator.request(&platform, &store, sink);
    let request_code = platform.permission_requests()[0].1;

    let consumed = negotiator
        .on_permission_result(request_code, &[(POST_NOTIFICATIONS_PERMISSION.to_string(), true)]);

    assert!(consumed);
    assert_eq!(response.take().expect("resolved"), MethodResponse::success(true));
    assert!(!negotiator.has_pending());
}

#[test]
fn matching_denial_resolves_retryable() {
    let platform = FakeHostPlatform::with_api_level(34);
    let store = InMemoryPreferenceStore::new();
    let negotiator = negotiator();
    let (sink, response) = capture_sink();
    negotiator.request(&platform, &store, sink);
    let request_code = platform.permission_requests()[0].1;

    negotiator.on_permission_result(
        request_code,
        &[(POST_NOTIFICATIONS_PERMISSION.to_string(), false)],
    );

    assert_eq!(response.take().expect("resolved"), MethodResponse::success(false));
}

#[test]
fn non_matching_request_codes_are_ignored() {
    let platform = FakeHostPlatform::with_api_level(34);
    let store = InMemoryPreferenceStore::new();
    let negotiator = negotiator();
    let (sink, response) = capture_sink();
    negotiator.request(&platform, &store, sink);
    let request_code = platform.permission_requests()[0].1;

    let consumed = negotiator
        .on_permission_result(request_code + 1, &[("other.permission".to_string(), true)]);

    assert!(!consumed);
    assert!(response.take().is_none(), "parked sink must be untouched");
    assert!(negotiator.has_pending());
}

#[test]
fn previously_requested_without_rationale_is_permanently_denied() {
    let platform = FakeHostPlatform::with_api_level(34);
    let store = InMemoryPreferenceStore::new();
    let mut requested = std::collections::BTreeSet::new();
    requested.insert(POST_NOTIFICATIONS_PERMISSION.to_string());
    store.put_string_set(REQUESTED_PERMISSIONS_KEY, &requested).expect("seed");
    let (sink, response) = capture_sink();

    negotiator().request(&platform, &store, sink);

    let resolved = response.take().expect("resolved");
    assert_eq!(
        resolved.error.expect("distinguished error").code,
        PERMISSION_PERMANENTLY_DENIED
    );
    assert!(platform.permission_requests().is_empty());
}

#[test]
fn rationale_signal_re_requests_even_after_previous_attempt() {
    let platform = FakeHostPlatform::with_api_level(34);
    platform.set_show_rationale(POST_NOTIFICATIONS_PERMISSION, true);
    let store = InMemoryPreferenceStore::new();
    let mut requested = std::collections::BTreeSet::new();
    requested.insert(POST_NOTIFICATIONS_PERMISSION.to_string());
    store.put_string_set(REQUESTED_PERMISSIONS_KEY, &requested).expect("seed");
    let (sink, response) = capture_sink();

    negotiator().request(&platform, &store, sink);

    assert!(response.take().is_none(), "must await the OS result");
    assert_eq!(platform.permission_requests().len(), 1);
}

#[test]
fn second_negotiation_in_flight_is_a_detectable_violation() {
    let platform = FakeHostPlatform::with_api_level(34);
    let store = InMemoryPreferenceStore::new();
    let negotiator = negotiator();
    let (first_sink, first_response) = capture_sink();
    negotiator.request(&platform, &store, first_sink);
    let request_code = platform.permission_requests()[0].1;

    let (second_sink, second_response) = capture_sink();
    negotiator.request(&platform, &store, second_sink);

    let rejected = second_response.take().expect("second caller gets an error");
    assert_eq!(rejected.error.expect("error").code, NEGOTIATION_IN_FLIGHT);

    // The first negotiation still resolves normally.
    negotiator.on_permission_result(
        request_code,
        &[(POST_NOTIFICATIONS_PERMISSION.to_string(), true)],
    );
    assert_eq!(first_response.take().expect("resolved"), MethodResponse::success(true));
}

#[test]
fn store_persist_failure_does_not_abort_the_os_request() {
    let platform = FakeHostPlatform::with_api_level(34);
    let store = InMemoryPreferenceStore::new();
    store.fail_puts("disk full");
    let (sink, response) = capture_sink();

    negotiator().request(&platform, &store, sink);

    assert!(response.take().is_none(), "still awaiting the OS result");
    assert_eq!(platform.permission_requests().len(), 1);
}
