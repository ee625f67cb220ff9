use crate::channel::{MethodResponse, ResultSink};
use crate::error::{NEGOTIATION_IN_FLIGHT, PERMISSION_PERMANENTLY_DENIED};
use crate::platform::HostPlatform;
use crate::store::PreferenceStore;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Runtime notification permission identifier.
pub const POST_NOTIFICATIONS_PERMISSION: &str = "android.permission.POST_NOTIFICATIONS";

/// Storage key for the set of permissions already presented to the user.
pub const REQUESTED_PERMISSIONS_KEY: &str = "requested_permissions";

/// API level that introduced the explicit runtime notification permission.
/// Below it the permission concept does not apply and negotiation
/// short-circuits to granted.
pub const RUNTIME_PERMISSION_API_LEVEL: u32 = 33;

const FIRST_REQUEST_CODE: u32 = 190;

/// Terminal outcomes of one negotiation cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NegotiationOutcome {
    Granted,
    DeniedRetryable,
    DeniedPermanent,
}

impl NegotiationOutcome {
    /// Wire mapping: granted and retryable denial are boolean successes so
    /// the host can re-ask later; permanent denial is the distinguished
    /// error that points the user at system settings.
    pub fn into_response(self) -> MethodResponse {
        match self {
            Self::Granted => MethodResponse::success(true),
            Self::DeniedRetryable => MethodResponse::success(false),
            Self::DeniedPermanent => MethodResponse::error(
                PERMISSION_PERMANENTLY_DENIED,
                "Permission is permanently denied. Go to system settings and enable the \
                 notification permission",
            ),
        }
    }
}

struct PendingNegotiation {
    permission: String,
    sink: ResultSink,
}

/// Drives a runtime notification-permission request to a terminal outcome.
///
/// Outstanding response sinks are parked in a request-code-keyed map behind
/// a mutex, so a late OS callback and a new negotiation can never race over
/// a shared slot. One cycle may be in flight at a time; starting a second
/// one is a precondition violation reported to the second caller, never a
/// silent overwrite that orphans the first.
pub struct PermissionNegotiator {
    next_request_code: AtomicU32,
    pending: Mutex<BTreeMap<u32, PendingNegotiation>>,
}

impl Default for PermissionNegotiator {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionNegotiator {
    pub fn new() -> Self {
        Self {
            next_request_code: AtomicU32::new(FIRST_REQUEST_CODE),
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    /// Begin a negotiation cycle for the notification permission. The sink
    /// is resolved immediately for short-circuit outcomes and parked until
    /// the OS result callback otherwise.
    pub fn request(
        &self,
        platform: &dyn HostPlatform,
        store: &dyn PreferenceStore,
        sink: ResultSink,
    ) {
        if platform.api_level() < RUNTIME_PERMISSION_API_LEVEL {
            // No runtime permission concept on this platform version.
            sink.resolve(NegotiationOutcome::Granted.into_response());
            return;
        }
        if platform.is_permission_granted(POST_NOTIFICATIONS_PERMISSION) {
            sink.resolve(NegotiationOutcome::Granted.into_response());
            return;
        }

        // Precondition: one cycle in flight at a time. Checking before the
        // persisted set is inspected keeps a premature second caller from
        // being misreported as permanently denied.
        let mut pending = match self.pending.lock() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !pending.is_empty() {
            sink.resolve(MethodResponse::error(
                NEGOTIATION_IN_FLIGHT,
                "a notification permission request is already awaiting its result",
            ));
            return;
        }

        let mut requested = store.string_set(REQUESTED_PERMISSIONS_KEY);
        let first_request = !requested.contains(POST_NOTIFICATIONS_PERMISSION);
        if first_request || platform.should_show_rationale(POST_NOTIFICATIONS_PERMISSION) {
            if first_request {
                requested.insert(POST_NOTIFICATIONS_PERMISSION.to_string());
                // Bookkeeping is best-effort: a failed persist must not
                // abort the OS request that is about to be issued.
                if let Err(err) = store.put_string_set(REQUESTED_PERMISSIONS_KEY, &requested) {
                    log::warn!("failed to persist requested-permission set: {err}");
                }
            }

            let request_code = self.next_request_code.fetch_add(1, Ordering::SeqCst);
            pending.insert(
                request_code,
                PendingNegotiation { permission: POST_NOTIFICATIONS_PERMISSION.to_string(), sink },
            );
            drop(pending);
            platform.request_permission(POST_NOTIFICATIONS_PERMISSION, request_code);
        } else {
            drop(pending);
            // Requested before, no rationale: the OS would silently refuse
            // a repeat request.
            sink.resolve(NegotiationOutcome::DeniedPermanent.into_response());
        }
    }

    /// OS permission-result entry point. Returns whether the callback was
    /// consumed; a request code with no parked negotiation is ignored and
    /// left for other listeners.
    pub fn on_permission_result(&self, request_code: u32, results: &[(String, bool)]) -> bool {
        let entry = {
            let mut pending = match self.pending.lock() {
                Ok(pending) => pending,
                Err(poisoned) => poisoned.into_inner(),
            };
            match pending.remove(&request_code) {
                Some(entry) => entry,
                None => return false,
            }
        };

        let outcome = results
            .iter()
            .find(|(permission, _)| permission == &entry.permission)
            .map(|(_, granted)| {
                if *granted {
                    NegotiationOutcome::Granted
                } else {
                    NegotiationOutcome::DeniedRetryable
                }
            })
            // A matching request code without the negotiated permission in
            // its payload counts as a denial for this cycle.
            .unwrap_or(NegotiationOutcome::DeniedRetryable);
        entry.sink.resolve(outcome.into_response());
        true
    }

    pub fn has_pending(&self) -> bool {
        match self.pending.lock() {
            Ok(pending) => !pending.is_empty(),
            Err(poisoned) => !poisoned.into_inner().is_empty(),
        }
    }
}
