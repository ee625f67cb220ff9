use crate::classify::{classify, MessageOwnership};
use crate::readiness::{CancelToken, ReadinessGate};
use crate::vendor::{PushMessage, VendorSdk};
use std::sync::Arc;

/// Lets a host application's own push receiver delegate vendor messages to
/// the engagement SDK while keeping everything else for itself.
///
/// Delegation is deliberately fire-and-forget: once a message is classified
/// as vendor-owned it is handed over on the calling thread, faults inside
/// the delegate are logged and suppressed, and ownership never returns to
/// the caller. The host delivery path must not crash or retry because
/// vendor processing failed.
pub struct PushMessageHandler {
    sdk: Arc<dyn VendorSdk>,
    gate: ReadinessGate,
}

impl PushMessageHandler {
    pub fn new(sdk: Arc<dyn VendorSdk>) -> Self {
        Self { sdk, gate: ReadinessGate::default() }
    }

    pub fn with_gate(sdk: Arc<dyn VendorSdk>, gate: ReadinessGate) -> Self {
        Self { sdk, gate }
    }

    /// Whether the payload belongs to the vendor platform.
    pub fn can_handle(message: &PushMessage) -> bool {
        classify(Some(&message.data)) == MessageOwnership::OwnedByVendor
    }

    /// Delegate an owned message to the vendor SDK's processing entry point.
    ///
    /// Runs the readiness gate first; whether or not readiness was reached
    /// within its bound, the message is handed over, since the vendor side
    /// may still queue it.
    pub fn handle(&self, message: &PushMessage, cancel: &CancelToken) {
        self.gate.ensure_ready(self.sdk.as_ref(), cancel);
        if let Err(err) = self.sdk.process_push_message(message) {
            log::error!("vendor push processing failed: {err}");
        }
    }

    /// Forward a refreshed push token. Falls back to setting the token
    /// directly on the SDK handle when the update entry point fails; only
    /// when both fail is the error surfaced, and then only to the log.
    pub fn on_new_token(&self, token: &str, cancel: &CancelToken) {
        self.gate.ensure_ready(self.sdk.as_ref(), cancel);
        if let Err(err) = self.sdk.handle_token_refresh(token) {
            log::warn!("vendor token refresh failed, setting token directly: {err}");
            if let Err(err) = self.sdk.set_token(token) {
                log::error!("failed to update vendor push token: {err}");
            }
        }
    }
}
