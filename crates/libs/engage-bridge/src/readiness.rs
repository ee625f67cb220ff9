use crate::vendor::VendorSdk;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cooperative stop signal for a waiting readiness gate. Cloning shares the
/// underlying flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadinessOutcome {
    Ready,
    TimedOut,
    Cancelled,
}

/// Bounded wait for the vendor SDK's readiness flag.
///
/// Best-effort by contract: whatever the outcome, control returns to the
/// caller within `poll_interval * max_attempts` of invocation, and callers
/// that depend on readiness re-check the flag themselves afterwards. The
/// poll loop blocks its calling thread, so callers on a thread that must
/// stay responsive dispatch the wait off-thread first.
#[derive(Clone, Copy, Debug)]
pub struct ReadinessGate {
    poll_interval: Duration,
    max_attempts: u32,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self { poll_interval: Duration::from_millis(200), max_attempts: 20 }
    }
}

impl ReadinessGate {
    pub fn new(poll_interval: Duration, max_attempts: u32) -> Self {
        Self { poll_interval, max_attempts }
    }

    pub fn ensure_ready(&self, sdk: &dyn VendorSdk, cancel: &CancelToken) -> ReadinessOutcome {
        if !sdk.is_ready() {
            // Trigger errors degrade the gate to polling only; the caller's
            // delivery path must not fail because engagement did.
            if let Err(err) = sdk.re_engage() {
                log::warn!("re-engagement before readiness wait failed: {err}");
            }
        }

        let mut attempts = 0;
        while !sdk.is_ready() {
            if cancel.is_cancelled() {
                return ReadinessOutcome::Cancelled;
            }
            if attempts >= self.max_attempts {
                return ReadinessOutcome::TimedOut;
            }
            attempts += 1;
            std::thread::sleep(self.poll_interval);
        }
        ReadinessOutcome::Ready
    }
}
