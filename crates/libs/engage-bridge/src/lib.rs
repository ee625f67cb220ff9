//! Method-channel bridge between a host application framework and a
//! third-party mobile engagement/push SDK.
//!
//! The host delivers named method calls with positional arguments; the
//! bridge forwards each one to the vendor SDK handle and resolves a
//! one-shot response sink with either a success payload or a structured
//! `{code, message}` error. The vendor SDK itself is an opaque
//! collaborator behind the [`VendorSdk`] trait.

pub mod channel;
pub mod classify;
pub mod dispatch;
pub mod error;
pub mod method;
pub mod permission;
pub mod platform;
pub mod push_handler;
pub mod readiness;
pub mod serialize;
pub mod store;
pub mod vendor;

pub use channel::{Args, MethodCall, MethodResponse, ResponseError, ResultSink};
pub use classify::{classify, MessageOwnership, VENDOR_PAYLOAD_KEY};
pub use dispatch::BridgeDispatcher;
pub use error::BridgeError;
pub use method::Method;
pub use permission::{
    NegotiationOutcome, PermissionNegotiator, POST_NOTIFICATIONS_PERMISSION,
    REQUESTED_PERMISSIONS_KEY, RUNTIME_PERMISSION_API_LEVEL,
};
pub use platform::HostPlatform;
pub use push_handler::PushMessageHandler;
pub use readiness::{CancelToken, ReadinessGate, ReadinessOutcome};
pub use store::{FilePreferenceStore, PreferenceStore, StoreError};
pub use vendor::{
    DeviceInfo, EngageOptions, GeofenceStatus, InboxAction, InboxMessage, NotificationMode,
    PushMessage, RequestStatus, ServerEnvironment, VendorError, VendorSdk,
};

/// Name of the method channel the host framework binds this bridge to.
pub const CHANNEL_NAME: &str = "engage_sdk";
