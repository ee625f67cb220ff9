use crate::method::Method;
use crate::vendor::VendorError;

/// Distinguished code for a permanently denied notification permission, so
/// the host can direct the user to system settings instead of retrying.
pub const PERMISSION_PERMANENTLY_DENIED: &str = "PERMISSION_PERMANENTLY_DENIED";

/// Code reported when a permission negotiation is started while another one
/// is still awaiting its OS result.
pub const NEGOTIATION_IN_FLIGHT: &str = "NEGOTIATION_IN_FLIGHT";

/// Code for method names the bridge does not dispatch.
pub const NOT_IMPLEMENTED: &str = "NOT_IMPLEMENTED";

/// Failure of a single bridge operation.
///
/// Every externally triggered operation terminates in a success payload or a
/// structured error; `BridgeError` is the internal form before it is mapped
/// onto the wire `{code, message}` pair.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A positional argument was missing or had the wrong shape.
    #[error("{0}")]
    Argument(String),

    /// A delegated vendor SDK call failed.
    #[error(transparent)]
    Vendor(#[from] VendorError),

    /// The notification permission was denied before and the platform no
    /// longer signals a rationale; the OS would silently refuse a repeat
    /// request.
    #[error("permission is permanently denied; enable the notification permission in system settings")]
    PermissionPermanentlyDenied,

    /// A permission negotiation is already awaiting its OS result.
    #[error("a notification permission request is already in flight")]
    NegotiationInFlight,
}

impl BridgeError {
    pub fn missing_arg(index: usize, expected: &str) -> Self {
        Self::Argument(format!("missing argument at position {index}: expected {expected}"))
    }

    pub fn invalid_arg(index: usize, expected: &str) -> Self {
        Self::Argument(format!("argument at position {index} is not a valid {expected}"))
    }

    /// Wire code for this error when it failed the given operation.
    ///
    /// Plain argument and vendor failures carry the operation's own wire
    /// name; the two distinguished conditions keep their fixed codes.
    pub fn code_for(&self, method: Method) -> String {
        match self {
            Self::PermissionPermanentlyDenied => PERMISSION_PERMANENTLY_DENIED.to_string(),
            Self::NegotiationInFlight => NEGOTIATION_IN_FLIGHT.to_string(),
            Self::Argument(_) | Self::Vendor(_) => method.as_str().to_string(),
        }
    }
}
