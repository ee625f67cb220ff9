/// One-shot callback for asynchronous push-token retrieval. May be invoked
/// on any thread owned by the host platform.
pub type TokenCallback = Box<dyn FnOnce(Result<String, String>) + Send>;

/// Facilities the host operating system provides to the bridge.
///
/// Construction takes whatever context the platform needs explicitly; the
/// bridge never reaches into host internals to wire one up.
pub trait HostPlatform: Send + Sync {
    /// OS release string, e.g. `"14"`.
    fn os_release(&self) -> String;

    /// Numeric platform API level used for permission-policy decisions.
    fn api_level(&self) -> u32;

    fn is_permission_granted(&self, permission: &str) -> bool;

    /// Platform signal that the user should see an explanation before the
    /// permission is requested again.
    fn should_show_rationale(&self, permission: &str) -> bool;

    /// Issue an OS-level permission request correlated by `request_code`.
    /// The eventual result arrives through the bridge's permission-result
    /// entry point, possibly on another thread.
    fn request_permission(&self, permission: &str, request_code: u32);

    /// Fetch the current push token asynchronously.
    fn fetch_push_token(&self, callback: TokenCallback);
}
