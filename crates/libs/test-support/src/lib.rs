//! Scripted fakes for the bridge's collaborators: the vendor engagement
//! SDK, the host platform, and the preference store. Behavior is plain
//! in-memory state plus per-operation failure injection, so tests can
//! drive every contract in the bridge without a device.

use engage_bridge::channel::{MethodResponse, ResultSink};
use engage_bridge::platform::{HostPlatform, TokenCallback};
use engage_bridge::store::{PreferenceStore, StoreError};
use engage_bridge::vendor::{
    DeviceInfo, EngageOptions, GeofenceStatus, InboxAction, InboxMessage, PushMessage,
    RequestStatus, VendorError, VendorSdk,
};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Captured output slot for a [`ResultSink`], so tests can assert on what
/// the bridge resolved (or that nothing was resolved yet).
#[derive(Clone, Default)]
pub struct CapturedResponse {
    slot: Arc<Mutex<Option<MethodResponse>>>,
}

impl CapturedResponse {
    pub fn take(&self) -> Option<MethodResponse> {
        lock(&self.slot).take()
    }
}

/// A sink wired to an in-memory capture slot.
pub fn capture_sink() -> (ResultSink, CapturedResponse) {
    let captured = CapturedResponse::default();
    let slot = Arc::clone(&captured.slot);
    let sink = ResultSink::new(move |response| {
        *lock(&slot) = Some(response);
    });
    (sink, captured)
}

enum ReadinessScript {
    Fixed(bool),
    AfterChecks(u32),
}

#[derive(Default)]
struct VendorState {
    alias: Option<String>,
    push_enabled: bool,
    token: Option<String>,
    tags: BTreeSet<String>,
    attributes: BTreeMap<String, JsonValue>,
    custom_attribute_values: BTreeMap<String, String>,
    inbox: Vec<InboxMessage>,
    device_info: DeviceInfo,
    device_registered: bool,
    foreground_notifications: bool,
    badge_removed: bool,
    engaged_with: Vec<EngageOptions>,
    re_engage_calls: usize,
    logouts: Vec<bool>,
    triggered_events: Vec<String>,
    statistics: Vec<(i64, String, InboxAction)>,
    processed_messages: Vec<PushMessage>,
}

/// In-memory stand-in for the vendor SDK singleton.
pub struct FakeVendorSdk {
    state: Mutex<VendorState>,
    readiness: Mutex<ReadinessScript>,
    failures: Mutex<BTreeMap<&'static str, String>>,
    rejections: Mutex<BTreeSet<&'static str>>,
}

impl Default for FakeVendorSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeVendorSdk {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(VendorState::default()),
            readiness: Mutex::new(ReadinessScript::Fixed(false)),
            failures: Mutex::new(BTreeMap::new()),
            rejections: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        *lock(&self.readiness) = ReadinessScript::Fixed(ready);
    }

    /// Become ready once the readiness flag has been checked `checks` times.
    pub fn become_ready_after_checks(&self, checks: u32) {
        *lock(&self.readiness) = ReadinessScript::AfterChecks(checks);
    }

    fn fail(&self, op: &'static str, message: &str) {
        lock(&self.failures).insert(op, message.to_string());
    }

    fn check(&self, op: &'static str) -> Result<(), VendorError> {
        match lock(&self.failures).get(op) {
            Some(message) => Err(VendorError::new(message.clone())),
            None => Ok(()),
        }
    }

    fn status_for(&self, op: &'static str) -> RequestStatus {
        if lock(&self.rejections).contains(op) {
            RequestStatus::Failure
        } else {
            RequestStatus::Success
        }
    }

    pub fn fail_re_engage(&self, message: &str) {
        self.fail("re_engage", message);
    }

    pub fn fail_engage(&self, message: &str) {
        self.fail("engage", message);
    }

    pub fn fail_device_info(&self, message: &str) {
        self.fail("device_info", message);
    }

    pub fn fail_process_push_message(&self, message: &str) {
        self.fail("process_push_message", message);
    }

    pub fn fail_token_refresh(&self, message: &str) {
        self.fail("handle_token_refresh", message);
    }

    pub fn fail_set_token(&self, message: &str) {
        self.fail("set_token", message);
    }

    pub fn reject_push_enabled_updates(&self) {
        lock(&self.rejections).insert("set_push_enabled");
    }

    pub fn reject_tag_updates(&self) {
        lock(&self.rejections).insert("add_tag");
        lock(&self.rejections).insert("remove_tag");
    }

    pub fn set_device_info(&self, info: DeviceInfo) {
        lock(&self.state).device_info = info;
    }

    pub fn set_inbox(&self, messages: Vec<InboxMessage>) {
        lock(&self.state).inbox = messages;
    }

    pub fn set_custom_attribute_values(&self, values: BTreeMap<String, String>) {
        lock(&self.state).custom_attribute_values = values;
    }

    pub fn set_device_registered(&self, registered: bool) {
        lock(&self.state).device_registered = registered;
    }

    pub fn engaged_with(&self) -> Vec<EngageOptions> {
        lock(&self.state).engaged_with.clone()
    }

    pub fn re_engage_calls(&self) -> usize {
        lock(&self.state).re_engage_calls
    }

    pub fn token(&self) -> Option<String> {
        lock(&self.state).token.clone()
    }

    pub fn logouts(&self) -> Vec<bool> {
        lock(&self.state).logouts.clone()
    }

    pub fn triggered_events(&self) -> Vec<String> {
        lock(&self.state).triggered_events.clone()
    }

    pub fn statistics(&self) -> Vec<(i64, String, InboxAction)> {
        lock(&self.state).statistics.clone()
    }

    pub fn processed_messages(&self) -> Vec<PushMessage> {
        lock(&self.state).processed_messages.clone()
    }

    pub fn attributes(&self) -> BTreeMap<String, JsonValue> {
        lock(&self.state).attributes.clone()
    }

    pub fn foreground_notifications(&self) -> bool {
        lock(&self.state).foreground_notifications
    }

    pub fn badge_removed(&self) -> bool {
        lock(&self.state).badge_removed
    }
}

impl VendorSdk for FakeVendorSdk {
    fn engage(&self, options: EngageOptions) -> Result<(), VendorError> {
        self.check("engage")?;
        lock(&self.state).engaged_with.push(options);
        self.set_ready(true);
        Ok(())
    }

    fn re_engage(&self) -> Result<(), VendorError> {
        lock(&self.state).re_engage_calls += 1;
        self.check("re_engage")
    }

    fn is_ready(&self) -> bool {
        let mut script = lock(&self.readiness);
        match &mut *script {
            ReadinessScript::Fixed(ready) => *ready,
            ReadinessScript::AfterChecks(remaining) => {
                if *remaining == 0 {
                    true
                } else {
                    *remaining -= 1;
                    false
                }
            }
        }
    }

    fn device_info(&self) -> Result<DeviceInfo, VendorError> {
        self.check("device_info")?;
        Ok(lock(&self.state).device_info.clone())
    }

    fn alias(&self) -> Result<Option<String>, VendorError> {
        self.check("alias")?;
        Ok(lock(&self.state).alias.clone())
    }

    fn set_alias(&self, alias: &str, _resend: bool) -> Result<(), VendorError> {
        self.check("set_alias")?;
        lock(&self.state).alias = Some(alias.to_string());
        Ok(())
    }

    fn is_push_enabled(&self) -> Result<bool, VendorError> {
        self.check("is_push_enabled")?;
        Ok(lock(&self.state).push_enabled)
    }

    fn set_push_enabled(&self, enabled: bool) -> Result<RequestStatus, VendorError> {
        self.check("set_push_enabled")?;
        let status = self.status_for("set_push_enabled");
        if status == RequestStatus::Success {
            lock(&self.state).push_enabled = enabled;
        }
        Ok(status)
    }

    fn add_tag(&self, tag: &str) -> Result<RequestStatus, VendorError> {
        self.check("add_tag")?;
        let status = self.status_for("add_tag");
        if status == RequestStatus::Success {
            lock(&self.state).tags.insert(tag.to_string());
        }
        Ok(status)
    }

    fn remove_tag(&self, tag: &str) -> Result<RequestStatus, VendorError> {
        self.check("remove_tag")?;
        let status = self.status_for("remove_tag");
        if status == RequestStatus::Success {
            lock(&self.state).tags.remove(tag);
        }
        Ok(status)
    }

    fn tags(&self) -> Result<BTreeSet<String>, VendorError> {
        self.check("tags")?;
        Ok(lock(&self.state).tags.clone())
    }

    fn set_attributes(&self, attributes: BTreeMap<String, JsonValue>) -> Result<(), VendorError> {
        self.check("set_attributes")?;
        lock(&self.state).attributes.extend(attributes);
        Ok(())
    }

    fn custom_attributes(&self, keys: &[String]) -> Result<BTreeMap<String, String>, VendorError> {
        self.check("custom_attributes")?;
        let state = lock(&self.state);
        Ok(keys
            .iter()
            .filter_map(|key| {
                state.custom_attribute_values.get(key).map(|value| (key.clone(), value.clone()))
            })
            .collect())
    }

    fn fetch_inbox_message(&self, template_id: i64) -> Result<InboxMessage, VendorError> {
        self.check("fetch_inbox_message")?;
        lock(&self.state)
            .inbox
            .iter()
            .find(|message| message.template_id == template_id)
            .cloned()
            .ok_or_else(|| VendorError::new(format!("no inbox message for template {template_id}")))
    }

    fn fetch_inbox_messages(&self) -> Result<Vec<InboxMessage>, VendorError> {
        self.check("fetch_inbox_messages")?;
        Ok(lock(&self.state).inbox.clone())
    }

    fn set_token(&self, token: &str) -> Result<(), VendorError> {
        self.check("set_token")?;
        lock(&self.state).token = Some(token.to_string());
        Ok(())
    }

    fn logout(&self, push_enabled: bool) -> Result<(), VendorError> {
        self.check("logout")?;
        lock(&self.state).logouts.push(push_enabled);
        Ok(())
    }

    fn is_device_registered(&self) -> Result<bool, VendorError> {
        self.check("is_device_registered")?;
        Ok(lock(&self.state).device_registered)
    }

    fn start_geofencing(&self) -> Result<GeofenceStatus, VendorError> {
        self.check("start_geofencing")?;
        Ok(GeofenceStatus::Started)
    }

    fn stop_geofencing(&self) -> Result<GeofenceStatus, VendorError> {
        self.check("stop_geofencing")?;
        Ok(GeofenceStatus::Stopped)
    }

    fn trigger_in_app(&self, event: &str) -> Result<(), VendorError> {
        self.check("trigger_in_app")?;
        lock(&self.state).triggered_events.push(event.to_string());
        Ok(())
    }

    fn report_inbox_statistic(
        &self,
        template_id: i64,
        event_id: &str,
        action: InboxAction,
    ) -> Result<(), VendorError> {
        self.check("report_inbox_statistic")?;
        lock(&self.state).statistics.push((template_id, event_id.to_string(), action));
        Ok(())
    }

    fn remove_badge_number(&self) -> Result<(), VendorError> {
        self.check("remove_badge_number")?;
        lock(&self.state).badge_removed = true;
        Ok(())
    }

    fn set_foreground_notifications(&self, enabled: bool) -> Result<(), VendorError> {
        self.check("set_foreground_notifications")?;
        lock(&self.state).foreground_notifications = enabled;
        Ok(())
    }

    fn process_push_message(&self, message: &PushMessage) -> Result<(), VendorError> {
        self.check("process_push_message")?;
        lock(&self.state).processed_messages.push(message.clone());
        Ok(())
    }

    fn handle_token_refresh(&self, token: &str) -> Result<(), VendorError> {
        self.check("handle_token_refresh")?;
        lock(&self.state).token = Some(token.to_string());
        Ok(())
    }
}

enum TokenScript {
    Immediate(Result<String, String>),
    Deferred,
}

/// In-memory stand-in for the host operating system.
pub struct FakeHostPlatform {
    os_release: Mutex<String>,
    api_level: Mutex<u32>,
    granted: Mutex<BTreeSet<String>>,
    rationale: Mutex<BTreeSet<String>>,
    permission_requests: Mutex<Vec<(String, u32)>>,
    token_script: Mutex<TokenScript>,
    deferred_token_callbacks: Mutex<Vec<TokenCallback>>,
}

impl Default for FakeHostPlatform {
    fn default() -> Self {
        Self::with_api_level(34)
    }
}

impl FakeHostPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_level(api_level: u32) -> Self {
        Self {
            os_release: Mutex::new("14".to_string()),
            api_level: Mutex::new(api_level),
            granted: Mutex::new(BTreeSet::new()),
            rationale: Mutex::new(BTreeSet::new()),
            permission_requests: Mutex::new(Vec::new()),
            token_script: Mutex::new(TokenScript::Immediate(Ok("fake-push-token".to_string()))),
            deferred_token_callbacks: Mutex::new(Vec::new()),
        }
    }

    pub fn set_os_release(&self, release: &str) {
        *lock(&self.os_release) = release.to_string();
    }

    pub fn grant(&self, permission: &str) {
        lock(&self.granted).insert(permission.to_string());
    }

    pub fn set_show_rationale(&self, permission: &str, show: bool) {
        if show {
            lock(&self.rationale).insert(permission.to_string());
        } else {
            lock(&self.rationale).remove(permission);
        }
    }

    /// Permission requests issued so far, as `(permission, request_code)`.
    pub fn permission_requests(&self) -> Vec<(String, u32)> {
        lock(&self.permission_requests).clone()
    }

    pub fn set_push_token(&self, token: &str) {
        *lock(&self.token_script) = TokenScript::Immediate(Ok(token.to_string()));
    }

    pub fn fail_push_token(&self, message: &str) {
        *lock(&self.token_script) = TokenScript::Immediate(Err(message.to_string()));
    }

    /// Park token callbacks instead of answering synchronously; release
    /// them later with [`deliver_push_token`](Self::deliver_push_token).
    pub fn defer_push_token(&self) {
        *lock(&self.token_script) = TokenScript::Deferred;
    }

    pub fn deliver_push_token(&self, result: Result<String, String>) {
        let callbacks: Vec<TokenCallback> = lock(&self.deferred_token_callbacks).drain(..).collect();
        for callback in callbacks {
            callback(result.clone());
        }
    }
}

impl HostPlatform for FakeHostPlatform {
    fn os_release(&self) -> String {
        lock(&self.os_release).clone()
    }

    fn api_level(&self) -> u32 {
        *lock(&self.api_level)
    }

    fn is_permission_granted(&self, permission: &str) -> bool {
        lock(&self.granted).contains(permission)
    }

    fn should_show_rationale(&self, permission: &str) -> bool {
        lock(&self.rationale).contains(permission)
    }

    fn request_permission(&self, permission: &str, request_code: u32) {
        lock(&self.permission_requests).push((permission.to_string(), request_code));
    }

    fn fetch_push_token(&self, callback: TokenCallback) {
        let script = lock(&self.token_script);
        match &*script {
            TokenScript::Immediate(result) => {
                let result = result.clone();
                drop(script);
                callback(result);
            }
            TokenScript::Deferred => {
                drop(script);
                lock(&self.deferred_token_callbacks).push(callback);
            }
        }
    }
}

/// In-memory preference store with optional persist-failure injection.
#[derive(Default)]
pub struct InMemoryPreferenceStore {
    entries: Mutex<BTreeMap<String, BTreeSet<String>>>,
    put_failure: Mutex<Option<String>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_puts(&self, message: &str) {
        *lock(&self.put_failure) = Some(message.to_string());
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn string_set(&self, key: &str) -> BTreeSet<String> {
        lock(&self.entries).get(key).cloned().unwrap_or_default()
    }

    fn put_string_set(&self, key: &str, values: &BTreeSet<String>) -> Result<(), StoreError> {
        if let Some(message) = lock(&self.put_failure).clone() {
            return Err(StoreError::new(message));
        }
        lock(&self.entries).insert(key.to_string(), values.clone());
        Ok(())
    }
}
