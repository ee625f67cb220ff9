use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};

/// Failure reported by a delegated vendor SDK call. The vendor is opaque;
/// only its message survives the boundary.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct VendorError {
    pub message: String,
}

impl VendorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Server environments the engagement platform can be pointed at.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServerEnvironment {
    L3,
    L3Us,
    Emc,
    EmcUs,
    Croc,
    Test,
    Test55,
}

impl ServerEnvironment {
    pub const ALL: [Self; 7] =
        [Self::L3, Self::L3Us, Self::Emc, Self::EmcUs, Self::Croc, Self::Test, Self::Test55];

    pub fn from_index(index: i64) -> Result<Self, VendorError> {
        usize::try_from(index)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or_else(|| {
                VendorError::new(
                    "server must be one of L3 [0], L3_US [1], EMC [2], EMC_US [3], CROC [4], \
                     TEST [5], TEST55 [6] and a proper index provided",
                )
            })
    }

    /// Position of this environment in the channel's indexed encoding.
    pub fn index(self) -> i64 {
        Self::ALL.iter().position(|candidate| *candidate == self).unwrap_or_default() as i64
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::L3 => "L3",
            Self::L3Us => "L3_US",
            Self::Emc => "EMC",
            Self::EmcUs => "EMC_US",
            Self::Croc => "CROC",
            Self::Test => "TEST",
            Self::Test55 => "TEST55",
        }
    }
}

/// How pushes are surfaced while the application is foregrounded.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationMode {
    Background,
    Foreground,
    BackgroundAndForeground,
}

impl NotificationMode {
    /// Indexed decode with the contract's fallback: anything missing or out
    /// of range means background-and-foreground handling.
    pub fn from_index_or_default(index: Option<i64>) -> Self {
        match index {
            Some(0) => Self::Background,
            Some(1) => Self::Foreground,
            _ => Self::BackgroundAndForeground,
        }
    }

    pub fn index(self) -> i64 {
        match self {
            Self::Background => 0,
            Self::Foreground => 1,
            Self::BackgroundAndForeground => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Background => "BACKGROUND",
            Self::Foreground => "FOREGROUND",
            Self::BackgroundAndForeground => "BACKGROUND_AND_FOREGROUND",
        }
    }
}

/// Options applied when engaging the SDK for a tenant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EngageOptions {
    pub sdk_key: String,
    pub server: ServerEnvironment,
    pub app_id: String,
    pub tenant_id: String,
    pub notification_mode: NotificationMode,
}

/// Vendor accept/reject verdict for mutating calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestStatus {
    Success,
    Failure,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GeofenceStatus {
    Started,
    Stopped,
    LocationPermissionsNotGranted,
}

impl GeofenceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "GEOFENCE_STARTED",
            Self::Stopped => "GEOFENCE_STOPPED",
            Self::LocationPermissionsNotGranted => "GEOFENCE_LOCATION_PERMISSIONS_NOT_GRANTED",
        }
    }
}

/// Inbox statistic actions reported back to the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InboxAction {
    Read,
    Unread,
    Deleted,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DeviceInfo {
    pub device_id: String,
    pub sdk_version: String,
    pub push_token: Option<String>,
    pub alias: Option<String>,
    #[serde(default)]
    pub extras: BTreeMap<String, String>,
}

/// One in-app inbox message, tagged by the template that produced it and
/// the event that delivered it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InboxMessage {
    pub template_id: i64,
    pub event_id: String,
    pub content: JsonValue,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub deleted: bool,
}

/// An inbound push payload: an opaque string-to-string mapping produced by
/// the platform's delivery mechanism, read-only for the bridge.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PushMessage {
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl PushMessage {
    pub fn new(data: BTreeMap<String, String>) -> Self {
        Self { data }
    }

    /// True when the payload carries the vendor's reserved discriminator key.
    pub fn is_vendor_message(&self) -> bool {
        crate::classify::classify(Some(&self.data)) == crate::classify::MessageOwnership::OwnedByVendor
    }
}

/// Handle to the vendor engagement platform.
///
/// Injected as a shared `Arc<dyn VendorSdk>` into every component that
/// needs it, so the engagement lifecycle is explicit and the whole bridge
/// can run against a fake. Implementations may be called from any thread.
pub trait VendorSdk: Send + Sync {
    /// Begin the engagement/initialization sequence with explicit options.
    fn engage(&self, options: EngageOptions) -> Result<(), VendorError>;

    /// Re-run engagement from the vendor's cached configuration. Used by the
    /// readiness gate when a message arrives before the host engaged.
    fn re_engage(&self) -> Result<(), VendorError>;

    /// Process-wide readiness flag owned by the vendor singleton.
    fn is_ready(&self) -> bool;

    fn device_info(&self) -> Result<DeviceInfo, VendorError>;

    fn alias(&self) -> Result<Option<String>, VendorError>;

    fn set_alias(&self, alias: &str, resend: bool) -> Result<(), VendorError>;

    fn is_push_enabled(&self) -> Result<bool, VendorError>;

    fn set_push_enabled(&self, enabled: bool) -> Result<RequestStatus, VendorError>;

    fn add_tag(&self, tag: &str) -> Result<RequestStatus, VendorError>;

    fn remove_tag(&self, tag: &str) -> Result<RequestStatus, VendorError>;

    fn tags(&self) -> Result<BTreeSet<String>, VendorError>;

    fn set_attributes(&self, attributes: BTreeMap<String, JsonValue>) -> Result<(), VendorError>;

    fn custom_attributes(&self, keys: &[String]) -> Result<BTreeMap<String, String>, VendorError>;

    fn fetch_inbox_message(&self, template_id: i64) -> Result<InboxMessage, VendorError>;

    fn fetch_inbox_messages(&self) -> Result<Vec<InboxMessage>, VendorError>;

    fn set_token(&self, token: &str) -> Result<(), VendorError>;

    fn logout(&self, push_enabled: bool) -> Result<(), VendorError>;

    fn is_device_registered(&self) -> Result<bool, VendorError>;

    fn start_geofencing(&self) -> Result<GeofenceStatus, VendorError>;

    fn stop_geofencing(&self) -> Result<GeofenceStatus, VendorError>;

    fn trigger_in_app(&self, event: &str) -> Result<(), VendorError>;

    fn report_inbox_statistic(
        &self,
        template_id: i64,
        event_id: &str,
        action: InboxAction,
    ) -> Result<(), VendorError>;

    fn remove_badge_number(&self) -> Result<(), VendorError>;

    fn set_foreground_notifications(&self, enabled: bool) -> Result<(), VendorError>;

    /// Hand an owned push payload to the vendor's message-processing entry
    /// point. Called synchronously on the delivery thread.
    fn process_push_message(&self, message: &PushMessage) -> Result<(), VendorError>;

    /// Forward a refreshed push token to the vendor's token-update entry
    /// point.
    fn handle_token_refresh(&self, token: &str) -> Result<(), VendorError>;
}
