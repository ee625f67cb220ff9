//! Conversions from vendor result types into the plain serializable values
//! the channel carries.

use crate::vendor::{DeviceInfo, InboxMessage};
use serde_json::{json, Value as JsonValue};

pub fn device_info_to_value(info: &DeviceInfo) -> JsonValue {
    json!({
        "deviceId": info.device_id,
        "sdkVersion": info.sdk_version,
        "pushToken": info.push_token,
        "alias": info.alias,
        "extras": info.extras,
    })
}

pub fn message_to_value(message: &InboxMessage) -> JsonValue {
    json!({
        "templateId": message.template_id,
        "eventId": message.event_id,
        "content": message.content,
        "read": message.read,
        "deleted": message.deleted,
    })
}

/// Inbox fetches answer with a JSON string rather than a structured value;
/// the host side parses it. Single fetch carries one object.
pub fn message_to_json_string(message: &InboxMessage) -> String {
    message_to_value(message).to_string()
}

/// All-message fetch carries an array, empty included.
pub fn messages_to_json_string(messages: &[InboxMessage]) -> String {
    JsonValue::Array(messages.iter().map(message_to_value).collect()).to_string()
}
