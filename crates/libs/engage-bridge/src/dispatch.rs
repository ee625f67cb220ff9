use crate::channel::{Args, MethodCall, MethodResponse, ResultSink};
use crate::error::BridgeError;
use crate::method::Method;
use crate::permission::PermissionNegotiator;
use crate::platform::HostPlatform;
use crate::serialize::{device_info_to_value, message_to_json_string, messages_to_json_string};
use crate::store::PreferenceStore;
use crate::vendor::{
    EngageOptions, InboxAction, NotificationMode, RequestStatus, ServerEnvironment, VendorError,
    VendorSdk,
};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

/// Routes host method calls to the vendor SDK handle and resolves each
/// one-shot response sink with a success payload or a structured error.
///
/// The host guarantees serialized delivery of calls; sinks parked for
/// asynchronous outcomes (token retrieval, permission negotiation) may be
/// resolved from other threads.
pub struct BridgeDispatcher {
    sdk: Arc<dyn VendorSdk>,
    platform: Arc<dyn HostPlatform>,
    prefs: Arc<dyn PreferenceStore>,
    negotiator: PermissionNegotiator,
}

impl BridgeDispatcher {
    pub fn new(
        sdk: Arc<dyn VendorSdk>,
        platform: Arc<dyn HostPlatform>,
        prefs: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self { sdk, platform, prefs, negotiator: PermissionNegotiator::new() }
    }

    pub fn handle_call(&self, call: &MethodCall, sink: ResultSink) {
        let Some(method) = Method::parse(&call.method) else {
            sink.resolve(MethodResponse::not_implemented(&call.method));
            return;
        };
        let args = call.args();

        match method {
            Method::GetToken => {
                self.platform.fetch_push_token(Box::new(move |result| match result {
                    Ok(token) => sink.resolve(MethodResponse::success(token)),
                    Err(message) => {
                        sink.resolve(MethodResponse::error(Method::GetToken.as_str(), message))
                    }
                }));
            }
            Method::RequestPostNotificationPermission => {
                self.negotiator.request(self.platform.as_ref(), self.prefs.as_ref(), sink);
            }
            _ => {
                let response = match self.dispatch_sync(method, args) {
                    Ok(value) => MethodResponse::success(value),
                    Err(err) => MethodResponse::error(err.code_for(method), err.to_string()),
                };
                sink.resolve(response);
            }
        }
    }

    /// Entry point for OS permission-result callbacks. Returns whether the
    /// callback belonged to this bridge.
    pub fn on_permission_result(&self, request_code: u32, results: &[(String, bool)]) -> bool {
        self.negotiator.on_permission_result(request_code, results)
    }

    fn dispatch_sync(&self, method: Method, args: Args<'_>) -> Result<JsonValue, BridgeError> {
        match method {
            Method::GetPlatformVersion => {
                Ok(json!(format!("Android {}", self.platform.os_release())))
            }
            Method::Engage => self.engage(args),
            Method::SetDeviceAlias => self.set_device_alias(args),
            Method::GetDeviceAlias => Ok(json!(self.sdk.alias()?)),
            Method::IsPushEnabled => Ok(json!(self.sdk.is_push_enabled()?)),
            Method::SetPushEnabled => {
                let enabled = args.bool_at_or_false(0);
                match self.sdk.set_push_enabled(enabled)? {
                    RequestStatus::Success => Ok(json!(true)),
                    RequestStatus::Failure => {
                        Err(VendorError::new("vendor rejected the push-enabled update").into())
                    }
                }
            }
            Method::TriggerInApp => {
                let event = args.str_at(0)?;
                self.sdk.trigger_in_app(event)?;
                Ok(json!(""))
            }
            Method::IsReady => Ok(json!(self.sdk.is_ready())),
            Method::GetDeviceInfo => Ok(device_info_to_value(&self.sdk.device_info()?)),
            Method::FetchInboxMessage => {
                let template_id = args.i64_at_or(0, -1);
                let message = self.sdk.fetch_inbox_message(template_id)?;
                Ok(json!(message_to_json_string(&message)))
            }
            Method::FetchInboxMessages => {
                let messages = self.sdk.fetch_inbox_messages()?;
                Ok(json!(messages_to_json_string(&messages)))
            }
            Method::SetToken => {
                let token = args.str_at(0)?;
                self.sdk.set_token(token)?;
                Ok(json!(token))
            }
            Method::StartGeofencing => Ok(json!(self.sdk.start_geofencing()?.as_str())),
            Method::StopGeofencing => Ok(json!(self.sdk.stop_geofencing()?.as_str())),
            Method::AddTag => {
                let tag = args.str_at(0)?;
                match self.sdk.add_tag(tag)? {
                    RequestStatus::Success => Ok(json!(true)),
                    RequestStatus::Failure => Err(VendorError::new("error adding tag").into()),
                }
            }
            Method::RemoveTag => {
                let tag = args.str_at(0)?;
                match self.sdk.remove_tag(tag)? {
                    RequestStatus::Success => Ok(json!(true)),
                    RequestStatus::Failure => Err(VendorError::new("error removing tag").into()),
                }
            }
            Method::FetchDeviceTags => Ok(json!(self.sdk.tags()?)),
            Method::LogoutWithOptIn => {
                let push_enabled = args.bool_at_or_false(0);
                self.sdk.logout(push_enabled)?;
                Ok(json!(format!("logged out with 'PushEnabled' status: {push_enabled}")))
            }
            Method::IsDeviceRegistered => Ok(json!(self.sdk.is_device_registered()?)),
            Method::RemoveBadgeNumber => {
                self.sdk.remove_badge_number()?;
                Ok(json!(true))
            }
            Method::InAppMarkAsRead => self.report_inbox_statistic(args, InboxAction::Read),
            Method::InAppMarkAsUnread => self.report_inbox_statistic(args, InboxAction::Unread),
            Method::InAppMarkAsDeleted => self.report_inbox_statistic(args, InboxAction::Deleted),
            Method::SetCustomAttributes => {
                let attributes = args.map_at(0)?;
                if attributes.is_empty() {
                    return Err(BridgeError::Argument("empty attributes list".to_string()));
                }
                self.sdk.set_attributes(attributes)?;
                Ok(json!(true))
            }
            Method::GetCustomAttributes => {
                let keys = args.string_list_at(0)?;
                if keys.is_empty() {
                    return Err(BridgeError::Argument("empty attribute keys".to_string()));
                }
                Ok(json!(self.sdk.custom_attributes(&keys)?))
            }
            Method::ShowNotificationsOnForeground => {
                let enabled = args.bool_at_or_false(0);
                self.sdk.set_foreground_notifications(enabled)?;
                Ok(json!(true))
            }
            // Asynchronous methods are routed before dispatch_sync; nothing
            // may panic on the delivery path, so a misroute degrades to a
            // structured error.
            Method::GetToken | Method::RequestPostNotificationPermission => Err(
                BridgeError::Argument("asynchronous method routed synchronously".to_string()),
            ),
        }
    }

    fn engage(&self, args: Args<'_>) -> Result<JsonValue, BridgeError> {
        // [sdk_key, server_index, app_id, tenant_id, notification_mode?]
        let options = EngageOptions {
            sdk_key: args.str_at(0)?.to_string(),
            server: ServerEnvironment::from_index(args.i64_at(1)?)?,
            app_id: args.str_at(2)?.to_string(),
            tenant_id: args.str_at(3)?.to_string(),
            notification_mode: NotificationMode::from_index_or_default(args.i64_at(4).ok()),
        };
        log::debug!(
            "engaging sdk: server={} app_id={} tenant_id={} notification_mode={}",
            options.server.as_str(),
            options.app_id,
            options.tenant_id,
            options.notification_mode.as_str()
        );
        self.sdk.engage(options)?;
        Ok(json!("OK"))
    }

    fn set_device_alias(&self, args: Args<'_>) -> Result<JsonValue, BridgeError> {
        if args.is_empty() {
            return Err(BridgeError::Argument("no arguments provided".to_string()));
        }
        let alias = args.str_at(0)?;
        let resend = args.bool_at_or_false(1);
        self.sdk.set_alias(alias, resend)?;
        Ok(json!(alias))
    }

    fn report_inbox_statistic(
        &self,
        args: Args<'_>,
        action: InboxAction,
    ) -> Result<JsonValue, BridgeError> {
        if args.len() < 2 {
            return Err(BridgeError::Argument(
                "expected template id and event id arguments".to_string(),
            ));
        }
        let template_id = args.i64_at(0)?;
        let event_id = args.str_at(1)?;
        self.sdk.report_inbox_statistic(template_id, event_id, action)?;
        Ok(json!(true))
    }
}
