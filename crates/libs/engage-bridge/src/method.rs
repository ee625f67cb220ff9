use serde::{Deserialize, Serialize};

/// Named operations the host framework may invoke over the channel.
///
/// Wire names are the camelCase strings the channel carries; anything else
/// dispatches to a `NOT_IMPLEMENTED` response.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Method {
    GetPlatformVersion,
    Engage,
    SetDeviceAlias,
    GetDeviceAlias,
    IsPushEnabled,
    SetPushEnabled,
    TriggerInApp,
    IsReady,
    GetDeviceInfo,
    FetchInboxMessage,
    FetchInboxMessages,
    GetToken,
    SetToken,
    StartGeofencing,
    StopGeofencing,
    AddTag,
    RemoveTag,
    FetchDeviceTags,
    LogoutWithOptIn,
    IsDeviceRegistered,
    RemoveBadgeNumber,
    InAppMarkAsRead,
    InAppMarkAsUnread,
    InAppMarkAsDeleted,
    RequestPostNotificationPermission,
    SetCustomAttributes,
    GetCustomAttributes,
    ShowNotificationsOnForeground,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetPlatformVersion => "getPlatformVersion",
            Self::Engage => "engage",
            Self::SetDeviceAlias => "setDeviceAlias",
            Self::GetDeviceAlias => "getDeviceAlias",
            Self::IsPushEnabled => "isPushEnabled",
            Self::SetPushEnabled => "setPushEnabled",
            Self::TriggerInApp => "triggerInApp",
            Self::IsReady => "isReady",
            Self::GetDeviceInfo => "getDeviceInfo",
            Self::FetchInboxMessage => "fetchInboxMessage",
            Self::FetchInboxMessages => "fetchInboxMessages",
            Self::GetToken => "getToken",
            Self::SetToken => "setToken",
            Self::StartGeofencing => "startGeofencing",
            Self::StopGeofencing => "stopGeofencing",
            Self::AddTag => "addTag",
            Self::RemoveTag => "removeTag",
            Self::FetchDeviceTags => "fetchDeviceTags",
            Self::LogoutWithOptIn => "logoutWithOptIn",
            Self::IsDeviceRegistered => "isDeviceRegistered",
            Self::RemoveBadgeNumber => "removeBadgeNumber",
            Self::InAppMarkAsRead => "inAppMarkAsRead",
            Self::InAppMarkAsUnread => "inAppMarkAsUnread",
            Self::InAppMarkAsDeleted => "inAppMarkAsDeleted",
            Self::RequestPostNotificationPermission => "requestPostNotificationPermission",
            Self::SetCustomAttributes => "setCustomAttributes",
            Self::GetCustomAttributes => "getCustomAttributes",
            Self::ShowNotificationsOnForeground => "showNotificationsOnForeground",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        ALL_METHODS.iter().copied().find(|method| method.as_str() == name)
    }
}

const ALL_METHODS: &[Method] = &[
    Method::GetPlatformVersion,
    Method::Engage,
    Method::SetDeviceAlias,
    Method::GetDeviceAlias,
    Method::IsPushEnabled,
    Method::SetPushEnabled,
    Method::TriggerInApp,
    Method::IsReady,
    Method::GetDeviceInfo,
    Method::FetchInboxMessage,
    Method::FetchInboxMessages,
    Method::GetToken,
    Method::SetToken,
    Method::StartGeofencing,
    Method::StopGeofencing,
    Method::AddTag,
    Method::RemoveTag,
    Method::FetchDeviceTags,
    Method::LogoutWithOptIn,
    Method::IsDeviceRegistered,
    Method::RemoveBadgeNumber,
    Method::InAppMarkAsRead,
    Method::InAppMarkAsUnread,
    Method::InAppMarkAsDeleted,
    Method::RequestPostNotificationPermission,
    Method::SetCustomAttributes,
    Method::GetCustomAttributes,
    Method::ShowNotificationsOnForeground,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for method in ALL_METHODS {
            assert_eq!(Method::parse(method.as_str()), Some(*method));
        }
    }

    #[test]
    fn unknown_names_do_not_parse() {
        assert_eq!(Method::parse("setRemoteMessage"), None);
        assert_eq!(Method::parse(""), None);
    }
}
