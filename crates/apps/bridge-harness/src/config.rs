use engage_bridge::{NotificationMode, ServerEnvironment, VendorError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Scenario description for a harness run. Everything is optional so a
/// bare `bridge-harness` invocation drives an unconfigured bridge.
#[derive(Debug, Default, Deserialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub engage: Option<EngageConfig>,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub prefs_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct EngageConfig {
    pub sdk_key: String,
    #[serde(default)]
    pub server: Option<String>,
    pub app_id: String,
    pub tenant_id: String,
    #[serde(default)]
    pub notification_mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_os_release")]
    pub os_release: String,
    #[serde(default = "default_api_level")]
    pub api_level: u32,
    #[serde(default)]
    pub granted_permissions: Vec<String>,
    #[serde(default)]
    pub rationale_permissions: Vec<String>,
    #[serde(default)]
    pub push_token: Option<String>,
}

fn default_os_release() -> String {
    "14".to_string()
}

fn default_api_level() -> u32 {
    34
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            os_release: default_os_release(),
            api_level: default_api_level(),
            granted_permissions: Vec::new(),
            rationale_permissions: Vec::new(),
            push_token: None,
        }
    }
}

impl HarnessConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let raw = fs::read_to_string(path)
            .map_err(|err| format!("read {}: {err}", path.display()))?;
        toml::from_str(&raw).map_err(|err| format!("parse {}: {err}", path.display()))
    }
}

impl EngageConfig {
    pub fn server_index(&self) -> Result<i64, VendorError> {
        let Some(name) = self.server.as_deref() else {
            return Ok(ServerEnvironment::L3.index());
        };
        ServerEnvironment::ALL
            .iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(name))
            .map(|environment| environment.index())
            .ok_or_else(|| VendorError::new(format!("unknown server environment '{name}'")))
    }

    pub fn notification_mode_index(&self) -> Result<i64, VendorError> {
        let Some(name) = self.notification_mode.as_deref() else {
            return Ok(NotificationMode::BackgroundAndForeground.index());
        };
        match name.to_ascii_uppercase().as_str() {
            "BACKGROUND" => Ok(NotificationMode::Background.index()),
            "FOREGROUND" => Ok(NotificationMode::Foreground.index()),
            "BACKGROUND_AND_FOREGROUND" => {
                Ok(NotificationMode::BackgroundAndForeground.index())
            }
            other => Err(VendorError::new(format!("unknown notification mode '{other}'"))),
        }
    }
}
