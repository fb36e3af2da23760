use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Primary API endpoints, joined onto `AppConfig::base_url`.
pub mod endpoints {
    pub const LOGIN: &str = "/auth/login";
    pub const REGISTER_ATTENDANCE: &str = "/attendance/register";
    pub const ATTENDANCE_HISTORY: &str = "/attendance/history";
    pub const USER_PROFILE: &str = "/user/profile";
}

/// Runtime configuration. Compiled-in defaults match the shipped app; a JSON
/// file can override any subset of fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Notification sink. The default is a placeholder, not a live webhook.
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,
    #[serde(default = "default_probe_url")]
    pub probe_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_scan_timeout_ms")]
    pub scan_timeout_ms: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    #[serde(default = "default_bot_avatar")]
    pub bot_avatar: String,
}

fn default_base_url() -> String {
    "https://api.example.com".to_string()
}

fn default_webhook_url() -> String {
    "https://discord.com/api/webhooks/0/replace-me".to_string()
}

fn default_probe_url() -> String {
    "https://www.google.com".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_scan_timeout_ms() -> u64 {
    30_000
}

fn default_probe_timeout_ms() -> u64 {
    5_000
}

fn default_probe_interval_ms() -> u64 {
    10_000
}

fn default_bot_name() -> String {
    "NFC Attendance Bot".to_string()
}

fn default_bot_avatar() -> String {
    "https://cdn.discordapp.com/attachments/123456789/123456789/nfc-icon.png".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            webhook_url: default_webhook_url(),
            probe_url: default_probe_url(),
            request_timeout_ms: default_request_timeout_ms(),
            scan_timeout_ms: default_scan_timeout_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            probe_interval_ms: default_probe_interval_ms(),
            bot_name: default_bot_name(),
            bot_avatar: default_bot_avatar(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }
}
