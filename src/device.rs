use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysinfo::System;

const USER_AGENT: &str = "NFC Attendance App";

/// Opaque device descriptor attached to every attendance record. Collected
/// once at startup; the fields are informational, nothing downstream parses
/// them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub platform: String,
    pub os_version: String,
    pub hostname: String,
    pub app_version: String,
    pub user_agent: String,
    pub collected_at: DateTime<Utc>,
}

impl DeviceInfo {
    pub fn collect() -> Self {
        Self {
            platform: std::env::consts::OS.to_string(),
            os_version: System::long_os_version().unwrap_or_else(|| "unknown".to_string()),
            hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            user_agent: USER_AGENT.to_string(),
            collected_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_fills_every_field() {
        let info = DeviceInfo::collect();
        assert!(!info.platform.is_empty());
        assert!(!info.os_version.is_empty());
        assert!(!info.hostname.is_empty());
        assert_eq!(info.app_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(info.user_agent, USER_AGENT);
    }
}
