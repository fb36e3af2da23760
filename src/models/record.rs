use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::AuthSession;
use crate::device::DeviceInfo;

use super::tag::TagDescriptor;

/// Fallback id when the hardware did not assign one.
pub const UNKNOWN_TAG_ID: &str = "Unknown";
/// Placeholders used when no one is logged in.
pub const ANONYMOUS_USER_ID: &str = "user_demo";
pub const ANONYMOUS_USER_EMAIL: &str = "usuario@demo.com";
/// Static site label; there is no geolocation read behind this.
pub const DEFAULT_LOCATION: &str = "Oficina Principal";

/// One registered attendance event, frozen at build time and handed to the
/// dispatcher exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub tag_id: String,
    pub captured_at: DateTime<Utc>,
    pub tech_types: Vec<String>,
    pub payload: Option<Value>,
    pub user_id: String,
    pub user_email: String,
    pub device_info: DeviceInfo,
    pub location: String,
    pub source_is_physical_tag: bool,
}

impl AttendanceRecord {
    /// Normalize a captured tag plus session context into a record. Total:
    /// every missing input degrades to a documented default, never an error.
    pub fn build(
        tag: &TagDescriptor,
        identity: Option<&AuthSession>,
        device: &DeviceInfo,
    ) -> AttendanceRecord {
        let tag_id = tag
            .tag_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(UNKNOWN_TAG_ID)
            .to_string();

        let (user_id, user_email) = match identity {
            Some(session) => (session.user.id.clone(), session.user.email.clone()),
            None => (
                ANONYMOUS_USER_ID.to_string(),
                ANONYMOUS_USER_EMAIL.to_string(),
            ),
        };

        AttendanceRecord {
            tag_id,
            captured_at: Utc::now(),
            tech_types: tag.tech_types.clone(),
            payload: tag.payload.clone(),
            user_id,
            user_email,
            device_info: device.clone(),
            location: DEFAULT_LOCATION.to_string(),
            source_is_physical_tag: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthSession, UserProfile};

    fn device() -> DeviceInfo {
        DeviceInfo::collect()
    }

    #[test]
    fn build_is_total_on_empty_descriptor() {
        let tag = TagDescriptor {
            tag_id: None,
            tech_types: vec![],
            payload: None,
        };

        let record = AttendanceRecord::build(&tag, None, &device());

        assert_eq!(record.tag_id, UNKNOWN_TAG_ID);
        assert!(record.tech_types.is_empty());
        assert!(record.payload.is_none());
        assert_eq!(record.user_id, ANONYMOUS_USER_ID);
        assert_eq!(record.user_email, ANONYMOUS_USER_EMAIL);
        assert_eq!(record.location, DEFAULT_LOCATION);
        assert!(record.source_is_physical_tag);
    }

    #[test]
    fn empty_string_tag_id_degrades_like_a_missing_one() {
        let tag = TagDescriptor {
            tag_id: Some(String::new()),
            tech_types: vec!["Ndef".to_string()],
            payload: None,
        };

        let record = AttendanceRecord::build(&tag, None, &device());
        assert_eq!(record.tag_id, UNKNOWN_TAG_ID);
    }

    #[test]
    fn identity_flows_into_the_record() {
        let tag = TagDescriptor::new("04A3F2", vec!["Ndef".to_string()]);
        let session = AuthSession {
            user: UserProfile {
                id: "user_abc123def".to_string(),
                email: "ana@empresa.com".to_string(),
                name: "Ana".to_string(),
                role: "employee".to_string(),
            },
            token: "demo_token_x".to_string(),
        };

        let record = AttendanceRecord::build(&tag, Some(&session), &device());

        assert_eq!(record.tag_id, "04A3F2");
        assert_eq!(record.user_id, "user_abc123def");
        assert_eq!(record.user_email, "ana@empresa.com");
        assert_eq!(record.tech_types, vec!["Ndef".to_string()]);
    }

    #[test]
    fn captured_at_is_taken_at_build_time() {
        let tag = TagDescriptor::new("04A3F2", vec![]);
        let before = Utc::now();
        let record = AttendanceRecord::build(&tag, None, &device());
        let after = Utc::now();

        assert!(record.captured_at >= before);
        assert!(record.captured_at <= after);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let tag = TagDescriptor::new("04A3F2", vec!["Ndef".to_string()]);
        let record = AttendanceRecord::build(&tag, None, &device());

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("tagId").is_some());
        assert!(json.get("capturedAt").is_some());
        assert!(json.get("techTypes").is_some());
        assert!(json.get("sourceIsPhysicalTag").is_some());
    }
}
