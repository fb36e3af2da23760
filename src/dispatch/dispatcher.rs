use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use serde_json::json;

use crate::config::{endpoints, AppConfig};
use crate::models::AttendanceRecord;
use crate::{log_info, log_warn};

use super::payload::WebhookMessage;
use super::SubmissionOutcome;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

/// Sends attendance records out. One POST per call, no retry; the caller
/// gets a classification, never an error.
pub struct SubmissionDispatcher {
    client: reqwest::Client,
    config: Arc<AppConfig>,
}

impl SubmissionDispatcher {
    pub fn new(config: Arc<AppConfig>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("failed to build submission client")?;
        Ok(Self { client, config })
    }

    /// Deliver the record to the notification sink as an embed message.
    pub async fn submit(&self, record: &AttendanceRecord) -> SubmissionOutcome {
        let message = WebhookMessage::attendance(record, &self.config);
        let outcome = classify(
            self.client
                .post(&self.config.webhook_url)
                .json(&message)
                .send()
                .await,
        );

        match &outcome {
            SubmissionOutcome::Delivered => {
                log_info!("Attendance for tag {} delivered to the sink", record.tag_id);
            }
            SubmissionOutcome::SinkRejected(status) => {
                log_warn!(
                    "Sink rejected attendance for tag {}: HTTP {}",
                    record.tag_id,
                    status
                );
            }
            SubmissionOutcome::NetworkFailure(message) => {
                log_warn!(
                    "Could not reach the sink for tag {}: {}",
                    record.tag_id,
                    message
                );
            }
        }
        outcome
    }

    /// Forward the record to the attendance backend. The webhook sink is
    /// the live path today; this exists for the backend rollout.
    pub async fn submit_to_api(&self, record: &AttendanceRecord, token: &str) -> SubmissionOutcome {
        let url = self.config.endpoint_url(endpoints::REGISTER_ATTENDANCE);
        let outcome = classify(
            self.client
                .post(url)
                .bearer_auth(token)
                .json(&api_body(record))
                .send()
                .await,
        );

        if !outcome.is_delivered() {
            log_warn!(
                "Attendance API submission for tag {} failed: {:?}",
                record.tag_id,
                outcome
            );
        }
        outcome
    }
}

fn api_body(record: &AttendanceRecord) -> serde_json::Value {
    json!({
        "tagId": record.tag_id,
        "timestamp": record
            .captured_at
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        "techTypes": record.tech_types,
        "userId": record.user_id,
        "userEmail": record.user_email,
        "location": record.location,
        "deviceInfo": record.device_info,
        "ndefData": record.payload,
    })
}

fn classify(result: reqwest::Result<reqwest::Response>) -> SubmissionOutcome {
    match result {
        Ok(response) => {
            let status = response.status();
            if status.is_success() {
                SubmissionOutcome::Delivered
            } else {
                SubmissionOutcome::SinkRejected(status.as_u16())
            }
        }
        Err(err) => SubmissionOutcome::NetworkFailure(err.to_string()),
    }
}
