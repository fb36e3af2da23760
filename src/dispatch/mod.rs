mod dispatcher;
pub mod payload;

pub use dispatcher::SubmissionDispatcher;
pub use payload::WebhookMessage;

use serde::Serialize;

/// How a submission attempt ended. Delivery is best-effort: none of these
/// variants invalidates the attendance that was already recorded locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SubmissionOutcome {
    Delivered,
    /// The sink answered with a non-2xx status.
    SinkRejected(u16),
    /// The request never completed (DNS, refused, timeout).
    NetworkFailure(String),
}

impl SubmissionOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SubmissionOutcome::Delivered)
    }
}
