use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::TagDescriptor;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ScanStatus {
    Armed,
    Captured,
    TimedOut,
    Cancelled,
    Errored,
}

impl ScanStatus {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScanStatus::Armed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Armed => "armed",
            ScanStatus::Captured => "captured",
            ScanStatus::TimedOut => "timedOut",
            ScanStatus::Cancelled => "cancelled",
            ScanStatus::Errored => "errored",
        }
    }
}

/// One scan attempt. Idle is represented by the controller holding no
/// session at all; a session always starts Armed and ends in exactly one
/// terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSession {
    pub id: String,
    pub status: ScanStatus,
    pub armed_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub cancel_requested: bool,
    pub tag: Option<TagDescriptor>,
    pub error: Option<String>,
    /// Monotonic arming counter, used to tell a stale waiter's transition
    /// apart from one aimed at the current session.
    #[serde(skip)]
    pub generation: u64,
}

impl ScanSession {
    pub fn new(
        id: String,
        generation: u64,
        armed_at: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            status: ScanStatus::Armed,
            armed_at,
            deadline,
            cancel_requested: false,
            tag: None,
            error: None,
            generation,
        }
    }

    pub fn capture(&mut self, tag: TagDescriptor) {
        self.status = ScanStatus::Captured;
        self.tag = Some(tag);
    }

    pub fn time_out(&mut self) {
        self.status = ScanStatus::TimedOut;
    }

    pub fn cancel(&mut self) {
        self.status = ScanStatus::Cancelled;
        self.cancel_requested = true;
    }

    pub fn fail(&mut self, reason: String) {
        self.status = ScanStatus::Errored;
        self.error = Some(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ScanSession {
        let armed_at = Utc::now();
        ScanSession::new(
            "s-1".to_string(),
            0,
            armed_at,
            armed_at + chrono::Duration::seconds(30),
        )
    }

    #[test]
    fn new_session_is_armed_and_non_terminal() {
        let s = session();
        assert_eq!(s.status, ScanStatus::Armed);
        assert!(!s.status.is_terminal());
        assert!(!s.cancel_requested);
        assert!(s.tag.is_none());
        assert!(s.error.is_none());
    }

    #[test]
    fn every_end_state_is_terminal() {
        let mut captured = session();
        captured.capture(TagDescriptor::new("04A3F2", vec!["Ndef".into()]));
        assert_eq!(captured.status, ScanStatus::Captured);
        assert!(captured.tag.is_some());

        let mut timed_out = session();
        timed_out.time_out();
        assert!(timed_out.status.is_terminal());

        let mut cancelled = session();
        cancelled.cancel();
        assert!(cancelled.status.is_terminal());
        assert!(cancelled.cancel_requested);

        let mut errored = session();
        errored.fail("reader init failed".to_string());
        assert!(errored.status.is_terminal());
        assert_eq!(errored.error.as_deref(), Some("reader init failed"));
    }
}
