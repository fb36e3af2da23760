mod controller;
mod state;

pub use controller::ScanController;
pub use state::{ScanSession, ScanStatus};

use serde::Serialize;
use thiserror::Error;

use crate::models::TagDescriptor;

/// Why a session could not be armed. Anything after a successful arm is
/// reported through [`ScanEvent::Finished`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArmError {
    #[error("a scan session is already in progress")]
    AlreadyActive,
    #[error("no internet connection, attendance registration needs a live connection")]
    Offline,
    #[error("this device does not support NFC or NFC is disabled")]
    HardwareUnsupported,
}

/// Terminal result of a scan session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScanOutcome {
    Captured(TagDescriptor),
    TimedOut,
    Cancelled,
    Errored { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScanEvent {
    Armed {
        session_id: String,
    },
    Finished {
        session_id: String,
        outcome: ScanOutcome,
    },
}

/// Returned by a successful arm. Holds enough to cancel or correlate
/// events without granting access to the session state itself.
#[derive(Debug, Clone)]
pub struct ScanHandle {
    pub session_id: String,
    pub(crate) generation: u64,
}
