use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use crate::auth::{self, AuthSession, LoginError};
use crate::config::AppConfig;
use crate::connectivity::{ConnectivityMonitor, ConnectivityState};
use crate::device::DeviceInfo;
use crate::dispatch::{SubmissionDispatcher, SubmissionOutcome};
use crate::models::AttendanceRecord;
use crate::nfc::NfcAdapter;
use crate::scan::{ArmError, ScanController, ScanEvent, ScanOutcome};
use crate::{log_info, log_warn};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

/// What one attendance attempt came to. The capture itself is the
/// attendance event; `Recorded` is a success even when `submission` says
/// delivery went wrong.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttendanceOutcome {
    Recorded {
        record: AttendanceRecord,
        submission: SubmissionOutcome,
    },
    TimedOut,
    Cancelled,
    ScanFailed {
        reason: String,
    },
    /// Connectivity dropped mid-scan. The caller should send the user
    /// back to login; attendance needs a live connection.
    ConnectionLost,
}

/// Ties the pieces together: gates a scan on connectivity, waits for its
/// terminal state, then builds and submits the record.
pub struct AttendanceFlow {
    monitor: ConnectivityMonitor,
    controller: ScanController,
    dispatcher: SubmissionDispatcher,
    device: DeviceInfo,
    identity: Option<AuthSession>,
}

impl AttendanceFlow {
    pub fn new(
        config: Arc<AppConfig>,
        adapter: Arc<dyn NfcAdapter>,
        monitor: ConnectivityMonitor,
    ) -> Result<Self> {
        let controller = ScanController::new(adapter, monitor.clone(), config.scan_timeout());
        let dispatcher = SubmissionDispatcher::new(config)?;
        Ok(Self {
            monitor,
            controller,
            dispatcher,
            device: DeviceInfo::collect(),
            identity: None,
        })
    }

    pub fn identity(&self) -> Option<&AuthSession> {
        self.identity.as_ref()
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthSession, LoginError> {
        let session = auth::login(email, password).await?;
        log_info!("Logged in as {}", session.user.email);
        self.identity = Some(session.clone());
        Ok(session)
    }

    /// Drop the identity and tear down any scan still in flight.
    pub async fn logout(&mut self) {
        self.controller.cancel_active().await;
        if let Some(session) = self.identity.take() {
            log_info!("Logged out {}", session.user.email);
        }
    }

    /// Run one attendance attempt end to end: arm a session, wait for its
    /// terminal state, then build and submit the record on capture.
    ///
    /// A connectivity drop while the session is armed force-cancels it and
    /// reports `ConnectionLost`.
    pub async fn record_attendance(&self) -> Result<AttendanceOutcome, ArmError> {
        let mut scan_events = self.controller.subscribe();
        let mut conn_events = self.monitor.subscribe();

        let handle = self.controller.arm().await?;
        let mut connection_lost = false;

        let outcome = loop {
            tokio::select! {
                event = scan_events.recv() => match event {
                    Ok(ScanEvent::Finished { session_id, outcome })
                        if session_id == handle.session_id =>
                    {
                        break outcome;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        log_warn!("Scan event stream lagged, {skipped} events skipped");
                    }
                    Err(RecvError::Closed) => {
                        break ScanOutcome::Errored {
                            reason: "scan event stream closed".to_string(),
                        };
                    }
                },
                change = conn_events.recv() => match change {
                    Ok(change) if change.current == ConnectivityState::Offline => {
                        log_warn!(
                            "Connection lost while scanning, cancelling session {}",
                            handle.session_id
                        );
                        connection_lost = true;
                        self.controller.cancel(&handle).await;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => {
                        self.controller.cancel(&handle).await;
                    }
                },
            }
        };

        match outcome {
            ScanOutcome::Captured(tag) => {
                // The capture itself re-checks connectivity; a tag read on a
                // dead link is not a registrable attendance.
                if !self.monitor.is_online() {
                    return Ok(AttendanceOutcome::ConnectionLost);
                }
                let record = AttendanceRecord::build(&tag, self.identity.as_ref(), &self.device);
                let submission = self.dispatcher.submit(&record).await;
                Ok(AttendanceOutcome::Recorded { record, submission })
            }
            ScanOutcome::TimedOut => Ok(AttendanceOutcome::TimedOut),
            ScanOutcome::Cancelled => {
                if connection_lost {
                    Ok(AttendanceOutcome::ConnectionLost)
                } else {
                    Ok(AttendanceOutcome::Cancelled)
                }
            }
            ScanOutcome::Errored { reason } => Ok(AttendanceOutcome::ScanFailed { reason }),
        }
    }
}
