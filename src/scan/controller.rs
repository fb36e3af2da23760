use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::connectivity::ConnectivityMonitor;
use crate::models::{TagDescriptor, TagTech};
use crate::nfc::NfcAdapter;
use crate::{log_info, log_warn};

use super::{ArmError, ScanEvent, ScanHandle, ScanOutcome, ScanSession};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

/// The deadline is wall clock; the waiter naps at most this long before
/// re-checking it.
const DEADLINE_POLL_INTERVAL: Duration = Duration::from_secs(1);

struct ControllerState {
    active: Option<ScanSession>,
    cancel_token: Option<CancellationToken>,
    next_generation: u64,
}

/// Owns the single scan session and arbitrates its terminal transition.
/// Tag discovery, the timeout and cancellation all race; whichever applies
/// the first terminal state wins, releases the hardware and emits
/// [`ScanEvent::Finished`]. Later attempts for the same session are no-ops.
#[derive(Clone)]
pub struct ScanController {
    state: Arc<Mutex<ControllerState>>,
    adapter: Arc<dyn NfcAdapter>,
    monitor: ConnectivityMonitor,
    events_tx: broadcast::Sender<ScanEvent>,
    waiter: Arc<Mutex<Option<JoinHandle<()>>>>,
    scan_timeout: Duration,
}

impl ScanController {
    pub fn new(
        adapter: Arc<dyn NfcAdapter>,
        monitor: ConnectivityMonitor,
        scan_timeout: Duration,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(32);
        Self {
            state: Arc::new(Mutex::new(ControllerState {
                active: None,
                cancel_token: None,
                next_generation: 0,
            })),
            adapter,
            monitor,
            events_tx,
            waiter: Arc::new(Mutex::new(None)),
            scan_timeout,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.events_tx.subscribe()
    }

    /// Current session, armed or already finished. `None` until the first arm.
    pub async fn snapshot(&self) -> Option<ScanSession> {
        self.state.lock().await.active.clone()
    }

    /// Arm a scan session. Preconditions are checked in order: no session
    /// in flight, connectivity online (re-read synchronously, not cached),
    /// hardware supported and enabled. No hardware call is made unless all
    /// three hold.
    ///
    /// Hardware bring-up failures after a successful arm do not fail this
    /// call; the session finishes `Errored` through the event stream.
    pub async fn arm(&self) -> Result<ScanHandle, ArmError> {
        let (session_id, generation, deadline, cancel_token) = {
            let mut guard = self.state.lock().await;

            if guard
                .active
                .as_ref()
                .is_some_and(|session| !session.status.is_terminal())
            {
                return Err(ArmError::AlreadyActive);
            }
            if !self.monitor.is_online() {
                return Err(ArmError::Offline);
            }
            if !self.adapter.is_supported() || !self.adapter.is_enabled() {
                return Err(ArmError::HardwareUnsupported);
            }

            let generation = guard.next_generation;
            guard.next_generation += 1;

            let session_id = Uuid::new_v4().to_string();
            let armed_at = Utc::now();
            let deadline =
                armed_at + chrono::Duration::milliseconds(self.scan_timeout.as_millis() as i64);

            let cancel_token = CancellationToken::new();
            guard.active = Some(ScanSession::new(
                session_id.clone(),
                generation,
                armed_at,
                deadline,
            ));
            guard.cancel_token = Some(cancel_token.clone());

            (session_id, generation, deadline, cancel_token)
        };

        log_info!("Scan session {} armed", session_id);
        let _ = self.events_tx.send(ScanEvent::Armed {
            session_id: session_id.clone(),
        });

        // Subscribe before asking the radio to listen, so a tag that shows
        // up instantly is not lost.
        let tag_rx = self.adapter.tag_events();
        if let Err(err) = self
            .adapter
            .start()
            .and_then(|_| self.adapter.request_technology(TagTech::Ndef))
        {
            finish(
                &self.state,
                self.adapter.as_ref(),
                &self.events_tx,
                generation,
                ScanOutcome::Errored {
                    reason: format!("failed to start tag reader: {err}"),
                },
            )
            .await;
            return Ok(ScanHandle {
                session_id,
                generation,
            });
        }

        let state = Arc::clone(&self.state);
        let adapter = Arc::clone(&self.adapter);
        let events_tx = self.events_tx.clone();
        let handle = tokio::spawn(wait_for_tag(
            state,
            adapter,
            events_tx,
            tag_rx,
            cancel_token,
            generation,
            deadline,
        ));

        let mut waiter_guard = self.waiter.lock().await;
        if let Some(stale) = waiter_guard.take() {
            stale.abort();
        }
        *waiter_guard = Some(handle);

        Ok(ScanHandle {
            session_id,
            generation,
        })
    }

    /// Cancel the session behind `handle`. Returns true when this call
    /// applied the cancellation, false when the session already finished.
    /// Safe to call repeatedly.
    pub async fn cancel(&self, handle: &ScanHandle) -> bool {
        finish(
            &self.state,
            self.adapter.as_ref(),
            &self.events_tx,
            handle.generation,
            ScanOutcome::Cancelled,
        )
        .await
    }

    /// Cancel whatever session is currently armed, if any. Teardown path
    /// for logout and shutdown.
    pub async fn cancel_active(&self) -> bool {
        let generation = {
            let guard = self.state.lock().await;
            match guard.active.as_ref() {
                Some(session) if !session.status.is_terminal() => session.generation,
                _ => return false,
            }
        };

        finish(
            &self.state,
            self.adapter.as_ref(),
            &self.events_tx,
            generation,
            ScanOutcome::Cancelled,
        )
        .await
    }
}

async fn wait_for_tag(
    state: Arc<Mutex<ControllerState>>,
    adapter: Arc<dyn NfcAdapter>,
    events_tx: broadcast::Sender<ScanEvent>,
    mut tag_rx: tokio::sync::mpsc::UnboundedReceiver<TagDescriptor>,
    cancel_token: CancellationToken,
    generation: u64,
    deadline: chrono::DateTime<Utc>,
) {
    loop {
        let now = Utc::now();
        if now >= deadline {
            finish(
                &state,
                adapter.as_ref(),
                &events_tx,
                generation,
                ScanOutcome::TimedOut,
            )
            .await;
            break;
        }

        let remaining = (deadline - now).to_std().unwrap_or(Duration::ZERO);
        let nap = remaining.min(DEADLINE_POLL_INTERVAL);

        tokio::select! {
            _ = time::sleep(nap) => {}
            maybe_tag = tag_rx.recv() => {
                match maybe_tag {
                    Some(tag) => {
                        log_info!(
                            "Tag discovered: {}",
                            tag.tag_id.as_deref().unwrap_or("<no id>")
                        );
                        let tag = read_tag_details(adapter.as_ref(), tag);
                        finish(
                            &state,
                            adapter.as_ref(),
                            &events_tx,
                            generation,
                            ScanOutcome::Captured(tag),
                        )
                        .await;
                        break;
                    }
                    // Sender gone: the session was torn down elsewhere.
                    None => break,
                }
            }
            _ = cancel_token.cancelled() => break,
        }
    }
}

/// Best-effort detail read for a discovered tag. Failures downgrade to a
/// warning; the tag id alone is enough to count the scan.
fn read_tag_details(adapter: &dyn NfcAdapter, mut tag: TagDescriptor) -> TagDescriptor {
    if let Err(err) = adapter.connect() {
        log_warn!("could not connect to discovered tag: {err}");
        return tag;
    }
    match adapter.read_payload() {
        Ok(payload) => tag.payload = payload,
        Err(err) => log_warn!("could not read tag payload: {err}"),
    }
    adapter.close();
    tag
}

/// Apply a terminal transition. Exactly one caller wins per session; the
/// winner releases the hardware and emits the Finished event. Stale
/// generations and already-finished sessions return false untouched.
async fn finish(
    state: &Mutex<ControllerState>,
    adapter: &dyn NfcAdapter,
    events_tx: &broadcast::Sender<ScanEvent>,
    generation: u64,
    outcome: ScanOutcome,
) -> bool {
    let session_id = {
        let mut guard = state.lock().await;
        let inner = &mut *guard;
        let Some(session) = inner.active.as_mut() else {
            return false;
        };
        if session.generation != generation || session.status.is_terminal() {
            return false;
        }

        match &outcome {
            ScanOutcome::Captured(tag) => session.capture(tag.clone()),
            ScanOutcome::TimedOut => session.time_out(),
            ScanOutcome::Cancelled => session.cancel(),
            ScanOutcome::Errored { reason } => session.fail(reason.clone()),
        }

        if let Some(token) = inner.cancel_token.take() {
            token.cancel();
        }
        session.id.clone()
    };

    adapter.cancel();
    log_info!(
        "Scan session {} finished: {}",
        session_id,
        outcome_label(&outcome)
    );
    let _ = events_tx.send(ScanEvent::Finished {
        session_id,
        outcome,
    });
    true
}

fn outcome_label(outcome: &ScanOutcome) -> &'static str {
    match outcome {
        ScanOutcome::Captured(_) => "captured",
        ScanOutcome::TimedOut => "timedOut",
        ScanOutcome::Cancelled => "cancelled",
        ScanOutcome::Errored { .. } => "errored",
    }
}
