pub mod prober;

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::log_info;

const ENABLE_LOGS: bool = true;

/// Last known reachability. `Unknown` only exists before the first report
/// lands; gates treat it the same as `Offline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectivityState {
    #[default]
    Unknown,
    Online,
    Offline,
}

impl ConnectivityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectivityState::Unknown => "unknown",
            ConnectivityState::Online => "online",
            ConnectivityState::Offline => "offline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityChange {
    pub previous: ConnectivityState,
    pub current: ConnectivityState,
}

/// Holds the connectivity state and fans out transitions to subscribers.
/// Probe results come in through `report`; anything that needs an
/// up-to-the-moment answer calls `current` instead of caching events.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    state: Arc<RwLock<ConnectivityState>>,
    events_tx: broadcast::Sender<ConnectivityChange>,
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(32);
        Self {
            state: Arc::new(RwLock::new(ConnectivityState::Unknown)),
            events_tx,
        }
    }

    pub fn current(&self) -> ConnectivityState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_online(&self) -> bool {
        self.current() == ConnectivityState::Online
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectivityChange> {
        self.events_tx.subscribe()
    }

    /// Record a probe result. Emits a change event only when the state
    /// actually flips; repeated identical reports are silent.
    pub fn report(&self, is_connected: bool) {
        let next = if is_connected {
            ConnectivityState::Online
        } else {
            ConnectivityState::Offline
        };

        let previous = {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            let previous = *state;
            if previous == next {
                return;
            }
            *state = next;
            previous
        };

        log_info!(
            "Connectivity changed: {} -> {}",
            previous.as_str(),
            next.as_str()
        );
        let _ = self.events_tx.send(ConnectivityChange {
            previous,
            current: next,
        });
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}
