pub mod simulated;

use anyhow::Result;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::models::{TagDescriptor, TagTech};

/// Failure while talking to an already-discovered tag. These never fail a
/// scan; the tag id alone is enough to count the read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("tag connect failed: {0}")]
    Connect(String),
    #[error("tag payload read failed: {0}")]
    Read(String),
}

/// Bridge to the proximity-tag hardware. One implementation wraps the real
/// platform stack; tests and the demo binary use [`simulated::SimulatedAdapter`].
///
/// Call order for a scan: `tag_events` to obtain the discovery stream, then
/// `start` and `request_technology`, then `cancel` exactly once when the
/// session ends for any reason. `connect`/`read_payload`/`close` are only
/// valid between a discovery and the final `cancel`.
pub trait NfcAdapter: Send + Sync {
    fn is_supported(&self) -> bool;

    fn is_enabled(&self) -> bool;

    /// Bring up the hardware session.
    fn start(&self) -> Result<()>;

    /// Ask the hardware to listen for the given tag technology.
    fn request_technology(&self, tech: TagTech) -> Result<()>;

    /// Tear down the hardware session. Idempotent and infallible; adapters
    /// swallow and log their own teardown errors.
    fn cancel(&self);

    /// Subscribe to tag discoveries. Each call replaces any previous
    /// subscription; only the most recent receiver sees events.
    fn tag_events(&self) -> mpsc::UnboundedReceiver<TagDescriptor>;

    fn connect(&self) -> Result<(), CaptureError>;

    /// Read the tag's payload, if it carries one.
    fn read_payload(&self) -> Result<Option<Value>, CaptureError>;

    /// Close the per-tag connection. Best-effort.
    fn close(&self);
}
