use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::models::{TagDescriptor, TagTech};

use super::{CaptureError, NfcAdapter};

/// In-memory stand-in for the tag hardware. Tests script it: configure the
/// capability flags and failure modes up front, then `inject_tag` to make a
/// tag appear under the reader.
pub struct SimulatedAdapter {
    supported: bool,
    enabled: bool,
    inner: Mutex<Inner>,
    starts: AtomicUsize,
    cancels: AtomicUsize,
}

#[derive(Default)]
struct Inner {
    tags_tx: Option<mpsc::UnboundedSender<TagDescriptor>>,
    payload: Option<Value>,
    start_failure: Option<String>,
    connect_failure: Option<String>,
    read_failure: Option<String>,
}

impl SimulatedAdapter {
    pub fn new() -> Self {
        Self::with_capabilities(true, true)
    }

    pub fn unsupported() -> Self {
        Self::with_capabilities(false, false)
    }

    pub fn disabled() -> Self {
        Self::with_capabilities(true, false)
    }

    fn with_capabilities(supported: bool, enabled: bool) -> Self {
        Self {
            supported,
            enabled,
            inner: Mutex::new(Inner::default()),
            starts: AtomicUsize::new(0),
            cancels: AtomicUsize::new(0),
        }
    }

    /// Next `start` call fails with this message. One-shot.
    pub fn fail_next_start(&self, message: &str) {
        self.lock_inner().start_failure = Some(message.to_string());
    }

    pub fn fail_connect(&self, message: &str) {
        self.lock_inner().connect_failure = Some(message.to_string());
    }

    pub fn fail_read(&self, message: &str) {
        self.lock_inner().read_failure = Some(message.to_string());
    }

    pub fn set_payload(&self, payload: Value) {
        self.lock_inner().payload = Some(payload);
    }

    /// Deliver a tag to the current subscriber. Returns false when nobody
    /// is listening any more (the session already ended).
    pub fn inject_tag(&self, tag: TagDescriptor) -> bool {
        match &self.lock_inner().tags_tx {
            Some(tx) => tx.send(tag).is_ok(),
            None => false,
        }
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SimulatedAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl NfcAdapter for SimulatedAdapter {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn start(&self) -> Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.lock_inner().start_failure.take() {
            bail!("{message}");
        }
        Ok(())
    }

    fn request_technology(&self, _tech: TagTech) -> Result<()> {
        Ok(())
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        self.lock_inner().tags_tx = None;
    }

    fn tag_events(&self) -> mpsc::UnboundedReceiver<TagDescriptor> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock_inner().tags_tx = Some(tx);
        rx
    }

    fn connect(&self) -> Result<(), CaptureError> {
        match &self.lock_inner().connect_failure {
            Some(message) => Err(CaptureError::Connect(message.clone())),
            None => Ok(()),
        }
    }

    fn read_payload(&self) -> Result<Option<Value>, CaptureError> {
        let inner = self.lock_inner();
        match &inner.read_failure {
            Some(message) => Err(CaptureError::Read(message.clone())),
            None => Ok(inner.payload.clone()),
        }
    }

    fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn capability_constructors() {
        assert!(SimulatedAdapter::new().is_supported());
        assert!(SimulatedAdapter::new().is_enabled());
        assert!(!SimulatedAdapter::unsupported().is_supported());
        let disabled = SimulatedAdapter::disabled();
        assert!(disabled.is_supported());
        assert!(!disabled.is_enabled());
    }

    #[tokio::test]
    async fn injected_tags_reach_the_subscriber() {
        let adapter = SimulatedAdapter::new();
        let mut rx = adapter.tag_events();

        let tag = TagDescriptor::new("04A3F2", vec!["Ndef".into()]);
        assert!(adapter.inject_tag(tag.clone()));
        assert_eq!(rx.recv().await.unwrap(), tag);
    }

    #[test]
    fn inject_without_subscriber_reports_nobody_listening() {
        let adapter = SimulatedAdapter::new();
        let tag = TagDescriptor::new("04A3F2", vec![]);
        assert!(!adapter.inject_tag(tag.clone()));

        let _rx = adapter.tag_events();
        adapter.cancel();
        assert!(!adapter.inject_tag(tag));
    }

    #[test]
    fn start_failure_is_one_shot() {
        let adapter = SimulatedAdapter::new();
        adapter.fail_next_start("boom");
        assert!(adapter.start().is_err());
        assert!(adapter.start().is_ok());
        assert_eq!(adapter.start_count(), 2);
    }

    #[test]
    fn payload_and_read_failure_are_scriptable() {
        let adapter = SimulatedAdapter::new();
        assert_eq!(adapter.read_payload().unwrap(), None);

        adapter.set_payload(json!({"ndefMessage": []}));
        assert_eq!(adapter.read_payload().unwrap(), Some(json!({"ndefMessage": []})));

        adapter.fail_read("tag moved away");
        assert_eq!(
            adapter.read_payload().unwrap_err(),
            CaptureError::Read("tag moved away".into())
        );
    }
}
