use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;

use tapmark::config::AppConfig;
use tapmark::connectivity::prober::HttpProber;
use tapmark::connectivity::ConnectivityMonitor;
use tapmark::flow::{AttendanceFlow, AttendanceOutcome};
use tapmark::models::TagDescriptor;
use tapmark::nfc::simulated::SimulatedAdapter;

/// Demo run: bring the stack up with the simulated reader, present one
/// badge and walk a single attendance through to the sink.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("tapmark starting up...");

    let config = match std::env::var("TAPMARK_CONFIG") {
        Ok(path) => {
            log::info!("Loading configuration from {path}");
            Arc::new(AppConfig::from_file(path)?)
        }
        Err(_) => Arc::new(AppConfig::default()),
    };

    let monitor = ConnectivityMonitor::new();
    let mut conn_events = monitor.subscribe();
    let mut prober = HttpProber::new();
    prober.start(monitor.clone(), Arc::clone(&config))?;

    match tokio::time::timeout(Duration::from_secs(8), conn_events.recv()).await {
        Ok(Ok(change)) => log::info!("Connectivity: {}", change.current.as_str()),
        _ => log::warn!("No connectivity verdict yet; arming will likely be rejected"),
    }

    let adapter = Arc::new(SimulatedAdapter::new());
    adapter.set_payload(json!({
        "ndefMessage": [
            { "tnf": 1, "type": [84], "payload": [2, 101, 115, 72, 111, 108, 97] }
        ]
    }));

    let mut flow = AttendanceFlow::new(Arc::clone(&config), adapter.clone(), monitor.clone())?;
    let session = flow.login("usuario@demo.com", "demo").await?;
    log::info!(
        "Logged in as {} ({})",
        session.user.name,
        session.user.email
    );

    // Present a badge a moment after the reader arms.
    let injector = Arc::clone(&adapter);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        if injector.inject_tag(TagDescriptor::new("04A3F2", vec!["Ndef".into(), "NfcA".into()])) {
            log::info!("Simulated badge presented to the reader");
        }
    });

    match flow.record_attendance().await {
        Ok(AttendanceOutcome::Recorded { record, submission }) => {
            log::info!(
                "Attendance registered: tag {} at {}",
                record.tag_id,
                record.captured_at
            );
            if submission.is_delivered() {
                log::info!("Notification delivered to the sink");
            } else {
                log::warn!("Attendance kept, but delivery failed: {submission:?}");
            }
        }
        Ok(AttendanceOutcome::TimedOut) => log::warn!("No tag detected within the scan window"),
        Ok(AttendanceOutcome::Cancelled) => log::info!("Scan cancelled"),
        Ok(AttendanceOutcome::ScanFailed { reason }) => log::error!("Scan failed: {reason}"),
        Ok(AttendanceOutcome::ConnectionLost) => {
            log::warn!("Connection lost; the user must log in again")
        }
        Err(err) => log::error!("Could not arm the scan session: {err}"),
    }

    flow.logout().await;
    prober.stop().await?;
    Ok(())
}
