pub mod auth;
pub mod config;
pub mod connectivity;
pub mod device;
pub mod dispatch;
pub mod flow;
pub mod models;
pub mod nfc;
pub mod scan;
pub mod utils;

pub use auth::{AuthSession, LoginError, UserProfile};
pub use config::AppConfig;
pub use connectivity::{ConnectivityMonitor, ConnectivityState};
pub use device::DeviceInfo;
pub use dispatch::{SubmissionDispatcher, SubmissionOutcome, WebhookMessage};
pub use flow::{AttendanceFlow, AttendanceOutcome};
pub use models::{AttendanceRecord, TagDescriptor, TagTech};
pub use nfc::{CaptureError, NfcAdapter};
pub use scan::{
    ArmError, ScanController, ScanEvent, ScanHandle, ScanOutcome, ScanSession, ScanStatus,
};
