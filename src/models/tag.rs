use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tag technologies the radio driver can be asked to listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagTech {
    Ndef,
    NfcA,
    NfcB,
    IsoDep,
    MifareClassic,
    MifareUltralight,
}

impl TagTech {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagTech::Ndef => "Ndef",
            TagTech::NfcA => "NfcA",
            TagTech::NfcB => "NfcB",
            TagTech::IsoDep => "IsoDep",
            TagTech::MifareClassic => "MifareClassic",
            TagTech::MifareUltralight => "MifareUltralight",
        }
    }
}

/// What the hardware hands us for a discovered tag. The id is assigned by the
/// driver and may be missing; `payload` is best-effort NDEF data filled in
/// after discovery, or `None` when the read failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TagDescriptor {
    pub tag_id: Option<String>,
    pub tech_types: Vec<String>,
    pub payload: Option<Value>,
}

impl TagDescriptor {
    pub fn new(tag_id: impl Into<String>, tech_types: Vec<String>) -> Self {
        Self {
            tag_id: Some(tag_id.into()),
            tech_types,
            payload: None,
        }
    }
}
