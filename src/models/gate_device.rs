use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateType {
    Entrance,
    Exit,
    Vip,
}

impl GateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateType::Entrance => "ENTRANCE",
            GateType::Exit => "EXIT",
            GateType::Vip => "VIP",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "ENTRANCE" => Some(GateType::Entrance),
            "EXIT" => Some(GateType::Exit),
            "VIP" => Some(GateType::Vip),
            _ => None,
        }
    }
}

/// A checkpoint where access decisions are enforced. Read-only context for
/// the decision engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDevice {
    pub id: i32,
    pub device_name: String,
    pub device_location: String,
    pub device_type: GateType,
    pub is_active: bool,
    pub last_sync: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGateDevice {
    pub device_name: String,
    pub device_location: String,
    pub device_type: GateType,
}
