use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessType {
    Ticket,
    Accreditation,
    Biometric,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::Ticket => "TICKET",
            AccessType::Accreditation => "ACCREDITATION",
            AccessType::Biometric => "BIOMETRIC",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "TICKET" => Some(AccessType::Ticket),
            "ACCREDITATION" => Some(AccessType::Accreditation),
            "BIOMETRIC" => Some(AccessType::Biometric),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessOutcome {
    Granted,
    Denied,
}

impl AccessOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessOutcome::Granted => "GRANTED",
            AccessOutcome::Denied => "DENIED",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "GRANTED" => Some(AccessOutcome::Granted),
            "DENIED" => Some(AccessOutcome::Denied),
            _ => None,
        }
    }
}

/// One row per access attempt, granted or denied. Append-only: nothing in
/// the access flow updates or deletes entries. User/ticket references stay
/// empty when the presented credential never resolved to a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessLog {
    pub id: i64,
    pub user_id: Option<i32>,
    pub ticket_id: Option<i32>,
    pub gate_device_id: Option<i32>,
    pub access_type: AccessType,
    pub access_result: AccessOutcome,
    pub denial_reason: Option<String>,
    pub access_timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAccessLog {
    pub user_id: Option<i32>,
    pub ticket_id: Option<i32>,
    pub gate_device_id: Option<i32>,
    pub access_type: AccessType,
    pub access_result: AccessOutcome,
    pub denial_reason: Option<String>,
    pub ip_address: Option<String>,
}
