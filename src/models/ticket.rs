use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a ticket. The access flow only ever performs the
/// VALID -> USED transition, and at most once per ticket; CANCELLED and
/// EXPIRED are set administratively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    Valid,
    Used,
    Cancelled,
    Expired,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Valid => "VALID",
            TicketStatus::Used => "USED",
            TicketStatus::Cancelled => "CANCELLED",
            TicketStatus::Expired => "EXPIRED",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "VALID" => Some(TicketStatus::Valid),
            "USED" => Some(TicketStatus::Used),
            "CANCELLED" => Some(TicketStatus::Cancelled),
            "EXPIRED" => Some(TicketStatus::Expired),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i32,
    pub ticket_code: String,
    pub user_id: i32,
    pub match_event_id: i32,
    pub seat_number: Option<String>,
    pub qr_code_data: String,
    pub status: TicketStatus,
    pub purchase_date: DateTime<Utc>,
}

impl Ticket {
    pub fn is_valid(&self) -> bool {
        self.status == TicketStatus::Valid
    }
}

/// Insert payload; status starts at VALID and the purchase date is set by
/// the store.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub ticket_code: String,
    pub user_id: i32,
    pub match_event_id: i32,
    pub seat_number: Option<String>,
    pub qr_code_data: String,
}
