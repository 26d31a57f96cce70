use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Upcoming => "UPCOMING",
            MatchStatus::Ongoing => "ONGOING",
            MatchStatus::Completed => "COMPLETED",
            MatchStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "UPCOMING" => Some(MatchStatus::Upcoming),
            "ONGOING" => Some(MatchStatus::Ongoing),
            "COMPLETED" => Some(MatchStatus::Completed),
            "CANCELLED" => Some(MatchStatus::Cancelled),
            _ => None,
        }
    }
}

/// A match (or other venue event) that tickets are sold against.
/// `available_tickets` stays within `0..=total_capacity`; it is only ever
/// decremented, one seat per sold ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: i32,
    pub match_name: String,
    pub match_date: DateTime<Utc>,
    pub venue: String,
    pub team_a: String,
    pub team_b: String,
    pub total_capacity: i32,
    pub available_tickets: i32,
    pub ticket_price: Decimal,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMatchEvent {
    pub match_name: String,
    pub match_date: DateTime<Utc>,
    pub venue: String,
    pub team_a: String,
    pub team_b: String,
    pub total_capacity: i32,
    pub ticket_price: Decimal,
}
