//! Persistence boundary. The decision engine, purchase flow, and handlers
//! only ever talk to the [`Store`] trait; `PgStore` backs production and
//! `MemoryStore` backs the test suite with the same conditional-update
//! semantics.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    AccessLog, GateDevice, MatchEvent, NewAccessLog, NewGateDevice, NewMatchEvent, NewTicket,
    NewUser, Ticket, User,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The conditional seat decrement matched no row: the match sold out
    /// between the availability check and the insert.
    #[error("no tickets left for match {0}")]
    SeatsExhausted(i32),

    /// A stored value could not be mapped back onto a domain enum.
    #[error("invalid {field} value in row: {value}")]
    Decode { field: &'static str, value: String },

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[async_trait]
pub trait Store: Send + Sync {
    // Users
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    // Match events
    async fn create_match_event(&self, event: NewMatchEvent) -> Result<MatchEvent>;
    async fn find_match_event(&self, id: i32) -> Result<Option<MatchEvent>>;
    async fn list_match_events(&self) -> Result<Vec<MatchEvent>>;
    async fn list_upcoming_match_events(&self) -> Result<Vec<MatchEvent>>;

    // Tickets
    /// Insert a VALID ticket and take one seat off the match's availability
    /// as a single unit of work. Fails with [`StoreError::SeatsExhausted`]
    /// when no seat is left, without inserting anything.
    async fn insert_ticket(&self, ticket: NewTicket) -> Result<Ticket>;
    async fn find_ticket_by_code(&self, code: &str) -> Result<Option<Ticket>>;
    async fn tickets_for_user(&self, user_id: i32) -> Result<Vec<Ticket>>;
    /// Compare-and-swap VALID -> USED on the ticket's status. Returns `true`
    /// when this call performed the transition, `false` when the ticket was
    /// no longer VALID (including a concurrent scan winning the race).
    async fn mark_ticket_used(&self, code: &str) -> Result<bool>;
    async fn user_has_valid_ticket(&self, user_id: i32) -> Result<bool>;

    // Gate devices
    async fn create_gate_device(&self, device: NewGateDevice) -> Result<GateDevice>;
    async fn find_gate_device(&self, id: i32) -> Result<Option<GateDevice>>;
    async fn list_active_gate_devices(&self) -> Result<Vec<GateDevice>>;

    // Access audit log (append-only)
    async fn append_access_log(&self, entry: NewAccessLog) -> Result<AccessLog>;
    async fn list_access_logs(&self, limit: i64) -> Result<Vec<AccessLog>>;
    async fn access_logs_for_user(&self, user_id: i32) -> Result<Vec<AccessLog>>;

    // Biometric enrollment (boolean capability, no embedding storage)
    async fn enroll_biometric(&self, user_id: i32) -> Result<()>;
    async fn has_biometric(&self, user_id: i32) -> Result<bool>;
}
