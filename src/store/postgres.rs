//! PostgreSQL-backed store.
//!
//! Status columns are stored as upper-case text and mapped back onto the
//! domain enums at this boundary. The two writes with concurrency
//! constraints (seat reservation, ticket use) are single conditional
//! UPDATEs checked via affected-row counts, so two racing callers cannot
//! both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use super::{Result, Store, StoreError};
use crate::models::{
    AccessLog, AccessOutcome, AccessType, GateDevice, GateType, MatchEvent, MatchStatus,
    NewAccessLog, NewGateDevice, NewMatchEvent, NewTicket, NewUser, Role, Ticket, TicketStatus,
    User,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn decode<T>(
    field: &'static str,
    value: String,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T> {
    parse(&value).ok_or(StoreError::Decode { field, value })
}

#[derive(FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User> {
        Ok(User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            role: decode("role", self.role, Role::from_str)?,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct MatchEventRow {
    id: i32,
    match_name: String,
    match_date: DateTime<Utc>,
    venue: String,
    team_a: String,
    team_b: String,
    total_capacity: i32,
    available_tickets: i32,
    ticket_price: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MatchEventRow {
    fn into_match_event(self) -> Result<MatchEvent> {
        Ok(MatchEvent {
            id: self.id,
            match_name: self.match_name,
            match_date: self.match_date,
            venue: self.venue,
            team_a: self.team_a,
            team_b: self.team_b,
            total_capacity: self.total_capacity,
            available_tickets: self.available_tickets,
            ticket_price: self.ticket_price,
            status: decode("status", self.status, MatchStatus::from_str)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct TicketRow {
    id: i32,
    ticket_code: String,
    user_id: i32,
    match_event_id: i32,
    seat_number: Option<String>,
    qr_code_data: String,
    status: String,
    purchase_date: DateTime<Utc>,
}

impl TicketRow {
    fn into_ticket(self) -> Result<Ticket> {
        Ok(Ticket {
            id: self.id,
            ticket_code: self.ticket_code,
            user_id: self.user_id,
            match_event_id: self.match_event_id,
            seat_number: self.seat_number,
            qr_code_data: self.qr_code_data,
            status: decode("status", self.status, TicketStatus::from_str)?,
            purchase_date: self.purchase_date,
        })
    }
}

#[derive(FromRow)]
struct GateDeviceRow {
    id: i32,
    device_name: String,
    device_location: String,
    device_type: String,
    is_active: bool,
    last_sync: Option<DateTime<Utc>>,
}

impl GateDeviceRow {
    fn into_gate_device(self) -> Result<GateDevice> {
        Ok(GateDevice {
            id: self.id,
            device_name: self.device_name,
            device_location: self.device_location,
            device_type: decode("device_type", self.device_type, GateType::from_str)?,
            is_active: self.is_active,
            last_sync: self.last_sync,
        })
    }
}

#[derive(FromRow)]
struct AccessLogRow {
    id: i64,
    user_id: Option<i32>,
    ticket_id: Option<i32>,
    gate_device_id: Option<i32>,
    access_type: String,
    access_result: String,
    denial_reason: Option<String>,
    access_timestamp: DateTime<Utc>,
    ip_address: Option<String>,
}

impl AccessLogRow {
    fn into_access_log(self) -> Result<AccessLog> {
        Ok(AccessLog {
            id: self.id,
            user_id: self.user_id,
            ticket_id: self.ticket_id,
            gate_device_id: self.gate_device_id,
            access_type: decode("access_type", self.access_type, AccessType::from_str)?,
            access_result: decode("access_result", self.access_result, AccessOutcome::from_str)?,
            denial_reason: self.denial_reason,
            access_timestamp: self.access_timestamp,
            ip_address: self.ip_address,
        })
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, phone, \
                            role, is_active, created_at";
const MATCH_COLUMNS: &str = "id, match_name, match_date, venue, team_a, team_b, total_capacity, \
                             available_tickets, ticket_price, status, created_at, updated_at";
const TICKET_COLUMNS: &str = "id, ticket_code, user_id, match_event_id, seat_number, \
                              qr_code_data, status, purchase_date";
const GATE_COLUMNS: &str = "id, device_name, device_location, device_type, is_active, last_sync";
const LOG_COLUMNS: &str = "id, user_id, ticket_id, gate_device_id, access_type, access_result, \
                           denial_reason, access_timestamp, ip_address";

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, first_name, last_name, phone, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.phone)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await?;
        row.into_user()
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn create_match_event(&self, event: NewMatchEvent) -> Result<MatchEvent> {
        let sql = format!(
            "INSERT INTO match_events (match_name, match_date, venue, team_a, team_b, \
             total_capacity, available_tickets, ticket_price) \
             VALUES ($1, $2, $3, $4, $5, $6, $6, $7) RETURNING {MATCH_COLUMNS}"
        );
        let row: MatchEventRow = sqlx::query_as(&sql)
            .bind(&event.match_name)
            .bind(event.match_date)
            .bind(&event.venue)
            .bind(&event.team_a)
            .bind(&event.team_b)
            .bind(event.total_capacity)
            .bind(event.ticket_price)
            .fetch_one(&self.pool)
            .await?;
        row.into_match_event()
    }

    async fn find_match_event(&self, id: i32) -> Result<Option<MatchEvent>> {
        let sql = format!("SELECT {MATCH_COLUMNS} FROM match_events WHERE id = $1");
        let row: Option<MatchEventRow> =
            sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(MatchEventRow::into_match_event).transpose()
    }

    async fn list_match_events(&self) -> Result<Vec<MatchEvent>> {
        let sql = format!("SELECT {MATCH_COLUMNS} FROM match_events ORDER BY match_date ASC");
        let rows: Vec<MatchEventRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(MatchEventRow::into_match_event).collect()
    }

    async fn list_upcoming_match_events(&self) -> Result<Vec<MatchEvent>> {
        let sql = format!(
            "SELECT {MATCH_COLUMNS} FROM match_events \
             WHERE status = 'UPCOMING' AND match_date > NOW() ORDER BY match_date ASC"
        );
        let rows: Vec<MatchEventRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(MatchEventRow::into_match_event).collect()
    }

    async fn insert_ticket(&self, ticket: NewTicket) -> Result<Ticket> {
        let mut tx = self.pool.begin().await?;

        // Seat reservation and ticket insert are one transaction; the
        // conditional decrement closes the over-sell race.
        let reserved = sqlx::query(
            "UPDATE match_events \
             SET available_tickets = available_tickets - 1, updated_at = NOW() \
             WHERE id = $1 AND available_tickets > 0",
        )
        .bind(ticket.match_event_id)
        .execute(&mut *tx)
        .await?;

        if reserved.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::SeatsExhausted(ticket.match_event_id));
        }

        let sql = format!(
            "INSERT INTO tickets (ticket_code, user_id, match_event_id, seat_number, \
             qr_code_data, status) VALUES ($1, $2, $3, $4, $5, 'VALID') \
             RETURNING {TICKET_COLUMNS}"
        );
        let row: TicketRow = sqlx::query_as(&sql)
            .bind(&ticket.ticket_code)
            .bind(ticket.user_id)
            .bind(ticket.match_event_id)
            .bind(&ticket.seat_number)
            .bind(&ticket.qr_code_data)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        row.into_ticket()
    }

    async fn find_ticket_by_code(&self, code: &str) -> Result<Option<Ticket>> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_code = $1");
        let row: Option<TicketRow> = sqlx::query_as(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TicketRow::into_ticket).transpose()
    }

    async fn tickets_for_user(&self, user_id: i32) -> Result<Vec<Ticket>> {
        let sql = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE user_id = $1 ORDER BY purchase_date DESC"
        );
        let rows: Vec<TicketRow> = sqlx::query_as(&sql).bind(user_id).fetch_all(&self.pool).await?;
        rows.into_iter().map(TicketRow::into_ticket).collect()
    }

    async fn mark_ticket_used(&self, code: &str) -> Result<bool> {
        let updated = sqlx::query(
            "UPDATE tickets SET status = 'USED' WHERE ticket_code = $1 AND status = 'VALID'",
        )
        .bind(code)
        .execute(&self.pool)
        .await?;
        Ok(updated.rows_affected() == 1)
    }

    async fn user_has_valid_ticket(&self, user_id: i32) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM tickets WHERE user_id = $1 AND status = 'VALID')",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_gate_device(&self, device: NewGateDevice) -> Result<GateDevice> {
        let sql = format!(
            "INSERT INTO gate_devices (device_name, device_location, device_type) \
             VALUES ($1, $2, $3) RETURNING {GATE_COLUMNS}"
        );
        let row: GateDeviceRow = sqlx::query_as(&sql)
            .bind(&device.device_name)
            .bind(&device.device_location)
            .bind(device.device_type.as_str())
            .fetch_one(&self.pool)
            .await?;
        row.into_gate_device()
    }

    async fn find_gate_device(&self, id: i32) -> Result<Option<GateDevice>> {
        let sql = format!("SELECT {GATE_COLUMNS} FROM gate_devices WHERE id = $1");
        let row: Option<GateDeviceRow> =
            sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(GateDeviceRow::into_gate_device).transpose()
    }

    async fn list_active_gate_devices(&self) -> Result<Vec<GateDevice>> {
        let sql = format!(
            "SELECT {GATE_COLUMNS} FROM gate_devices WHERE is_active = TRUE ORDER BY device_name"
        );
        let rows: Vec<GateDeviceRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(GateDeviceRow::into_gate_device).collect()
    }

    async fn append_access_log(&self, entry: NewAccessLog) -> Result<AccessLog> {
        let sql = format!(
            "INSERT INTO access_logs (user_id, ticket_id, gate_device_id, access_type, \
             access_result, denial_reason, ip_address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {LOG_COLUMNS}"
        );
        let row: AccessLogRow = sqlx::query_as(&sql)
            .bind(entry.user_id)
            .bind(entry.ticket_id)
            .bind(entry.gate_device_id)
            .bind(entry.access_type.as_str())
            .bind(entry.access_result.as_str())
            .bind(&entry.denial_reason)
            .bind(&entry.ip_address)
            .fetch_one(&self.pool)
            .await?;
        row.into_access_log()
    }

    async fn list_access_logs(&self, limit: i64) -> Result<Vec<AccessLog>> {
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM access_logs ORDER BY access_timestamp DESC LIMIT $1"
        );
        let rows: Vec<AccessLogRow> = sqlx::query_as(&sql).bind(limit).fetch_all(&self.pool).await?;
        rows.into_iter().map(AccessLogRow::into_access_log).collect()
    }

    async fn access_logs_for_user(&self, user_id: i32) -> Result<Vec<AccessLog>> {
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM access_logs WHERE user_id = $1 \
             ORDER BY access_timestamp DESC"
        );
        let rows: Vec<AccessLogRow> =
            sqlx::query_as(&sql).bind(user_id).fetch_all(&self.pool).await?;
        rows.into_iter().map(AccessLogRow::into_access_log).collect()
    }

    async fn enroll_biometric(&self, user_id: i32) -> Result<()> {
        // Idempotent: re-enrolling is a no-op.
        sqlx::query(
            "INSERT INTO biometric_enrollments (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn has_biometric(&self, user_id: i32) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM biometric_enrollments WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
