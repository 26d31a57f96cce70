//! In-memory store used by the test suite.
//!
//! A single mutex over the whole state stands in for the database's
//! transactional discipline: the seat decrement + ticket insert happen under
//! one lock, and `mark_ticket_used` is a genuine compare-and-swap, so the
//! concurrency properties of the Postgres store hold here too.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{Result, Store, StoreError};
use crate::models::{
    AccessLog, GateDevice, MatchEvent, MatchStatus, NewAccessLog, NewGateDevice, NewMatchEvent,
    NewTicket, NewUser, Ticket, TicketStatus, User,
};

#[derive(Default)]
struct State {
    users: HashMap<i32, User>,
    match_events: HashMap<i32, MatchEvent>,
    tickets: HashMap<String, Ticket>,
    gate_devices: HashMap<i32, GateDevice>,
    access_logs: Vec<AccessLog>,
    biometric: HashSet<i32>,
    next_user_id: i32,
    next_match_id: i32,
    next_ticket_id: i32,
    next_gate_id: i32,
    next_log_id: i64,
}

#[derive(Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut state = self.state.lock().await;
        state.next_user_id += 1;
        let user = User {
            id: state.next_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            role: user.role,
            is_active: true,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_match_event(&self, event: NewMatchEvent) -> Result<MatchEvent> {
        let mut state = self.state.lock().await;
        state.next_match_id += 1;
        let now = Utc::now();
        let event = MatchEvent {
            id: state.next_match_id,
            match_name: event.match_name,
            match_date: event.match_date,
            venue: event.venue,
            team_a: event.team_a,
            team_b: event.team_b,
            total_capacity: event.total_capacity,
            available_tickets: event.total_capacity,
            ticket_price: event.ticket_price,
            status: MatchStatus::Upcoming,
            created_at: now,
            updated_at: now,
        };
        state.match_events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_match_event(&self, id: i32) -> Result<Option<MatchEvent>> {
        let state = self.state.lock().await;
        Ok(state.match_events.get(&id).cloned())
    }

    async fn list_match_events(&self) -> Result<Vec<MatchEvent>> {
        let state = self.state.lock().await;
        let mut events: Vec<MatchEvent> = state.match_events.values().cloned().collect();
        events.sort_by_key(|e| e.match_date);
        Ok(events)
    }

    async fn list_upcoming_match_events(&self) -> Result<Vec<MatchEvent>> {
        let now = Utc::now();
        let state = self.state.lock().await;
        let mut events: Vec<MatchEvent> = state
            .match_events
            .values()
            .filter(|e| e.status == MatchStatus::Upcoming && e.match_date > now)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.match_date);
        Ok(events)
    }

    async fn insert_ticket(&self, ticket: NewTicket) -> Result<Ticket> {
        let mut state = self.state.lock().await;

        // Both writes under one lock, mirroring the Postgres transaction.
        let match_event_id = ticket.match_event_id;
        match state.match_events.get_mut(&match_event_id) {
            Some(event) if event.available_tickets > 0 => {
                event.available_tickets -= 1;
                event.updated_at = Utc::now();
            }
            _ => return Err(StoreError::SeatsExhausted(match_event_id)),
        }

        state.next_ticket_id += 1;
        let ticket = Ticket {
            id: state.next_ticket_id,
            ticket_code: ticket.ticket_code,
            user_id: ticket.user_id,
            match_event_id: ticket.match_event_id,
            seat_number: ticket.seat_number,
            qr_code_data: ticket.qr_code_data,
            status: TicketStatus::Valid,
            purchase_date: Utc::now(),
        };
        state.tickets.insert(ticket.ticket_code.clone(), ticket.clone());
        Ok(ticket)
    }

    async fn find_ticket_by_code(&self, code: &str) -> Result<Option<Ticket>> {
        let state = self.state.lock().await;
        Ok(state.tickets.get(code).cloned())
    }

    async fn tickets_for_user(&self, user_id: i32) -> Result<Vec<Ticket>> {
        let state = self.state.lock().await;
        let mut tickets: Vec<Ticket> = state
            .tickets
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| (b.purchase_date, b.id).cmp(&(a.purchase_date, a.id)));
        Ok(tickets)
    }

    async fn mark_ticket_used(&self, code: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        match state.tickets.get_mut(code) {
            Some(ticket) if ticket.status == TicketStatus::Valid => {
                ticket.status = TicketStatus::Used;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn user_has_valid_ticket(&self, user_id: i32) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state
            .tickets
            .values()
            .any(|t| t.user_id == user_id && t.status == TicketStatus::Valid))
    }

    async fn create_gate_device(&self, device: NewGateDevice) -> Result<GateDevice> {
        let mut state = self.state.lock().await;
        state.next_gate_id += 1;
        let device = GateDevice {
            id: state.next_gate_id,
            device_name: device.device_name,
            device_location: device.device_location,
            device_type: device.device_type,
            is_active: true,
            last_sync: None,
        };
        state.gate_devices.insert(device.id, device.clone());
        Ok(device)
    }

    async fn find_gate_device(&self, id: i32) -> Result<Option<GateDevice>> {
        let state = self.state.lock().await;
        Ok(state.gate_devices.get(&id).cloned())
    }

    async fn list_active_gate_devices(&self) -> Result<Vec<GateDevice>> {
        let state = self.state.lock().await;
        let mut devices: Vec<GateDevice> = state
            .gate_devices
            .values()
            .filter(|d| d.is_active)
            .cloned()
            .collect();
        devices.sort_by(|a, b| a.device_name.cmp(&b.device_name));
        Ok(devices)
    }

    async fn append_access_log(&self, entry: NewAccessLog) -> Result<AccessLog> {
        let mut state = self.state.lock().await;
        state.next_log_id += 1;
        let log = AccessLog {
            id: state.next_log_id,
            user_id: entry.user_id,
            ticket_id: entry.ticket_id,
            gate_device_id: entry.gate_device_id,
            access_type: entry.access_type,
            access_result: entry.access_result,
            denial_reason: entry.denial_reason,
            access_timestamp: Utc::now(),
            ip_address: entry.ip_address,
        };
        state.access_logs.push(log.clone());
        Ok(log)
    }

    async fn list_access_logs(&self, limit: i64) -> Result<Vec<AccessLog>> {
        let state = self.state.lock().await;
        let mut logs = state.access_logs.clone();
        logs.sort_by(|a, b| (b.access_timestamp, b.id).cmp(&(a.access_timestamp, a.id)));
        logs.truncate(limit.max(0) as usize);
        Ok(logs)
    }

    async fn access_logs_for_user(&self, user_id: i32) -> Result<Vec<AccessLog>> {
        let state = self.state.lock().await;
        let mut logs: Vec<AccessLog> = state
            .access_logs
            .iter()
            .filter(|l| l.user_id == Some(user_id))
            .cloned()
            .collect();
        logs.sort_by(|a, b| (b.access_timestamp, b.id).cmp(&(a.access_timestamp, a.id)));
        Ok(logs)
    }

    async fn enroll_biometric(&self, user_id: i32) -> Result<()> {
        let mut state = self.state.lock().await;
        state.biometric.insert(user_id);
        Ok(())
    }

    async fn has_biometric(&self, user_id: i32) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state.biometric.contains(&user_id))
    }
}
