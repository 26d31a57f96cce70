//! Ticket purchase and QR payload generation.

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewTicket, Ticket, User};
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("Match non trouvé: {0}")]
    MatchNotFound(i32),

    #[error("Plus de tickets disponibles pour le match: {0}")]
    NoTicketsAvailable(i32),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// `TKT-<yyyyMMddHHmmss>-<8 uppercase hex chars>`.
pub fn generate_ticket_code() -> String {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let unique = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("TKT-{timestamp}-{unique}")
}

/// Payload embedded in the ticket's QR code. The credential parser
/// understands exactly this shape.
pub fn qr_payload(ticket_code: &str, user_id: i32, match_event_id: i32) -> String {
    format!("TICKET:{ticket_code}:USER:{user_id}:MATCH:{match_event_id}")
}

/// Buy one seat for `user` on the given match.
///
/// The ticket insert and the seat decrement are one store transaction, so a
/// failure between the two cannot oversell; racing purchases of the last
/// seat are decided by the store's conditional decrement.
pub async fn purchase<S: Store>(
    store: &S,
    user: &User,
    match_event_id: i32,
    seat_number: Option<String>,
) -> Result<Ticket, TicketError> {
    let event = store
        .find_match_event(match_event_id)
        .await?
        .ok_or(TicketError::MatchNotFound(match_event_id))?;

    if event.available_tickets <= 0 {
        tracing::warn!(match_event_id, "purchase attempt on sold-out match");
        return Err(TicketError::NoTicketsAvailable(match_event_id));
    }

    let ticket_code = generate_ticket_code();
    let qr_code_data = qr_payload(&ticket_code, user.id, match_event_id);

    let ticket = store
        .insert_ticket(NewTicket {
            ticket_code,
            user_id: user.id,
            match_event_id,
            seat_number,
            qr_code_data,
        })
        .await
        .map_err(|e| match e {
            // The availability check above raced with another purchase.
            StoreError::SeatsExhausted(id) => TicketError::NoTicketsAvailable(id),
            other => TicketError::Store(other),
        })?;

    tracing::info!(
        code = %ticket.ticket_code,
        user_id = user.id,
        match_event_id,
        "ticket purchased"
    );
    Ok(ticket)
}
