//! Gate access control.
//!
//! [`AccessEngine::decide`] is the sole authority for marking tickets USED.
//! Every attempt, granted or denied, appends exactly one audit-log entry;
//! denial is never silent. Decision rules are ordered and the first match
//! terminates the attempt.

pub mod credential;
pub mod self_check;

pub use credential::{CredentialError, ParsedCredential};
pub use self_check::SelfCheckReport;

use serde::Serialize;

use crate::models::{AccessOutcome, AccessType, NewAccessLog, Ticket};
use crate::store::{Store, StoreError};

pub const MSG_EMPTY_CREDENTIAL: &str = "QR Code vide";
pub const MSG_TICKET_NOT_VALID: &str = "Ticket invalide ou déjà utilisé";
pub const MSG_MATCH_MISMATCH: &str = "Ticket ne correspond pas au match";
pub const MSG_ACCESS_GRANTED: &str = "Accès autorisé";

/// Terminal outcome of one access attempt, as shown to the gate operator.
#[derive(Debug, Clone, Serialize)]
pub struct AccessResult {
    pub granted: bool,
    pub message: String,
}

impl AccessResult {
    fn granted() -> Self {
        Self {
            granted: true,
            message: MSG_ACCESS_GRANTED.to_string(),
        }
    }

    fn denied(message: impl Into<String>) -> Self {
        Self {
            granted: false,
            message: message.into(),
        }
    }
}

#[derive(Clone)]
pub struct AccessEngine<S> {
    store: S,
}

impl<S: Store> AccessEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Decide whether the presented credential opens the gate.
    ///
    /// Exactly one audit entry is appended per call, and the ticket status
    /// mutates at most once, only on the grant path. A store failure aborts
    /// the attempt with `Err` — it is surfaced as a system error, never as a
    /// grant.
    pub async fn decide(
        &self,
        raw_credential: &str,
        gate_device_id: Option<i32>,
        origin: Option<String>,
    ) -> Result<AccessResult, StoreError> {
        let gate_ref = self.resolve_gate(gate_device_id).await?;

        let credential = match credential::parse(raw_credential) {
            Ok(credential) => credential,
            Err(CredentialError::Empty) => {
                self.log_attempt(None, gate_ref, AccessOutcome::Denied,
                    Some(MSG_EMPTY_CREDENTIAL.to_string()), origin)
                    .await?;
                return Ok(AccessResult::denied(MSG_EMPTY_CREDENTIAL));
            }
        };

        let ticket = match self.store.find_ticket_by_code(&credential.ticket_code).await? {
            Some(ticket) => ticket,
            None => {
                let reason = format!("Ticket non trouvé: {}", credential.ticket_code);
                self.log_attempt(None, gate_ref, AccessOutcome::Denied, Some(reason.clone()), origin)
                    .await?;
                tracing::warn!(code = %credential.ticket_code, "scan for unknown ticket");
                return Ok(AccessResult::denied(reason));
            }
        };

        if !ticket.is_valid() {
            self.log_attempt(Some(&ticket), gate_ref, AccessOutcome::Denied,
                Some(MSG_TICKET_NOT_VALID.to_string()), origin)
                .await?;
            return Ok(AccessResult::denied(MSG_TICKET_NOT_VALID));
        }

        // Bare codes carry no match binding and skip this check entirely, so
        // manual code entry keeps working. Known policy gap: a bare code is
        // never cross-checked against the match it was sold for.
        if let Some(expected) = credential.expected_match_id {
            if expected != ticket.match_event_id {
                self.log_attempt(Some(&ticket), gate_ref, AccessOutcome::Denied,
                    Some(MSG_MATCH_MISMATCH.to_string()), origin)
                    .await?;
                return Ok(AccessResult::denied(MSG_MATCH_MISMATCH));
            }
        }

        // Compare-and-swap VALID -> USED. Losing the swap means a concurrent
        // scan of the same code got there first; report what a fresher read
        // would have shown.
        if !self.store.mark_ticket_used(&ticket.ticket_code).await? {
            self.log_attempt(Some(&ticket), gate_ref, AccessOutcome::Denied,
                Some(MSG_TICKET_NOT_VALID.to_string()), origin)
                .await?;
            return Ok(AccessResult::denied(MSG_TICKET_NOT_VALID));
        }

        self.log_attempt(Some(&ticket), gate_ref, AccessOutcome::Granted, None, origin)
            .await?;
        tracing::info!(code = %ticket.ticket_code, user_id = ticket.user_id, "access granted");
        Ok(AccessResult::granted())
    }

    /// A gate reference is attached only when a positive id resolves to a
    /// known device; anything else is omitted rather than failing the
    /// decision.
    async fn resolve_gate(&self, gate_device_id: Option<i32>) -> Result<Option<i32>, StoreError> {
        match gate_device_id {
            Some(id) if id > 0 => Ok(self.store.find_gate_device(id).await?.map(|d| d.id)),
            _ => Ok(None),
        }
    }

    async fn log_attempt(
        &self,
        ticket: Option<&Ticket>,
        gate_device_id: Option<i32>,
        result: AccessOutcome,
        denial_reason: Option<String>,
        ip_address: Option<String>,
    ) -> Result<(), StoreError> {
        self.store
            .append_access_log(NewAccessLog {
                user_id: ticket.map(|t| t.user_id),
                ticket_id: ticket.map(|t| t.id),
                gate_device_id,
                access_type: AccessType::Ticket,
                access_result: result,
                denial_reason,
                ip_address,
            })
            .await?;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
