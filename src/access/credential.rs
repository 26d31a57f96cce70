//! Decoding of presented credentials.
//!
//! A scan hands us either the full QR payload
//! (`TICKET:<code>:USER:<userId>:MATCH:<matchId>`) or whatever the operator
//! typed at the gate. Malformed structured payloads are NOT rejected: they
//! fall back to being treated as a bare ticket code, which is what lets
//! manual code entry work at all.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("empty credential")]
    Empty,
}

/// What the parser extracted from one presented string. Lives for a single
/// access attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedCredential {
    pub ticket_code: String,
    /// Only present when the structured payload form matched; bare codes
    /// carry no match binding and skip the match cross-check downstream.
    pub expected_match_id: Option<i32>,
}

pub fn parse(raw: &str) -> Result<ParsedCredential, CredentialError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CredentialError::Empty);
    }

    if let Some(credential) = parse_structured(trimmed) {
        return Ok(credential);
    }

    Ok(ParsedCredential {
        ticket_code: trimmed.to_string(),
        expected_match_id: None,
    })
}

/// Exactly six colon-separated segments with the literal TICKET/USER/MATCH
/// markers and numeric user/match ids; anything else is not the structured
/// form.
fn parse_structured(raw: &str) -> Option<ParsedCredential> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 6 || parts[0] != "TICKET" || parts[2] != "USER" || parts[4] != "MATCH" {
        return None;
    }

    let _user_id: i32 = parts[3].parse().ok()?;
    let match_id: i32 = parts[5].parse().ok()?;

    Some(ParsedCredential {
        ticket_code: parts[1].to_string(),
        expected_match_id: Some(match_id),
    })
}
