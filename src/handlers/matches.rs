use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;

use crate::models::NewMatchEvent;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};
use crate::AppState;
use crate::store::Store;

pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.store.list_match_events().await?;
    Ok(success(events, "Matches retrieved").into_response())
}

pub async fn upcoming(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.store.list_upcoming_match_events().await?;
    Ok(success(events, "Upcoming matches retrieved").into_response())
}

pub async fn find(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let event = state
        .store
        .find_match_event(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Match with id '{}' was not found", id)))?;
    Ok(success(event, "Match retrieved").into_response())
}

/// Staff action: create a match. Role enforcement lives in the staff
/// front-end, as it did in the desktop screens.
pub async fn create(
    State(state): State<AppState>,
    Json(event): Json<NewMatchEvent>,
) -> Result<Response, AppError> {
    if event.match_name.trim().is_empty() {
        return Err(AppError::ValidationError("Match name is required".into()));
    }
    if event.team_a.trim().is_empty() || event.team_b.trim().is_empty() {
        return Err(AppError::ValidationError("Both team names are required".into()));
    }
    if event.total_capacity <= 0 {
        return Err(AppError::ValidationError(
            "Total capacity must be positive".into(),
        ));
    }
    if event.ticket_price < Decimal::ZERO {
        return Err(AppError::ValidationError(
            "Ticket price cannot be negative".into(),
        ));
    }

    let event = state.store.create_match_event(event).await?;
    Ok(created(event, "Match created").into_response())
}
