use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::store::Store;
use crate::tickets;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};
use crate::AppState;

#[derive(Deserialize)]
pub struct PurchaseRequest {
    pub user_id: i32,
    pub match_event_id: i32,
    pub seat_number: Option<String>,
}

pub async fn purchase(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Response, AppError> {
    let user = state
        .store
        .find_user_by_id(request.user_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("User with id '{}' was not found", request.user_id))
        })?;

    let ticket =
        tickets::purchase(&state.store, &user, request.match_event_id, request.seat_number).await?;
    Ok(created(ticket, "Ticket purchased").into_response())
}

pub async fn for_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Response, AppError> {
    let tickets = state.store.tickets_for_user(user_id).await?;
    Ok(success(tickets, "Tickets retrieved").into_response())
}
