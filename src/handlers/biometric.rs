use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::store::Store;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};
use crate::AppState;

/// Enroll the user's biometric capability. This records the flag only; no
/// embedding is computed or stored.
pub async fn enroll(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Response, AppError> {
    ensure_user_exists(&state, user_id).await?;
    state.store.enroll_biometric(user_id).await?;
    Ok(empty_success("Biometric enrollment recorded").into_response())
}

#[derive(Deserialize)]
pub struct SelfCheckQuery {
    /// Whether the supporter generated a QR in the current session. This is
    /// client-side state, so the client reports it.
    #[serde(default)]
    pub qr_generated: bool,
}

pub async fn self_check(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Query(query): Query<SelfCheckQuery>,
) -> Result<Response, AppError> {
    ensure_user_exists(&state, user_id).await?;
    let report = state.engine.self_check(user_id, query.qr_generated).await?;
    Ok(success(report, "Self-check completed").into_response())
}

async fn ensure_user_exists(state: &AppState, user_id: i32) -> Result<(), AppError> {
    state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id '{}' was not found", user_id)))?;
    Ok(())
}
