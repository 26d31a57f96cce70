use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::models::NewGateDevice;
use crate::store::Store;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};
use crate::AppState;

#[derive(Deserialize)]
pub struct ScanRequest {
    /// Decoded QR text or manually typed ticket code. QR image decoding
    /// happens on the scanning device; the engine only ever sees text.
    pub qr_data: String,
    #[serde(default)]
    pub gate_device_id: Option<i32>,
    #[serde(default)]
    pub origin: Option<String>,
}

/// A denial is a normal decision, not an HTTP error; only a store failure
/// becomes a 500.
pub async fn scan(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> Result<Response, AppError> {
    let result = state
        .engine
        .decide(&request.qr_data, request.gate_device_id, request.origin)
        .await?;
    Ok(success(result, "Access decision recorded").into_response())
}

const DEFAULT_LOG_LIMIT: i64 = 1000;

#[derive(Deserialize)]
pub struct LogsQuery {
    pub limit: Option<i64>,
}

pub async fn logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Response, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, DEFAULT_LOG_LIMIT);
    let logs = state.store.list_access_logs(limit).await?;
    Ok(success(logs, "Access logs retrieved").into_response())
}

pub async fn logs_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Response, AppError> {
    let logs = state.store.access_logs_for_user(user_id).await?;
    Ok(success(logs, "Access logs retrieved").into_response())
}

pub async fn list_gates(State(state): State<AppState>) -> Result<Response, AppError> {
    let gates = state.store.list_active_gate_devices().await?;
    Ok(success(gates, "Gate devices retrieved").into_response())
}

pub async fn create_gate(
    State(state): State<AppState>,
    Json(device): Json<NewGateDevice>,
) -> Result<Response, AppError> {
    if device.device_name.trim().is_empty() {
        return Err(AppError::ValidationError("Device name is required".into()));
    }
    let device = state.store.create_gate_device(device).await?;
    Ok(created(device, "Gate device created").into_response())
}
