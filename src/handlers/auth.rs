use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::auth::{self, Registration};
use crate::utils::error::AppError;
use crate::utils::response::{created, success};
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(registration): Json<Registration>,
) -> Result<Response, AppError> {
    let user = auth::register(&state.store, registration).await?;
    Ok(created(user, "Account created").into_response())
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let user = auth::login(&state.store, &request.username, &request.password).await?;
    Ok(success(user, "Login successful").into_response())
}
