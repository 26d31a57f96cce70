use axum::{
    routing::{get, post},
    Router,
};

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{self, access, auth, biometric, matches, tickets};
use crate::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/matches", get(matches::list).post(matches::create))
        .route("/api/matches/upcoming", get(matches::upcoming))
        .route("/api/matches/:id", get(matches::find))
        .route("/api/tickets", post(tickets::purchase))
        .route("/api/users/:id/tickets", get(tickets::for_user))
        .route("/api/users/:id/biometric", post(biometric::enroll))
        .route("/api/users/:id/self-check", get(biometric::self_check))
        .route("/api/access/scan", post(access::scan))
        .route("/api/access/logs", get(access::logs))
        .route("/api/users/:id/access-logs", get(access::logs_for_user))
        .route("/api/gates", get(access::list_gates).post(access::create_gate))
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
