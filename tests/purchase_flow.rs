//! Purchase, registration/login, and supporter self-check flows against the
//! in-memory store.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use matchday_server::access::{credential, AccessEngine};
use matchday_server::auth::{self, Registration};
use matchday_server::models::{MatchEvent, NewMatchEvent, Role, TicketStatus, User};
use matchday_server::store::{MemoryStore, Store};
use matchday_server::tickets::{self, TicketError};

// ============================================================================
// Helpers
// ============================================================================

fn registration(username: &str) -> Registration {
    Registration {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "un-mot-de-passe".to_string(),
        first_name: "Test".to_string(),
        last_name: "Supporter".to_string(),
        phone: Some("+212600000000".to_string()),
        role: Role::Supporter,
    }
}

async fn seed_user(store: &MemoryStore, username: &str) -> User {
    auth::register(store, registration(username)).await.unwrap()
}

async fn seed_match(store: &MemoryStore, capacity: i32) -> MatchEvent {
    store
        .create_match_event(NewMatchEvent {
            match_name: "Maroc - Portugal".to_string(),
            match_date: Utc::now() + Duration::days(14),
            venue: "Stade Ibn Batouta".to_string(),
            team_a: "Maroc".to_string(),
            team_b: "Portugal".to_string(),
            total_capacity: capacity,
            ticket_price: Decimal::new(30000, 2),
        })
        .await
        .unwrap()
}

// ============================================================================
// Purchase
// ============================================================================

#[tokio::test]
async fn test_purchase_creates_valid_ticket_and_takes_one_seat() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "amine").await;
    let event = seed_match(&store, 2).await;

    let ticket = tickets::purchase(&store, &user, event.id, Some("B-7".to_string()))
        .await
        .unwrap();

    assert!(ticket.ticket_code.starts_with("TKT-"));
    assert_eq!(ticket.status, TicketStatus::Valid);
    assert_eq!(ticket.seat_number.as_deref(), Some("B-7"));

    let event = store.find_match_event(event.id).await.unwrap().unwrap();
    assert_eq!(event.available_tickets, 1);
}

#[tokio::test]
async fn test_purchase_payload_round_trips_through_parser() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "nadia").await;
    let event = seed_match(&store, 5).await;

    let ticket = tickets::purchase(&store, &user, event.id, None).await.unwrap();

    let parsed = credential::parse(&ticket.qr_code_data).unwrap();
    assert_eq!(parsed.ticket_code, ticket.ticket_code);
    assert_eq!(parsed.expected_match_id, Some(event.id));
}

#[tokio::test]
async fn test_purchase_fails_when_sold_out() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "hamza").await;
    let event = seed_match(&store, 1).await;

    tickets::purchase(&store, &user, event.id, None).await.unwrap();
    let err = tickets::purchase(&store, &user, event.id, None).await.unwrap_err();

    assert!(matches!(err, TicketError::NoTicketsAvailable(id) if id == event.id));

    // No ticket created, counter untouched at zero.
    assert_eq!(store.tickets_for_user(user.id).await.unwrap().len(), 1);
    let event = store.find_match_event(event.id).await.unwrap().unwrap();
    assert_eq!(event.available_tickets, 0);
}

#[tokio::test]
async fn test_purchase_fails_for_unknown_match() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "sara").await;

    let err = tickets::purchase(&store, &user, 42, None).await.unwrap_err();
    assert!(matches!(err, TicketError::MatchNotFound(42)));
}

#[tokio::test]
async fn test_concurrent_purchases_never_oversell_last_seat() {
    let store = MemoryStore::new();
    let user_a = seed_user(&store, "ali").await;
    let user_b = seed_user(&store, "badr").await;
    let event = seed_match(&store, 1).await;

    let store_a = store.clone();
    let store_b = store.clone();
    let event_id = event.id;

    let buy_a =
        tokio::spawn(async move { tickets::purchase(&store_a, &user_a, event_id, None).await });
    let buy_b =
        tokio::spawn(async move { tickets::purchase(&store_b, &user_b, event_id, None).await });

    let (result_a, result_b) = (buy_a.await.unwrap(), buy_b.await.unwrap());
    assert!(result_a.is_ok() ^ result_b.is_ok());

    let event = store.find_match_event(event.id).await.unwrap().unwrap();
    assert_eq!(event.available_tickets, 0);
}

#[tokio::test]
async fn test_user_tickets_listed_most_recent_first() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "meryem").await;
    let event = seed_match(&store, 5).await;

    let first = tickets::purchase(&store, &user, event.id, None).await.unwrap();
    let second = tickets::purchase(&store, &user, event.id, None).await.unwrap();

    let listed = store.tickets_for_user(user.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].ticket_code, second.ticket_code);
    assert_eq!(listed[1].ticket_code, first.ticket_code);
}

// ============================================================================
// Registration / login
// ============================================================================

#[tokio::test]
async fn test_register_then_login() {
    let store = MemoryStore::new();
    let registered = auth::register(&store, registration("imane")).await.unwrap();

    let logged_in = auth::login(&store, "imane", "un-mot-de-passe").await.unwrap();
    assert_eq!(logged_in.id, registered.id);
    assert_eq!(logged_in.role, Role::Supporter);
}

#[tokio::test]
async fn test_login_rejects_wrong_password_and_unknown_user() {
    let store = MemoryStore::new();
    auth::register(&store, registration("omar")).await.unwrap();

    let err = auth::login(&store, "omar", "faux").await.unwrap_err();
    assert!(matches!(err, auth::AuthError::InvalidCredentials));

    let err = auth::login(&store, "personne", "un-mot-de-passe").await.unwrap_err();
    assert!(matches!(err, auth::AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_register_rejects_duplicates() {
    let store = MemoryStore::new();
    auth::register(&store, registration("zineb")).await.unwrap();

    let err = auth::register(&store, registration("zineb")).await.unwrap_err();
    assert!(matches!(err, auth::AuthError::UsernameTaken));

    let mut same_email = registration("autre");
    same_email.email = "zineb@example.com".to_string();
    let err = auth::register(&store, same_email).await.unwrap_err();
    assert!(matches!(err, auth::AuthError::EmailTaken));
}

// ============================================================================
// Supporter self-check
// ============================================================================

#[tokio::test]
async fn test_self_check_requires_all_three_signals() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "khadija").await;
    let event = seed_match(&store, 5).await;
    let engine = AccessEngine::new(store.clone());

    // Nothing yet.
    let report = engine.self_check(user.id, false).await.unwrap();
    assert!(!report.has_ticket && !report.has_qr && !report.has_biometric);
    assert!(!report.granted);

    // Ticket + biometric but no QR generated this session.
    tickets::purchase(&store, &user, event.id, None).await.unwrap();
    store.enroll_biometric(user.id).await.unwrap();
    let report = engine.self_check(user.id, false).await.unwrap();
    assert!(report.has_ticket && report.has_biometric);
    assert!(!report.granted);

    // All three.
    let report = engine.self_check(user.id, true).await.unwrap();
    assert!(report.granted);
}

#[tokio::test]
async fn test_self_check_never_consumes_the_ticket() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "yasmine").await;
    let event = seed_match(&store, 5).await;
    let engine = AccessEngine::new(store.clone());

    let ticket = tickets::purchase(&store, &user, event.id, None).await.unwrap();
    store.enroll_biometric(user.id).await.unwrap();
    engine.self_check(user.id, true).await.unwrap();

    let stored = store
        .find_ticket_by_code(&ticket.ticket_code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, TicketStatus::Valid);

    // And the informational path writes no audit entries.
    assert_eq!(store.list_access_logs(10).await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_self_check_ignores_used_tickets() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "mehdi").await;
    let event = seed_match(&store, 5).await;
    let engine = AccessEngine::new(store.clone());

    let ticket = tickets::purchase(&store, &user, event.id, None).await.unwrap();
    store.enroll_biometric(user.id).await.unwrap();

    // Spend the ticket at the gate, then re-check.
    let decision = engine.decide(&ticket.qr_code_data, None, None).await.unwrap();
    assert!(decision.granted);

    let report = engine.self_check(user.id, true).await.unwrap();
    assert!(!report.has_ticket);
    assert!(!report.granted);
}
