//! End-to-end access-decision properties, exercised against the in-memory
//! store. The same conditional-update contract backs the Postgres store, so
//! these cover the engine's policy, idempotence, and audit behavior.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use matchday_server::access::AccessEngine;
use matchday_server::models::{
    AccessOutcome, GateType, MatchEvent, NewGateDevice, NewMatchEvent, NewUser, Role, TicketStatus,
    User,
};
use matchday_server::store::{MemoryStore, Store};
use matchday_server::tickets;

// ============================================================================
// Helpers
// ============================================================================

async fn seed_user(store: &MemoryStore, username: &str) -> User {
    store
        .create_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "irrelevant".to_string(),
            first_name: "Test".to_string(),
            last_name: "Supporter".to_string(),
            phone: None,
            role: Role::Supporter,
        })
        .await
        .expect("user creation should succeed")
}

async fn seed_match(store: &MemoryStore, capacity: i32) -> MatchEvent {
    store
        .create_match_event(NewMatchEvent {
            match_name: "Maroc - Espagne".to_string(),
            match_date: Utc::now() + Duration::days(30),
            venue: "Grand Stade de Casablanca".to_string(),
            team_a: "Maroc".to_string(),
            team_b: "Espagne".to_string(),
            total_capacity: capacity,
            ticket_price: Decimal::new(45000, 2),
        })
        .await
        .expect("match creation should succeed")
}

fn engine(store: &MemoryStore) -> AccessEngine<MemoryStore> {
    AccessEngine::new(store.clone())
}

// ============================================================================
// Grant path
// ============================================================================

#[tokio::test]
async fn test_full_payload_grants_and_marks_ticket_used() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "rachid").await;
    let event = seed_match(&store, 10).await;
    let ticket = tickets::purchase(&store, &user, event.id, Some("A-12".to_string()))
        .await
        .unwrap();

    let result = engine(&store)
        .decide(&ticket.qr_code_data, None, None)
        .await
        .unwrap();

    assert!(result.granted);
    assert_eq!(result.message, "Accès autorisé");

    let stored = store
        .find_ticket_by_code(&ticket.ticket_code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, TicketStatus::Used);

    let logs = store.list_access_logs(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].access_result, AccessOutcome::Granted);
    assert_eq!(logs[0].user_id, Some(user.id));
    assert_eq!(logs[0].ticket_id, Some(ticket.id));
    assert_eq!(logs[0].denial_reason, None);
}

#[tokio::test]
async fn test_bare_ticket_code_grants_without_match_check() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "samira").await;
    let event = seed_match(&store, 10).await;
    let ticket = tickets::purchase(&store, &user, event.id, None).await.unwrap();

    // Bare code: no embedded match id, so no cross-check against any match.
    let result = engine(&store)
        .decide(&ticket.ticket_code, None, None)
        .await
        .unwrap();

    assert!(result.granted);
}

// ============================================================================
// Denial paths
// ============================================================================

#[tokio::test]
async fn test_replay_after_grant_is_denied() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "youssef").await;
    let event = seed_match(&store, 10).await;
    let ticket = tickets::purchase(&store, &user, event.id, None).await.unwrap();

    let engine = engine(&store);
    let first = engine.decide(&ticket.qr_code_data, None, None).await.unwrap();
    let second = engine.decide(&ticket.qr_code_data, None, None).await.unwrap();

    assert!(first.granted);
    assert!(!second.granted);
    assert_eq!(second.message, "Ticket invalide ou déjà utilisé");

    let logs = store.list_access_logs(10).await.unwrap();
    assert_eq!(logs.len(), 2);
    // Most recent first: the replay denial, then the grant.
    assert_eq!(logs[0].access_result, AccessOutcome::Denied);
    assert_eq!(logs[1].access_result, AccessOutcome::Granted);
}

#[tokio::test]
async fn test_empty_credential_is_denied_without_references() {
    let store = MemoryStore::new();
    let engine = engine(&store);

    for raw in ["", "   "] {
        let result = engine.decide(raw, None, None).await.unwrap();
        assert!(!result.granted);
        assert_eq!(result.message, "QR Code vide");
    }

    let logs = store.list_access_logs(10).await.unwrap();
    assert_eq!(logs.len(), 2);
    for log in &logs {
        assert_eq!(log.access_result, AccessOutcome::Denied);
        assert_eq!(log.denial_reason.as_deref(), Some("QR Code vide"));
        assert_eq!(log.user_id, None);
        assert_eq!(log.ticket_id, None);
    }
}

#[tokio::test]
async fn test_unknown_code_is_denied_with_code_in_reason() {
    let store = MemoryStore::new();

    let result = engine(&store).decide("TKT-UNKNOWN", None, None).await.unwrap();

    assert!(!result.granted);
    assert_eq!(result.message, "Ticket non trouvé: TKT-UNKNOWN");

    let logs = store.list_access_logs(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(
        logs[0].denial_reason.as_deref(),
        Some("Ticket non trouvé: TKT-UNKNOWN")
    );
    assert_eq!(logs[0].user_id, None);
    assert_eq!(logs[0].ticket_id, None);
}

#[tokio::test]
async fn test_match_mismatch_is_denied_and_ticket_stays_valid() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "fatima").await;
    let bound_match = seed_match(&store, 10).await;
    let other_match = seed_match(&store, 10).await;
    let ticket = tickets::purchase(&store, &user, bound_match.id, None).await.unwrap();

    // Payload claims the other match.
    let forged = tickets::qr_payload(&ticket.ticket_code, user.id, other_match.id);
    let result = engine(&store).decide(&forged, None, None).await.unwrap();

    assert!(!result.granted);
    assert_eq!(result.message, "Ticket ne correspond pas au match");

    let stored = store
        .find_ticket_by_code(&ticket.ticket_code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, TicketStatus::Valid);

    let logs = store.list_access_logs(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].user_id, Some(user.id));
    assert_eq!(logs[0].ticket_id, Some(ticket.id));
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_scans_grant_exactly_once() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "driss").await;
    let event = seed_match(&store, 10).await;
    let ticket = tickets::purchase(&store, &user, event.id, None).await.unwrap();

    let engine_a = engine(&store);
    let engine_b = engine_a.clone();
    let payload_a = ticket.qr_code_data.clone();
    let payload_b = ticket.qr_code_data.clone();

    let scan_a = tokio::spawn(async move { engine_a.decide(&payload_a, None, None).await.unwrap() });
    let scan_b = tokio::spawn(async move { engine_b.decide(&payload_b, None, None).await.unwrap() });

    let (result_a, result_b) = (scan_a.await.unwrap(), scan_b.await.unwrap());

    // Exactly one of the two scans wins.
    assert!(result_a.granted ^ result_b.granted);
    let loser = if result_a.granted { &result_b } else { &result_a };
    assert_eq!(loser.message, "Ticket invalide ou déjà utilisé");

    let stored = store
        .find_ticket_by_code(&ticket.ticket_code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, TicketStatus::Used);

    let logs = store.list_access_logs(10).await.unwrap();
    assert_eq!(logs.len(), 2);
    let granted = logs
        .iter()
        .filter(|l| l.access_result == AccessOutcome::Granted)
        .count();
    assert_eq!(granted, 1);
}

// ============================================================================
// Gate references
// ============================================================================

#[tokio::test]
async fn test_gate_reference_attached_only_when_device_resolves() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "karim").await;
    let event = seed_match(&store, 10).await;
    let gate = store
        .create_gate_device(NewGateDevice {
            device_name: "Porte Nord A".to_string(),
            device_location: "Tribune Nord".to_string(),
            device_type: GateType::Entrance,
        })
        .await
        .unwrap();

    let engine = engine(&store);

    let ticket = tickets::purchase(&store, &user, event.id, None).await.unwrap();
    engine
        .decide(&ticket.qr_code_data, Some(gate.id), None)
        .await
        .unwrap();

    // Unknown and non-positive device ids are omitted, not fatal.
    let ticket2 = tickets::purchase(&store, &user, event.id, None).await.unwrap();
    engine
        .decide(&ticket2.qr_code_data, Some(999), None)
        .await
        .unwrap();
    let ticket3 = tickets::purchase(&store, &user, event.id, None).await.unwrap();
    engine
        .decide(&ticket3.qr_code_data, Some(-4), None)
        .await
        .unwrap();

    let mut logs = store.list_access_logs(10).await.unwrap();
    logs.reverse(); // chronological
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0].gate_device_id, Some(gate.id));
    assert_eq!(logs[1].gate_device_id, None);
    assert_eq!(logs[2].gate_device_id, None);
}
