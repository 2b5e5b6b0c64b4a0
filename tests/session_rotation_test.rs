// Rotation protocol tests against the in-memory reference store.
//
// These cover the lifecycle rules the engine must hold under adversarial and
// concurrent use: rotation single-winner races, reuse poisoning a whole
// family, expiry being terminal, and logout cascading idempotently.

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use archive_auth::{AuthError, InMemorySessionStore, SessionManager, SessionStore};

fn manager_with_store() -> (SessionManager, Arc<InMemorySessionStore>) {
    let store = Arc::new(InMemorySessionStore::new());
    let manager = SessionManager::new(store.clone(), Duration::days(14));
    (manager, store)
}

#[tokio::test]
async fn test_rotation_changes_token_but_not_family() {
    let (manager, _) = manager_with_store();
    let user_id = Uuid::new_v4();

    let first = manager.start_session(user_id).await.unwrap();
    let second = manager.rotate(&first.token).await.unwrap();

    assert_ne!(second.token, first.token);
    assert_eq!(second.family_id, first.family_id);
    assert_eq!(second.user_id, user_id);
}

#[tokio::test]
async fn test_unknown_token_is_invalid() {
    let (manager, _) = manager_with_store();

    let err = manager.rotate("no-such-token").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_blank_token_is_invalid() {
    let (manager, _) = manager_with_store();

    let err = manager.rotate("  ").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
}

#[tokio::test]
async fn test_reuse_after_rotation_poisons_the_family() {
    let (manager, _) = manager_with_store();

    let first = manager.start_session(Uuid::new_v4()).await.unwrap();
    let second = manager.rotate(&first.token).await.unwrap();

    // Replaying the consumed token trips reuse detection.
    let err = manager.rotate(&first.token).await.unwrap_err();
    assert!(matches!(err, AuthError::ReuseDetected));

    // The cascade also took down the still-valid descendant.
    let err = manager.rotate(&second.token).await.unwrap_err();
    assert!(matches!(err, AuthError::ReuseDetected));
}

#[tokio::test]
async fn test_concurrent_rotation_has_a_single_winner() {
    let (manager, store) = manager_with_store();
    let record = manager.start_session(Uuid::new_v4()).await.unwrap();

    let token = record.token.clone();
    let a = {
        let manager = manager.clone();
        let token = token.clone();
        tokio::spawn(async move { manager.rotate(&token).await })
    };
    let b = {
        let manager = manager.clone();
        let token = token.clone();
        tokio::spawn(async move { manager.rotate(&token).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let winners: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
    assert_eq!(winners.len(), 1, "exactly one rotation must win");

    let loser = results
        .iter()
        .find(|r| r.is_err())
        .and_then(|r| r.as_ref().err())
        .unwrap();
    assert!(matches!(loser, AuthError::ReuseDetected));

    // The loser's cascade revoked every record in the family, the winner's
    // fresh one included: nothing in the chain is current any more.
    let winner = winners[0].as_ref().unwrap();
    let stored = store.find_by_token(&winner.token).await.unwrap().unwrap();
    assert!(stored.revoked);
    assert!(matches!(
        manager.rotate(&winner.token).await.unwrap_err(),
        AuthError::ReuseDetected
    ));
}

#[tokio::test]
async fn test_expiry_is_terminal() {
    let store = Arc::new(InMemorySessionStore::new());
    // Negative TTL: every link is expired the moment it is issued.
    let manager = SessionManager::new(store.clone(), Duration::seconds(-1));

    let record = manager.start_session(Uuid::new_v4()).await.unwrap();

    let err = manager.rotate(&record.token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenExpired));

    // Expiry only revoked the single record, not the family. A second
    // attempt now finds a revoked record, which reads as reuse.
    let stored = store.find_by_token(&record.token).await.unwrap().unwrap();
    assert!(stored.revoked);
    let err = manager.rotate(&record.token).await.unwrap_err();
    assert!(matches!(err, AuthError::ReuseDetected));
}

#[tokio::test]
async fn test_expiry_does_not_cascade_to_current_record() {
    let store = Arc::new(InMemorySessionStore::new());
    let user_id = Uuid::new_v4();

    // A fresh chain whose first link already expired, with a current
    // successor in the same family.
    let short = SessionManager::new(store.clone(), Duration::seconds(-1));
    let expired = short.start_session(user_id).await.unwrap();
    let long = SessionManager::new(store.clone(), Duration::days(14));
    let current = store
        .insert(archive_auth::NewSessionRecord {
            user_id,
            token: "current-token".to_string(),
            family_id: expired.family_id,
            issued_at: chrono::Utc::now(),
            expires_at: chrono::Utc::now() + Duration::days(14),
        })
        .await
        .unwrap();

    assert!(matches!(
        long.rotate(&expired.token).await.unwrap_err(),
        AuthError::TokenExpired
    ));

    // The current link survived: expiry stays localized.
    let stored = store.find_by_token(&current.token).await.unwrap().unwrap();
    assert!(!stored.revoked);
}

#[tokio::test]
async fn test_logout_cascades_and_is_idempotent() {
    let (manager, _) = manager_with_store();

    let record = manager.start_session(Uuid::new_v4()).await.unwrap();
    manager.end_session(&record.token).await.unwrap();

    // Refreshing a logged-out token reads as reuse of a revoked token.
    assert!(manager.rotate(&record.token).await.unwrap_err().is_unauthorized());

    // Logging out twice (and with unknown or blank tokens) never errors.
    manager.end_session(&record.token).await.unwrap();
    manager.end_session("never-issued").await.unwrap();
    manager.end_session("").await.unwrap();
}

#[tokio::test]
async fn test_independent_families_never_interact() {
    let (manager, _) = manager_with_store();
    let user_id = Uuid::new_v4();

    // Two logins for the same user open two unrelated chains.
    let first = manager.start_session(user_id).await.unwrap();
    let second = manager.start_session(user_id).await.unwrap();
    assert_ne!(first.family_id, second.family_id);

    // Poison the first chain; the second keeps rotating.
    let rotated = manager.rotate(&first.token).await.unwrap();
    assert!(manager.rotate(&first.token).await.is_err());
    assert!(manager.rotate(&rotated.token).await.is_err());

    let still_alive = manager.rotate(&second.token).await.unwrap();
    assert_eq!(still_alive.family_id, second.family_id);
}
