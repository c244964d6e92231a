//! End-to-end tests of the auth orchestrator against an in-memory store.

mod common;

use authgate::auth::jwt::user_id_from_claims;
use authgate::auth::{verify_token, AuthError};
use uuid::Uuid;

use common::{make_unprovisioned_user, test_service};

const EMAIL: &str = "alice@example.com";
const PASSWORD: &str = "Str0ng!Pass";

#[tokio::test]
async fn signup_returns_pair_and_duplicate_is_rejected() {
    let (_store, service) = test_service();

    let pair = service.sign_up(EMAIL, PASSWORD).await.unwrap();
    assert!(!pair.access_token.is_empty());
    assert!(!pair.refresh_token.is_empty());

    let err = service.sign_up(EMAIL, "AnotherPass1!").await.unwrap_err();
    assert!(matches!(err, AuthError::EmailInUse));
}

#[tokio::test]
async fn signup_persists_refresh_fingerprint() {
    let (store, service) = test_service();

    let pair = service.sign_up(EMAIL, PASSWORD).await.unwrap();

    let claims = verify_token(&pair.refresh_token, "test-refresh-secret").unwrap();
    let user_id = user_id_from_claims(&claims).unwrap();

    let user = store.get(user_id).unwrap();
    assert!(user.password_hash.is_some());
    assert!(user.refresh_hash.is_some());
    // Raw tokens are never stored.
    assert_ne!(user.refresh_hash.as_deref(), Some(pair.refresh_token.as_str()));
}

#[tokio::test]
async fn access_token_claims_round_trip() {
    let (_store, service) = test_service();

    let pair = service.sign_up(EMAIL, PASSWORD).await.unwrap();

    let claims = verify_token(&pair.access_token, "test-access-secret").unwrap();
    assert_eq!(claims.email, EMAIL);

    let refresh_claims = verify_token(&pair.refresh_token, "test-refresh-secret").unwrap();
    assert_eq!(claims.sub, refresh_claims.sub);
}

#[tokio::test]
async fn signin_with_correct_password() {
    let (_store, service) = test_service();

    service.sign_up(EMAIL, PASSWORD).await.unwrap();
    let pair = service.sign_in(EMAIL, PASSWORD).await.unwrap();

    let claims = verify_token(&pair.access_token, "test-access-secret").unwrap();
    assert_eq!(claims.email, EMAIL);
}

#[tokio::test]
async fn signin_unknown_email() {
    let (_store, service) = test_service();

    let err = service.sign_in("nobody@example.com", PASSWORD).await.unwrap_err();
    assert!(matches!(err, AuthError::EmailNotFound));
}

#[tokio::test]
async fn wrong_password_and_missing_hash_are_indistinguishable() {
    let (store, service) = test_service();

    service.sign_up(EMAIL, PASSWORD).await.unwrap();
    let wrong = service.sign_in(EMAIL, "WrongPass1!").await.unwrap_err();
    assert!(matches!(wrong, AuthError::InvalidCredentials));

    // An account that exists but has no password hash fails with the same
    // error kind.
    let ghost = make_unprovisioned_user("ghost@example.com");
    store.insert_raw(ghost);
    let missing = service.sign_in("ghost@example.com", PASSWORD).await.unwrap_err();
    assert!(matches!(missing, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn refresh_rotates_and_invalidates_previous_token() {
    let (_store, service) = test_service();

    let a = service.sign_up(EMAIL, PASSWORD).await.unwrap();
    let claims = verify_token(&a.refresh_token, "test-refresh-secret").unwrap();
    let user_id = user_id_from_claims(&claims).unwrap();

    // First use of the refresh token succeeds and yields a new pair.
    let b = service.refresh(user_id, &a.refresh_token).await.unwrap();
    assert_ne!(a.refresh_token, b.refresh_token);

    // The rotated-away token is permanently unusable.
    let err = service.refresh(user_id, &a.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::AccessDenied));

    // The fresh token still works.
    service.refresh(user_id, &b.refresh_token).await.unwrap();
}

#[tokio::test]
async fn refresh_denied_without_session_or_user() {
    let (_store, service) = test_service();

    let a = service.sign_up(EMAIL, PASSWORD).await.unwrap();
    let claims = verify_token(&a.refresh_token, "test-refresh-secret").unwrap();
    let user_id = user_id_from_claims(&claims).unwrap();

    // Unknown user.
    let err = service.refresh(Uuid::new_v4(), &a.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::AccessDenied));

    // Logged-out user has no stored fingerprint.
    service.logout(user_id).await.unwrap();
    let err = service.refresh(user_id, &a.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::AccessDenied));
}

#[tokio::test]
async fn signin_rotates_existing_session() {
    let (_store, service) = test_service();

    let a = service.sign_up(EMAIL, PASSWORD).await.unwrap();
    let claims = verify_token(&a.refresh_token, "test-refresh-secret").unwrap();
    let user_id = user_id_from_claims(&claims).unwrap();

    // A new sign-in replaces the stored fingerprint, so the earlier refresh
    // token stops working.
    let b = service.sign_in(EMAIL, PASSWORD).await.unwrap();
    let err = service.refresh(user_id, &a.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::AccessDenied));
    service.refresh(user_id, &b.refresh_token).await.unwrap();
}

#[tokio::test]
async fn logout_is_idempotent() {
    let (store, service) = test_service();

    let pair = service.sign_up(EMAIL, PASSWORD).await.unwrap();
    let claims = verify_token(&pair.refresh_token, "test-refresh-secret").unwrap();
    let user_id = user_id_from_claims(&claims).unwrap();

    assert!(service.logout(user_id).await.unwrap());
    assert!(store.get(user_id).unwrap().refresh_hash.is_none());

    // Second logout with no active session still reports success.
    assert!(service.logout(user_id).await.unwrap());
    assert!(store.get(user_id).unwrap().refresh_hash.is_none());
}

#[tokio::test]
async fn me_returns_profile_for_provisioned_account() {
    let (_store, service) = test_service();

    let pair = service.sign_up(EMAIL, PASSWORD).await.unwrap();
    let claims = verify_token(&pair.access_token, "test-access-secret").unwrap();
    let user_id = user_id_from_claims(&claims).unwrap();

    let profile = service.me(user_id).await.unwrap();
    assert_eq!(profile.id, user_id);
    assert_eq!(profile.email, EMAIL);
}

#[tokio::test]
async fn me_collapses_missing_and_unprovisioned() {
    let (store, service) = test_service();

    let err = service.me(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AuthError::AccessDenied));

    let ghost = make_unprovisioned_user("ghost@example.com");
    let ghost_id = ghost.id;
    store.insert_raw(ghost);
    let err = service.me(ghost_id).await.unwrap_err();
    assert!(matches!(err, AuthError::AccessDenied));
}
