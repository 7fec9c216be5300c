use atelier_auth::error::{AuthServiceError, ErrorClass};
use atelier_auth::usecase::account::LoginInput;
use atelier_auth::usecase::password::{ChangePasswordInput, ResetPasswordInput};
use atelier_auth::usecase::session::digest_token;

use crate::helpers::{ALICE_EMAIL, ALICE_PASSWORD, Harness, harness, register_alice};

const NEW_PASSWORD: &str = "N3wPassword";

/// Request a reset for alice and return the raw token from the queued email.
async fn request_reset(h: &mut Harness) -> String {
    h.drain_notifications();
    h.service.forgot_password(ALICE_EMAIL).await.unwrap();
    let emails = h.drain_notifications();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].template.key(), "password_reset");
    emails[0].data["token"].as_str().unwrap().to_owned()
}

fn reset_input(token: &str, password: &str) -> ResetPasswordInput {
    ResetPasswordInput {
        token: token.to_owned(),
        new_password: password.to_owned(),
        confirm_password: password.to_owned(),
    }
}

async fn login(h: &Harness, password: &str) -> Result<(), AuthServiceError> {
    h.service
        .login(LoginInput {
            email: ALICE_EMAIL.to_owned(),
            password: password.to_owned(),
        })
        .await
        .map(|_| ())
}

// ── forgot_password ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_succeed_silently_for_unknown_email() {
    let mut h = harness();
    register_alice(&h).await;
    h.drain_notifications();

    let unknown = h.service.forgot_password("nobody@example.com").await;
    let known = h.service.forgot_password(ALICE_EMAIL).await;

    assert!(unknown.is_ok());
    assert!(known.is_ok());
    let emails = h.drain_notifications();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].to, ALICE_EMAIL);
}

#[tokio::test]
async fn should_not_create_reset_for_unknown_email() {
    let h = harness();
    h.service.forgot_password("nobody@example.com").await.unwrap();
    assert_eq!(h.store.password_reset_count(), 0);
}

#[tokio::test]
async fn should_store_only_digest_of_reset_token() {
    let mut h = harness();
    register_alice(&h).await;
    let token = request_reset(&mut h).await;

    let state = h.store.state.lock().unwrap();
    assert_eq!(state.password_resets.len(), 1);
    assert_eq!(state.password_resets[0].token_hash, digest_token(&token));
}

#[tokio::test]
async fn should_succeed_even_when_reset_cannot_be_stored() {
    let mut h = harness();
    register_alice(&h).await;
    h.drain_notifications();
    h.store
        .fail_writes
        .store(true, std::sync::atomic::Ordering::SeqCst);

    assert!(h.service.forgot_password(ALICE_EMAIL).await.is_ok());
    assert!(h.drain_notifications().is_empty());
}

// ── reset_password ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reset_password_with_emailed_token() {
    let mut h = harness();
    register_alice(&h).await;
    let token = request_reset(&mut h).await;

    h.service
        .reset_password(reset_input(&token, NEW_PASSWORD))
        .await
        .unwrap();

    assert!(login(&h, NEW_PASSWORD).await.is_ok());
    assert!(matches!(
        login(&h, ALICE_PASSWORD).await,
        Err(AuthServiceError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn should_reject_reused_reset_token() {
    let mut h = harness();
    register_alice(&h).await;
    let token = request_reset(&mut h).await;

    h.service
        .reset_password(reset_input(&token, NEW_PASSWORD))
        .await
        .unwrap();
    let err = h
        .service
        .reset_password(reset_input(&token, "Th1rdPassword"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthServiceError::InvalidResetToken));
    assert_eq!(err.class(), ErrorClass::BadRequest);
    assert_eq!(err.to_string(), "invalid or expired token");
}

#[tokio::test]
async fn should_revoke_refresh_token_on_reset() {
    let mut h = harness();
    let out = register_alice(&h).await;
    let token = request_reset(&mut h).await;

    h.service
        .reset_password(reset_input(&token, NEW_PASSWORD))
        .await
        .unwrap();

    let err = h
        .service
        .refresh(&out.tokens.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidRefreshToken));
}

#[tokio::test]
async fn should_reject_expired_reset_token() {
    let mut h = harness();
    register_alice(&h).await;
    let token = request_reset(&mut h).await;
    h.store.expire_password_resets();

    let err = h
        .service
        .reset_password(reset_input(&token, NEW_PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthServiceError::InvalidResetToken));
    assert!(login(&h, ALICE_PASSWORD).await.is_ok());
}

#[tokio::test]
async fn should_supersede_earlier_reset_token() {
    let mut h = harness();
    register_alice(&h).await;
    let first = request_reset(&mut h).await;
    let second = request_reset(&mut h).await;

    let err = h
        .service
        .reset_password(reset_input(&first, NEW_PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidResetToken));

    assert!(
        h.service
            .reset_password(reset_input(&second, NEW_PASSWORD))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn should_reject_mismatched_confirmation_without_consuming_token() {
    let mut h = harness();
    register_alice(&h).await;
    let token = request_reset(&mut h).await;

    let err = h
        .service
        .reset_password(ResetPasswordInput {
            token: token.clone(),
            new_password: NEW_PASSWORD.to_owned(),
            confirm_password: "Different1".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::PasswordMismatch));

    assert!(
        h.service
            .reset_password(reset_input(&token, NEW_PASSWORD))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn should_reject_unknown_reset_token() {
    let h = harness();
    let err = h
        .service
        .reset_password(reset_input("no-such-token", NEW_PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidResetToken));
}

// ── change_password ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_change_password_and_revoke_refresh_token() {
    let h = harness();
    let out = register_alice(&h).await;

    h.service
        .change_password(ChangePasswordInput {
            user_id: out.user.id,
            current_password: ALICE_PASSWORD.to_owned(),
            new_password: NEW_PASSWORD.to_owned(),
        })
        .await
        .unwrap();

    assert!(login(&h, NEW_PASSWORD).await.is_ok());
    let err = h
        .service
        .refresh(&out.tokens.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidRefreshToken));
}

#[tokio::test]
async fn should_not_mutate_hash_when_current_password_wrong() {
    let h = harness();
    let out = register_alice(&h).await;
    let before = h.store.password_hash(out.user.id);

    let err = h
        .service
        .change_password(ChangePasswordInput {
            user_id: out.user.id,
            current_password: "wrong".to_owned(),
            new_password: NEW_PASSWORD.to_owned(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AuthServiceError::InvalidCredentials));
    assert_eq!(h.store.password_hash(out.user.id), before);
    assert!(h.service.refresh(&out.tokens.refresh_token).await.is_ok());
}

#[tokio::test]
async fn should_reject_weak_new_password() {
    let h = harness();
    let out = register_alice(&h).await;

    let err = h
        .service
        .change_password(ChangePasswordInput {
            user_id: out.user.id,
            current_password: ALICE_PASSWORD.to_owned(),
            new_password: "short".to_owned(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AuthServiceError::WeakPassword));
}
