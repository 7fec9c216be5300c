use atelier_auth::error::{AuthServiceError, ErrorClass};
use atelier_auth::usecase::account::{LoginInput, RegisterInput};
use atelier_auth_types::token::validate_access_token;
use atelier_domain::user::UserRole;

use crate::helpers::{
    ACCESS_SECRET, ALICE_EMAIL, ALICE_PASSWORD, harness, register_alice, register_input,
};

#[tokio::test]
async fn should_register_and_return_view_without_password() {
    let h = harness();

    let out = register_alice(&h).await;

    assert_eq!(out.user.email, ALICE_EMAIL);
    assert_eq!(out.user.role, UserRole::Member);
    assert!(out.user.is_active);
    let json = serde_json::to_value(&out.user).unwrap();
    assert!(json.get("password").is_none());
    assert!(json.get("passwordHash").is_none());
    assert!(!out.tokens.access_token.is_empty());
    assert!(!out.tokens.refresh_token.is_empty());
}

#[tokio::test]
async fn should_store_hash_not_plaintext_password() {
    let h = harness();
    let out = register_alice(&h).await;

    let stored = h.store.password_hash(out.user.id);
    assert_ne!(stored, ALICE_PASSWORD);
    assert!(stored.starts_with("$2b$04$"));
}

#[tokio::test]
async fn should_normalize_email_on_register() {
    let h = harness();

    let out = h
        .service
        .register(register_input("  Alice@Example.COM ", ALICE_PASSWORD))
        .await
        .unwrap();

    assert_eq!(out.user.email, ALICE_EMAIL);
}

#[tokio::test]
async fn should_issue_access_token_for_created_credential() {
    let h = harness();
    let out = register_alice(&h).await;

    let info = validate_access_token(&out.tokens.access_token, ACCESS_SECRET).unwrap();
    assert_eq!(info.user_id, out.user.id);
    assert_eq!(info.email, ALICE_EMAIL);
    assert_eq!(info.user_role, UserRole::Member.as_u8());
}

#[tokio::test]
async fn should_then_login_with_same_credentials() {
    let h = harness();
    let registered = register_alice(&h).await;

    let out = h
        .service
        .login(LoginInput {
            email: ALICE_EMAIL.to_owned(),
            password: ALICE_PASSWORD.to_owned(),
        })
        .await
        .unwrap();

    let info = validate_access_token(&out.tokens.access_token, ACCESS_SECRET).unwrap();
    assert_eq!(info.user_id, registered.user.id);
}

#[tokio::test]
async fn should_reject_duplicate_email_with_conflict() {
    let h = harness();
    register_alice(&h).await;

    let err = h
        .service
        .register(register_input("ALICE@example.com", "An0therPass"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthServiceError::EmailInUse));
    assert_eq!(err.class(), ErrorClass::Conflict);
    assert_eq!(err.to_string(), "email in use");
    assert_eq!(h.store.credential_count(), 1);
}

#[tokio::test]
async fn should_let_exactly_one_concurrent_registration_win() {
    let h = harness();

    let (a, b) = tokio::join!(
        h.service.register(register_input(ALICE_EMAIL, ALICE_PASSWORD)),
        h.service.register(register_input(ALICE_EMAIL, "Sec0ndPass")),
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    let failure = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert!(matches!(failure, AuthServiceError::EmailInUse));
    assert_eq!(h.store.credential_count(), 1);
}

#[tokio::test]
async fn should_reject_invalid_input_before_touching_store() {
    let h = harness();

    let bad_email = h
        .service
        .register(register_input("not-an-email", ALICE_PASSWORD))
        .await
        .unwrap_err();
    let weak = h
        .service
        .register(register_input(ALICE_EMAIL, "password"))
        .await
        .unwrap_err();
    let no_name = h
        .service
        .register(RegisterInput {
            first_name: "   ".to_owned(),
            ..register_input(ALICE_EMAIL, ALICE_PASSWORD)
        })
        .await
        .unwrap_err();

    assert!(matches!(bad_email, AuthServiceError::InvalidEmail));
    assert!(matches!(weak, AuthServiceError::WeakPassword));
    assert!(matches!(no_name, AuthServiceError::InvalidName));
    assert_eq!(weak.class(), ErrorClass::Validation);
    assert_eq!(h.store.credential_count(), 0);
}

#[tokio::test]
async fn should_reject_unsendable_addresses_before_storing() {
    let mut h = harness();

    for email in [
        "<>@example.com",
        "a\"b,c@example.com",
        "alice@-example-.com",
        "alice@exa_mple.com",
        "a@b.c;drop",
    ] {
        let err = h
            .service
            .register(register_input(email, ALICE_PASSWORD))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthServiceError::InvalidEmail), "{email}");
    }

    assert_eq!(h.store.credential_count(), 0);
    assert!(h.drain_notifications().is_empty());
}

#[tokio::test]
async fn should_queue_welcome_email() {
    let mut h = harness();
    let out = register_alice(&h).await;

    let emails = h.drain_notifications();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].user_id, out.user.id);
    assert_eq!(emails[0].to, ALICE_EMAIL);
    assert_eq!(emails[0].template.key(), "welcome");
    assert_eq!(emails[0].data["first_name"], "Alice");
}

#[tokio::test]
async fn should_register_even_when_notification_queue_is_closed() {
    let mut h = harness();
    h.notifications.close();

    let out = h
        .service
        .register(register_input(ALICE_EMAIL, ALICE_PASSWORD))
        .await;

    assert!(out.is_ok());
}
