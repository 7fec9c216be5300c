#![allow(async_fn_in_trait)]

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use atelier_auth_types::token::{JwtClaims, TokenClass, TokenError};

use crate::domain::types::{
    Credential, IssuedToken, NewCredential, OutgoingEmail, PasswordResetRecord,
    RefreshTokenRecord,
};
use crate::error::AuthServiceError;

/// One-way password hashing. Implementations are CPU-bound and are driven
/// from `spawn_blocking`, hence `Clone + 'static`.
pub trait SecretHasher: Clone + Send + Sync + 'static {
    fn hash(&self, plaintext: &str) -> Result<String, AuthServiceError>;

    /// Never fails: a malformed hash verifies as `false`.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;

    /// Burn the same work as [`SecretHasher::verify`] when there is no stored hash
    /// to check against. Always `false`.
    fn verify_decoy(&self, plaintext: &str) -> bool;
}

/// Mints and verifies signed session tokens. The class picks the secret and TTL.
pub trait TokenCodec: Send + Sync {
    fn issue(&self, credential: &Credential, class: TokenClass)
    -> Result<IssuedToken, AuthServiceError>;

    fn verify(&self, token: &str, class: TokenClass) -> Result<JwtClaims, TokenError>;
}

/// Persistence for credentials, refresh-token lineage, and password resets.
pub trait CredentialStore: Send + Sync {
    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, AuthServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>, AuthServiceError>;

    /// Insert a credential. Uniqueness of the email is enforced by the store
    /// itself; a collision yields [`AuthServiceError::EmailInUse`].
    async fn create_credential(
        &self,
        credential: &NewCredential,
    ) -> Result<Credential, AuthServiceError>;

    /// Replace the password hash and delete the owner's refresh token in one transaction.
    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthServiceError>;

    /// Insert or replace the single refresh-token row for `user_id`.
    async fn upsert_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError>;

    /// Match on owner and hash, filtering out expired rows.
    async fn find_valid_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, AuthServiceError>;

    /// Idempotent.
    async fn delete_refresh_tokens(&self, user_id: Uuid) -> Result<(), AuthServiceError>;

    /// Store a reset record, superseding any outstanding reset for the same owner.
    async fn create_password_reset(
        &self,
        record: &PasswordResetRecord,
    ) -> Result<(), AuthServiceError>;

    /// Atomically fetch and delete a reset by token digest. Returns the owner
    /// only when the record existed and had not expired.
    async fn consume_password_reset(
        &self,
        token_hash: &str,
    ) -> Result<Option<Uuid>, AuthServiceError>;
}

/// Delivery collaborator for outgoing emails. Called from the background
/// notification worker, so the returned future must be `Send`.
pub trait NotificationGateway: Send + Sync + 'static {
    fn send_email(
        &self,
        email: &OutgoingEmail,
    ) -> impl Future<Output = Result<(), AuthServiceError>> + Send;
}
