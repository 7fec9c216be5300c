use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use atelier_auth_types::token::TokenClass;

use crate::domain::repository::{CredentialStore, SecretHasher, TokenCodec};
use crate::domain::types::{AccountView, Credential, TokenPair};
use crate::error::AuthServiceError;
use crate::usecase::notification::Notifier;

/// Orchestrates registration, login, refresh, logout, and password flows.
///
/// Operations live in `account`, `token`, and `password`; this module holds
/// the shared plumbing they build on.
pub struct SessionService<S, H, C>
where
    S: CredentialStore,
    H: SecretHasher,
    C: TokenCodec,
{
    pub store: S,
    pub hasher: H,
    pub codec: C,
    pub notifier: Notifier,
    pub password_reset_ttl_secs: u64,
}

/// Result of a successful register or login.
#[derive(Debug)]
pub struct SessionOutput {
    pub user: AccountView,
    pub tokens: TokenPair,
}

/// Lowercase hex SHA-256 of a raw token. Only this digest is ever persisted.
pub fn digest_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

impl<S, H, C> SessionService<S, H, C>
where
    S: CredentialStore,
    H: SecretHasher,
    C: TokenCodec,
{
    /// Mint an access/refresh pair and make the refresh token the owner's only live one.
    pub(crate) async fn issue_tokens(
        &self,
        credential: &Credential,
    ) -> Result<TokenPair, AuthServiceError> {
        let access = self.codec.issue(credential, TokenClass::Access)?;
        let refresh = self.codec.issue(credential, TokenClass::Refresh)?;

        let expires_at = i64::try_from(refresh.expires_at)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .context("refresh token expiry out of range")?;
        self.store
            .upsert_refresh_token(credential.id, &digest_token(&refresh.token), expires_at)
            .await?;

        Ok(TokenPair {
            access_token: access.token,
            access_token_expires_at: access.expires_at,
            refresh_token: refresh.token,
            refresh_token_expires_at: refresh.expires_at,
        })
    }

    pub(crate) async fn hash_password(&self, password: &str) -> Result<String, AuthServiceError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("password hash task")?
    }

    /// Verify against `hash`, or against the hasher's decoy when there is no
    /// credential, so both paths cost the same.
    pub(crate) async fn verify_password(
        &self,
        password: &str,
        hash: Option<String>,
    ) -> Result<bool, AuthServiceError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        let verified = tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => hasher.verify_decoy(&password),
        })
        .await
        .context("password verify task")?;
        Ok(verified)
    }

    /// Active credential by id; inactive accounts are treated as absent.
    pub(crate) async fn find_active(
        &self,
        user_id: uuid::Uuid,
    ) -> Result<Option<Credential>, AuthServiceError> {
        Ok(self
            .store
            .find_by_id(user_id)
            .await?
            .filter(|c| c.is_active))
    }
}
