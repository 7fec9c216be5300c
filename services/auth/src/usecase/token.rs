use tracing::{error, info, warn};
use uuid::Uuid;

use atelier_auth_types::token::TokenClass;

use crate::domain::repository::{CredentialStore, SecretHasher, TokenCodec};
use crate::domain::types::TokenPair;
use crate::error::AuthServiceError;
use crate::usecase::session::{SessionService, digest_token};

impl<S, H, C> SessionService<S, H, C>
where
    S: CredentialStore,
    H: SecretHasher,
    C: TokenCodec,
{
    /// Exchange a live refresh token for a new pair, rotating the stored lineage.
    ///
    /// Every failure, internal ones included, surfaces as
    /// [`AuthServiceError::InvalidRefreshToken`].
    ///
    /// Two concurrent calls with the same token may both pass the lookup; both
    /// then succeed and the last upsert wins, leaving only that refresh token live.
    pub async fn refresh(&self, raw_refresh_token: &str) -> Result<TokenPair, AuthServiceError> {
        self.rotate(raw_refresh_token).await.map_err(|e| {
            if let AuthServiceError::Internal(ref cause) = e {
                error!(error = %format!("{cause:#}"), "refresh failed internally");
            }
            AuthServiceError::InvalidRefreshToken
        })
    }

    async fn rotate(&self, raw_refresh_token: &str) -> Result<TokenPair, AuthServiceError> {
        let claims = self
            .codec
            .verify(raw_refresh_token, TokenClass::Refresh)
            .map_err(|e| {
                warn!(reason = %e, "refresh token rejected");
                AuthServiceError::InvalidRefreshToken
            })?;

        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AuthServiceError::InvalidRefreshToken)?;

        let credential = self
            .find_active(user_id)
            .await?
            .ok_or(AuthServiceError::InvalidRefreshToken)?;

        // Rotated-out, revoked, or expired lineages have no matching row.
        self.store
            .find_valid_refresh_token(user_id, &digest_token(raw_refresh_token))
            .await?
            .ok_or_else(|| {
                warn!(user_id = %user_id, "stale refresh token presented");
                AuthServiceError::InvalidRefreshToken
            })?;

        let tokens = self.issue_tokens(&credential).await?;
        info!(user_id = %user_id, "refresh token rotated");
        Ok(tokens)
    }

    /// Revoke the caller's refresh lineage. Idempotent.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AuthServiceError> {
        self.store.delete_refresh_tokens(user_id).await?;
        info!(user_id = %user_id, "logged out");
        Ok(())
    }
}
