use chrono::{Duration, SecondsFormat, Utc};
use rand::RngExt;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::repository::{CredentialStore, SecretHasher, TokenCodec};
use crate::domain::types::{EmailTemplate, OutgoingEmail, PasswordResetRecord, RESET_TOKEN_LEN};
use crate::domain::validation::{validate_email, validate_password};
use crate::error::AuthServiceError;
use crate::usecase::session::{SessionService, digest_token};

/// Charset for password-reset tokens (mixed-case alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn generate_reset_token() -> String {
    let mut rng = rand::rng();
    (0..RESET_TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

pub struct ResetPasswordInput {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub struct ChangePasswordInput {
    pub user_id: Uuid,
    pub current_password: String,
    pub new_password: String,
}

impl<S, H, C> SessionService<S, H, C>
where
    S: CredentialStore,
    H: SecretHasher,
    C: TokenCodec,
{
    /// Start a reset. Succeeds whether or not the email belongs to an account.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthServiceError> {
        let email = validate_email(email)?;

        let Some(credential) = self.store.find_by_email(&email).await?.filter(|c| c.is_active)
        else {
            return Ok(());
        };

        let token = generate_reset_token();
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.password_reset_ttl_secs as i64);
        let record = PasswordResetRecord {
            id: Uuid::new_v4(),
            user_id: credential.id,
            token_hash: digest_token(&token),
            expires_at,
            created_at: now,
        };

        // The caller must not learn that this branch ran.
        if let Err(e) = self.store.create_password_reset(&record).await {
            error!(user_id = %credential.id, error = ?e, "failed to store password reset");
            return Ok(());
        }

        self.notifier.send(OutgoingEmail {
            id: record.id,
            user_id: credential.id,
            to: credential.email,
            template: EmailTemplate::PasswordReset,
            data: json!({
                "token": token,
                "expires_at": expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                "first_name": credential.first_name,
            }),
        });
        info!(user_id = %credential.id, "password reset requested");
        Ok(())
    }

    /// Consume a reset token and set a new password, revoking the refresh lineage.
    pub async fn reset_password(&self, input: ResetPasswordInput) -> Result<(), AuthServiceError> {
        if input.new_password != input.confirm_password {
            return Err(AuthServiceError::PasswordMismatch);
        }
        validate_password(&input.new_password)?;

        // Hash first so a hashing failure does not burn the token.
        let password_hash = self.hash_password(&input.new_password).await?;

        let user_id = self
            .store
            .consume_password_reset(&digest_token(&input.token))
            .await?
            .ok_or(AuthServiceError::InvalidResetToken)?;

        if self.find_active(user_id).await?.is_none() {
            warn!(user_id = %user_id, "password reset for inactive account");
            return Err(AuthServiceError::InvalidResetToken);
        }

        self.store.update_password(user_id, &password_hash).await?;
        info!(user_id = %user_id, "password reset");
        Ok(())
    }

    /// Change the password of an authenticated caller. A wrong current password
    /// leaves the stored hash untouched.
    pub async fn change_password(
        &self,
        input: ChangePasswordInput,
    ) -> Result<(), AuthServiceError> {
        validate_password(&input.new_password)?;

        let credential = self.find_active(input.user_id).await?;
        let verified = self
            .verify_password(
                &input.current_password,
                credential.as_ref().map(|c| c.password_hash.clone()),
            )
            .await?;
        if credential.is_none() || !verified {
            warn!(user_id = %input.user_id, "password change rejected");
            return Err(AuthServiceError::InvalidCredentials);
        }

        let password_hash = self.hash_password(&input.new_password).await?;
        self.store
            .update_password(input.user_id, &password_hash)
            .await?;
        info!(user_id = %input.user_id, "password changed");
        Ok(())
    }
}
