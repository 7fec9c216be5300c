use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use atelier_domain::user::UserRole;

use crate::domain::repository::{CredentialStore, SecretHasher, TokenCodec};
use crate::domain::types::{AccountView, EmailTemplate, NewCredential, OutgoingEmail};
use crate::domain::validation::{validate_email, validate_names, validate_password};
use crate::error::AuthServiceError;
use crate::usecase::session::{SessionOutput, SessionService};

pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: Option<String>,
}

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl<S, H, C> SessionService<S, H, C>
where
    S: CredentialStore,
    H: SecretHasher,
    C: TokenCodec,
{
    pub async fn register(&self, input: RegisterInput) -> Result<SessionOutput, AuthServiceError> {
        let email = validate_email(&input.email)?;
        validate_password(&input.password)?;
        let (first_name, last_name) = validate_names(&input.first_name, input.last_name.as_deref())?;

        let password_hash = self.hash_password(&input.password).await?;

        // The store's unique constraint decides concurrent registrations.
        let credential = self
            .store
            .create_credential(&NewCredential {
                email,
                password_hash,
                first_name,
                last_name,
                role: UserRole::Member,
            })
            .await?;

        let tokens = self.issue_tokens(&credential).await?;
        info!(user_id = %credential.id, "credential registered");

        self.notifier.send(OutgoingEmail {
            id: Uuid::new_v4(),
            user_id: credential.id,
            to: credential.email.clone(),
            template: EmailTemplate::Welcome,
            data: json!({ "first_name": credential.first_name }),
        });

        Ok(SessionOutput {
            user: credential.view(),
            tokens,
        })
    }

    /// Unknown email, wrong password, and inactive account all fail with the
    /// same [`AuthServiceError::InvalidCredentials`] after the same hashing work.
    pub async fn login(&self, input: LoginInput) -> Result<SessionOutput, AuthServiceError> {
        let email = validate_email(&input.email)?;

        let credential = self.store.find_by_email(&email).await?;
        let verified = self
            .verify_password(
                &input.password,
                credential.as_ref().map(|c| c.password_hash.clone()),
            )
            .await?;

        let credential = match credential {
            Some(c) if verified && c.is_active => c,
            other => {
                warn!(user_id = ?other.map(|c| c.id), "login rejected");
                return Err(AuthServiceError::InvalidCredentials);
            }
        };

        let tokens = self.issue_tokens(&credential).await?;
        info!(user_id = %credential.id, "logged in");

        Ok(SessionOutput {
            user: credential.view(),
            tokens,
        })
    }

    pub async fn me(&self, user_id: Uuid) -> Result<AccountView, AuthServiceError> {
        self.find_active(user_id)
            .await?
            .map(|c| c.view())
            .ok_or(AuthServiceError::UserNotFound)
    }
}
