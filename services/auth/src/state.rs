use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use atelier_auth_types::identity::AccessTokenSecret;

use crate::infra::db::DbCredentialStore;
use crate::infra::hasher::BcryptHasher;
use crate::infra::jwt::JwtTokenCodec;
use crate::usecase::notification::Notifier;
use crate::usecase::session::SessionService;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub codec: JwtTokenCodec,
    pub hasher: BcryptHasher,
    pub notifier: Notifier,
    pub cookie_domain: String,
    pub password_reset_ttl_secs: u64,
}

impl AppState {
    pub fn credential_store(&self) -> DbCredentialStore {
        DbCredentialStore {
            db: self.db.clone(),
        }
    }

    pub fn session_service(&self) -> SessionService<DbCredentialStore, BcryptHasher, JwtTokenCodec> {
        SessionService {
            store: self.credential_store(),
            hasher: self.hasher.clone(),
            codec: self.codec.clone(),
            notifier: self.notifier.clone(),
            password_reset_ttl_secs: self.password_reset_ttl_secs,
        }
    }
}

impl FromRef<AppState> for AccessTokenSecret {
    fn from_ref(state: &AppState) -> Self {
        AccessTokenSecret(state.codec.access_secret.clone())
    }
}
