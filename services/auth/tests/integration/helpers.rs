use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::Barrier;
use tokio::sync::mpsc::Receiver;
use uuid::Uuid;

use atelier_auth::domain::repository::CredentialStore;
use atelier_auth::domain::types::{
    Credential, NewCredential, OutgoingEmail, PasswordResetRecord, RefreshTokenRecord,
};
use atelier_auth::error::AuthServiceError;
use atelier_auth::infra::hasher::BcryptHasher;
use atelier_auth::infra::jwt::JwtTokenCodec;
use atelier_auth::usecase::account::RegisterInput;
use atelier_auth::usecase::notification::Notifier;
use atelier_auth::usecase::session::{SessionOutput, SessionService};

pub const ACCESS_SECRET: &str = "test-access-secret-for-integration-tests";
pub const REFRESH_SECRET: &str = "test-refresh-secret-for-integration-tests";

pub const ALICE_EMAIL: &str = "alice@example.com";
pub const ALICE_PASSWORD: &str = "Passw0rd!";

// ── MemoryCredentialStore ────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryState {
    pub credentials: Vec<Credential>,
    pub refresh_tokens: HashMap<Uuid, RefreshTokenRecord>,
    pub password_resets: Vec<PasswordResetRecord>,
}

/// In-memory [`CredentialStore`] honouring the same atomicity as the database:
/// unique email on insert, replace-by-owner refresh tokens, consume-once resets.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    pub state: Arc<Mutex<MemoryState>>,
    /// When set, every write fails with an internal error.
    pub fail_writes: Arc<AtomicBool>,
    /// When set, `find_valid_refresh_token` waits here after its lookup.
    pub refresh_gate: Option<Arc<Barrier>>,
}

impl MemoryCredentialStore {
    pub fn password_hash(&self, user_id: Uuid) -> String {
        let state = self.state.lock().unwrap();
        state
            .credentials
            .iter()
            .find(|c| c.id == user_id)
            .map(|c| c.password_hash.clone())
            .unwrap()
    }

    pub fn set_active(&self, user_id: Uuid, is_active: bool) {
        let mut state = self.state.lock().unwrap();
        let cred = state
            .credentials
            .iter_mut()
            .find(|c| c.id == user_id)
            .unwrap();
        cred.is_active = is_active;
    }

    pub fn stored_refresh_hash(&self, user_id: Uuid) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.refresh_tokens.get(&user_id).map(|r| r.token_hash.clone())
    }

    pub fn expire_refresh_token(&self, user_id: Uuid) {
        let mut state = self.state.lock().unwrap();
        if let Some(record) = state.refresh_tokens.get_mut(&user_id) {
            record.expires_at = Utc::now() - chrono::Duration::seconds(1);
        }
    }

    pub fn expire_password_resets(&self) {
        let mut state = self.state.lock().unwrap();
        for record in &mut state.password_resets {
            record.expires_at = Utc::now() - chrono::Duration::seconds(1);
        }
    }

    pub fn credential_count(&self) -> usize {
        self.state.lock().unwrap().credentials.len()
    }

    pub fn password_reset_count(&self) -> usize {
        self.state.lock().unwrap().password_resets.len()
    }

    fn check_writable(&self) -> Result<(), AuthServiceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AuthServiceError::Internal(anyhow::anyhow!(
                "connection reset by peer"
            )));
        }
        Ok(())
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, AuthServiceError> {
        let state = self.state.lock().unwrap();
        Ok(state.credentials.iter().find(|c| c.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>, AuthServiceError> {
        let state = self.state.lock().unwrap();
        Ok(state.credentials.iter().find(|c| c.id == id).cloned())
    }

    async fn create_credential(
        &self,
        credential: &NewCredential,
    ) -> Result<Credential, AuthServiceError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        if state.credentials.iter().any(|c| c.email == credential.email) {
            return Err(AuthServiceError::EmailInUse);
        }
        let now = Utc::now();
        let created = Credential {
            id: Uuid::now_v7(),
            email: credential.email.clone(),
            password_hash: credential.password_hash.clone(),
            first_name: credential.first_name.clone(),
            last_name: credential.last_name.clone(),
            role: credential.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.credentials.push(created.clone());
        Ok(created)
    }

    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthServiceError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        if let Some(cred) = state.credentials.iter_mut().find(|c| c.id == user_id) {
            cred.password_hash = password_hash.to_owned();
            cred.updated_at = Utc::now();
        }
        state.refresh_tokens.remove(&user_id);
        Ok(())
    }

    async fn upsert_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        state.refresh_tokens.insert(
            user_id,
            RefreshTokenRecord {
                user_id,
                token_hash: token_hash.to_owned(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn find_valid_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, AuthServiceError> {
        let found = {
            let state = self.state.lock().unwrap();
            state
                .refresh_tokens
                .get(&user_id)
                .filter(|r| r.token_hash == token_hash && r.expires_at > Utc::now())
                .cloned()
        };
        if let Some(gate) = &self.refresh_gate {
            gate.wait().await;
        }
        Ok(found)
    }

    async fn delete_refresh_tokens(&self, user_id: Uuid) -> Result<(), AuthServiceError> {
        self.check_writable()?;
        self.state.lock().unwrap().refresh_tokens.remove(&user_id);
        Ok(())
    }

    async fn create_password_reset(
        &self,
        record: &PasswordResetRecord,
    ) -> Result<(), AuthServiceError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        state.password_resets.retain(|r| r.user_id != record.user_id);
        state.password_resets.push(record.clone());
        Ok(())
    }

    async fn consume_password_reset(
        &self,
        token_hash: &str,
    ) -> Result<Option<Uuid>, AuthServiceError> {
        let mut state = self.state.lock().unwrap();
        let Some(pos) = state
            .password_resets
            .iter()
            .position(|r| r.token_hash == token_hash)
        else {
            return Ok(None);
        };
        let record = state.password_resets.remove(pos);
        Ok((record.expires_at > Utc::now()).then_some(record.user_id))
    }
}

// ── Service fixture ──────────────────────────────────────────────────────────

pub type TestService = SessionService<MemoryCredentialStore, BcryptHasher, JwtTokenCodec>;

pub struct Harness {
    pub service: TestService,
    pub store: MemoryCredentialStore,
    pub notifications: Receiver<OutgoingEmail>,
}

impl Harness {
    /// Emails queued so far, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<OutgoingEmail> {
        let mut out = Vec::new();
        while let Ok(email) = self.notifications.try_recv() {
            out.push(email);
        }
        out
    }
}

pub fn test_codec() -> JwtTokenCodec {
    JwtTokenCodec {
        access_secret: ACCESS_SECRET.to_owned(),
        refresh_secret: REFRESH_SECRET.to_owned(),
        access_ttl_secs: 900,
        refresh_ttl_secs: 604_800,
    }
}

pub fn harness_with_store(store: MemoryCredentialStore) -> Harness {
    let (notifier, notifications) = Notifier::channel(16);
    let service = SessionService {
        store: store.clone(),
        hasher: BcryptHasher::new(4).unwrap(),
        codec: test_codec(),
        notifier,
        password_reset_ttl_secs: 3600,
    };
    Harness {
        service,
        store,
        notifications,
    }
}

pub fn harness() -> Harness {
    harness_with_store(MemoryCredentialStore::default())
}

pub fn register_input(email: &str, password: &str) -> RegisterInput {
    RegisterInput {
        email: email.to_owned(),
        password: password.to_owned(),
        first_name: "Alice".to_owned(),
        last_name: Some("Liddell".to_owned()),
    }
}

pub async fn register_alice(h: &Harness) -> SessionOutput {
    h.service
        .register(register_input(ALICE_EMAIL, ALICE_PASSWORD))
        .await
        .unwrap()
}
