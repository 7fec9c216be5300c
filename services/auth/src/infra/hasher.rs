use std::sync::Arc;

use anyhow::Context as _;

use crate::domain::repository::SecretHasher;
use crate::error::AuthServiceError;

/// bcrypt-backed [`SecretHasher`].
#[derive(Clone)]
pub struct BcryptHasher {
    cost: u32,
    /// Hash of a throwaway password at the same cost, verified against when
    /// the account does not exist.
    decoy: Arc<str>,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> anyhow::Result<Self> {
        let decoy = bcrypt::hash("atelier-decoy-password-0", cost).context("hash decoy")?;
        Ok(Self {
            cost,
            decoy: decoy.into(),
        })
    }
}

impl SecretHasher for BcryptHasher {
    fn hash(&self, plaintext: &str) -> Result<String, AuthServiceError> {
        let hashed = bcrypt::hash(plaintext, self.cost).context("bcrypt hash")?;
        Ok(hashed)
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        bcrypt::verify(plaintext, hash).unwrap_or(false)
    }

    fn verify_decoy(&self, plaintext: &str) -> bool {
        let _ = bcrypt::verify(plaintext, &self.decoy);
        false
    }
}
