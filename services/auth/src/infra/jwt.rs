use atelier_auth_types::token::{JwtClaims, Subject, TokenClass, TokenError, mint, verify};

use crate::domain::repository::TokenCodec;
use crate::domain::types::{Credential, IssuedToken};
use crate::error::AuthServiceError;

/// HS256 [`TokenCodec`] with one secret and lifetime per token class.
#[derive(Clone)]
pub struct JwtTokenCodec {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

impl JwtTokenCodec {
    fn secret(&self, class: TokenClass) -> &str {
        match class {
            TokenClass::Access => &self.access_secret,
            TokenClass::Refresh => &self.refresh_secret,
        }
    }

    fn ttl_secs(&self, class: TokenClass) -> u64 {
        match class {
            TokenClass::Access => self.access_ttl_secs,
            TokenClass::Refresh => self.refresh_ttl_secs,
        }
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(
        &self,
        credential: &Credential,
        class: TokenClass,
    ) -> Result<IssuedToken, AuthServiceError> {
        let subject = Subject {
            id: credential.id,
            email: &credential.email,
            role: credential.role.as_u8(),
        };
        let (token, expires_at) = mint(&subject, class, self.ttl_secs(class), self.secret(class))
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str, class: TokenClass) -> Result<JwtClaims, TokenError> {
        verify(token, self.secret(class), class)
    }
}
