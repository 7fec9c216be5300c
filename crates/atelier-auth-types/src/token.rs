//! Signed session tokens: claims layout, minting, and validation.

#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, Validation, decode};
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminator embedded in every token.
///
/// Access and refresh tokens are also signed with different secrets, but the
/// class claim is checked independently of which secret verified the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenClass {
    Access,
    Refresh,
}

impl TokenClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// User identity extracted from a validated access token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub user_id: Uuid,
    pub user_role: u8,
    pub email: String,
    pub access_token_exp: u64,
}

/// Errors returned by token validation.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("unexpected token class")]
    WrongClass,
    #[error("token encoding failed")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims payload shared by token creation (auth service) and validation (everyone else).
///
/// # Fields
///
/// | Field | JWT claim | Rust type | Meaning |
/// |-------|-----------|-----------|---------|
/// | `sub` | `sub` | UUID string | credential ID |
/// | `email` | custom | normalized email | informational, never used for lookup |
/// | `role` | custom | `u8` wire value | see [`atelier_domain::user::UserRole`] |
/// | `class` | custom | `"access"` / `"refresh"` | token class |
/// | `jti` | `jti` | UUID string | per-token nonce |
/// | `iat` | `iat` | seconds since epoch | issued at |
/// | `exp` | `exp` | seconds since epoch | expiration |
///
/// # Feature gate
///
/// [`Deserialize`] is always available. [`Serialize`] (and therefore [`mint`])
/// requires the **`USE_ONLY_IN_AUTH_SERVICE`** cargo feature: the auth service
/// is the sole token issuer.
///
/// [`atelier_domain::user::UserRole`]: https://docs.rs/atelier-domain
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct JwtClaims {
    pub sub: String,
    pub email: String,
    pub role: u8,
    pub class: TokenClass,
    pub jti: String,
    pub iat: u64,
    pub exp: u64,
}

/// The subject a token is minted for.
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub role: u8,
}

#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

// ── Core decode (private) ────────────────────────────────────────────────

/// Decode and validate a JWT, returning raw claims.
///
/// Validation: HS256, exp checked with zero leeway, required claims: `exp` + `sub`.
fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, TokenError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_) => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    Ok(data.claims)
}

// ── Public: all consumers ────────────────────────────────────────────────

/// Validate an access token, returning parsed identity.
///
/// Refresh-class tokens are rejected with [`TokenError::WrongClass`] even when
/// they happen to verify under `secret`.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, TokenError> {
    let claims = decode_jwt(token, secret)?;
    if claims.class != TokenClass::Access {
        return Err(TokenError::WrongClass);
    }
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| TokenError::Malformed)?;
    Ok(TokenInfo {
        user_id,
        user_role: claims.role,
        email: claims.email,
        access_token_exp: claims.exp,
    })
}

// ── Feature-gated: auth service only ─────────────────────────────────────

/// Sign a token of `class` for `subject`, valid for `ttl_secs` from now.
///
/// Returns the compact token and its `exp` timestamp.
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
pub fn mint(
    subject: &Subject<'_>,
    class: TokenClass,
    ttl_secs: u64,
    secret: &str,
) -> Result<(String, u64), TokenError> {
    let iat = now_secs();
    let exp = iat + ttl_secs;
    let claims = JwtClaims {
        sub: subject.id.to_string(),
        email: subject.email.to_owned(),
        role: subject.role,
        class,
        jti: Uuid::new_v4().to_string(),
        iat,
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::Encoding)?;
    Ok((token, exp))
}

/// Validate signature, expiry, and class of any token, returning raw claims.
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
pub fn verify(token: &str, secret: &str, class: TokenClass) -> Result<JwtClaims, TokenError> {
    let claims = decode_jwt(token, secret)?;
    if claims.class != class {
        return Err(TokenError::WrongClass);
    }
    Ok(claims)
}
