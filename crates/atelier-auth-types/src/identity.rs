//! Access-token identity extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::extract::cookie::CookieJar;
use http::request::Parts;
use http::{StatusCode, header};
use uuid::Uuid;

use crate::cookie::ATELIER_ACCESS_TOKEN;
use crate::token::validate_access_token;

/// Secret that verifies access tokens. Provide it from the router state via [`FromRef`].
#[derive(Debug, Clone)]
pub struct AccessTokenSecret(pub String);

/// Caller identity proven by a valid access-class token.
///
/// The token is read from `Authorization: Bearer <token>`, falling back to the
/// access-token cookie. Returns 401 when neither is present, the token fails
/// verification, or the token is a refresh token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub user_role: u8,
    pub email: String,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(ATELIER_ACCESS_TOKEN)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    AccessTokenSecret: FromRef<S>,
{
    type Rejection = StatusCode;

    // axum-core 0.5 declares `fn -> impl Future + Send`; verify synchronously
    // and hand back a 'static future so nothing borrowed from `parts` is captured.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let AccessTokenSecret(secret) = AccessTokenSecret::from_ref(state);

        let result = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or(StatusCode::UNAUTHORIZED)
            .and_then(|token| {
                validate_access_token(&token, &secret).map_err(|_| StatusCode::UNAUTHORIZED)
            })
            .map(|info| Self {
                user_id: info.user_id,
                user_role: info.user_role,
                email: info.email,
            });

        async move { result }
    }
}
