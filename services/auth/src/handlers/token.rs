use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use atelier_auth_types::{
    cookie::{ATELIER_REFRESH_TOKEN, clear_cookies, set_access_token_cookie, set_refresh_token_cookie},
    identity::Identity,
};

use crate::domain::types::TokenPair;
use crate::error::AuthServiceError;
use crate::state::AppState;

/// Attach both session cookies for a freshly issued pair.
pub(crate) fn set_session_cookies(jar: CookieJar, state: &AppState, tokens: &TokenPair) -> CookieJar {
    let jar = set_access_token_cookie(
        jar,
        tokens.access_token.clone(),
        state.cookie_domain.clone(),
        state.codec.access_ttl_secs,
    );
    set_refresh_token_cookie(
        jar,
        tokens.refresh_token.clone(),
        state.cookie_domain.clone(),
        state.codec.refresh_ttl_secs,
    )
}

// ── POST /auth/refresh ────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// The refresh token comes from the JSON body, falling back to the refresh cookie.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<impl IntoResponse, AuthServiceError> {
    let from_body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<RefreshRequest>(&body)
            .map_err(|_| AuthServiceError::InvalidRefreshToken)?
            .refresh_token
    };
    let raw = from_body
        .or_else(|| jar.get(ATELIER_REFRESH_TOKEN).map(|c| c.value().to_owned()))
        .filter(|t| !t.is_empty())
        .ok_or(AuthServiceError::InvalidRefreshToken)?;

    let tokens = state.session_service().refresh(&raw).await?;

    let jar = set_session_cookies(jar, &state, &tokens);
    Ok((StatusCode::OK, jar, Json(tokens)))
}

// ── POST /auth/logout ─────────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    identity: Result<Identity, StatusCode>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthServiceError> {
    let identity = identity.map_err(|_| AuthServiceError::InvalidToken)?;

    state.session_service().logout(identity.user_id).await?;

    let jar = clear_cookies(jar, state.cookie_domain.clone());
    Ok((StatusCode::NO_CONTENT, jar))
}
