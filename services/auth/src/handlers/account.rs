use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use atelier_auth_types::identity::Identity;

use crate::domain::types::{AccountView, TokenPair};
use crate::error::AuthServiceError;
use crate::handlers::token::set_session_cookies;
use crate::state::AppState;
use crate::usecase::account::{LoginInput, RegisterInput};
use crate::usecase::session::SessionOutput;

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: AccountView,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

impl From<SessionOutput> for SessionResponse {
    fn from(out: SessionOutput) -> Self {
        Self {
            user: out.user,
            tokens: out.tokens,
        }
    }
}

// ── POST /auth/register ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let Json(body) = body?;
    let out = state
        .session_service()
        .register(RegisterInput {
            email: body.email,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
        })
        .await?;

    let jar = set_session_cookies(jar, &state, &out.tokens);
    Ok((StatusCode::CREATED, jar, Json(SessionResponse::from(out))))
}

// ── POST /auth/login ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let Json(body) = body?;
    let out = state
        .session_service()
        .login(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;

    let jar = set_session_cookies(jar, &state, &out.tokens);
    Ok((StatusCode::OK, jar, Json(SessionResponse::from(out))))
}

// ── GET /auth/me ──────────────────────────────────────────────────────────────

pub async fn me(
    State(state): State<AppState>,
    identity: Result<Identity, StatusCode>,
) -> Result<Json<AccountView>, AuthServiceError> {
    let identity = identity.map_err(|_| AuthServiceError::InvalidToken)?;
    let view = state.session_service().me(identity.user_id).await?;
    Ok(Json(view))
}
