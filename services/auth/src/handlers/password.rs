use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use atelier_auth_types::identity::Identity;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::password::{ChangePasswordInput, ResetPasswordInput};

// ── POST /auth/password/forgot ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    body: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<StatusCode, AuthServiceError> {
    let Json(body) = body?;
    state.session_service().forgot_password(&body.email).await?;
    Ok(StatusCode::ACCEPTED)
}

// ── POST /auth/password/reset ─────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    body: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<StatusCode, AuthServiceError> {
    let Json(body) = body?;
    state
        .session_service()
        .reset_password(ResetPasswordInput {
            token: body.token,
            new_password: body.new_password,
            confirm_password: body.confirm_password,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /auth/password/change ────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    identity: Result<Identity, StatusCode>,
    body: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<StatusCode, AuthServiceError> {
    let identity = identity.map_err(|_| AuthServiceError::InvalidToken)?;
    let Json(body) = body?;
    state
        .session_service()
        .change_password(ChangePasswordInput {
            user_id: identity.user_id,
            current_password: body.current_password,
            new_password: body.new_password,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
