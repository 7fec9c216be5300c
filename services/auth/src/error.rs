use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Transport-independent error taxonomy of the auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Conflict,
    Unauthorized,
    BadRequest,
    NotFound,
    Internal,
}

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("malformed request body")]
    MalformedBody,
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be 8 to 72 bytes and contain a letter and a digit")]
    WeakPassword,
    #[error("invalid name")]
    InvalidName,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("email in use")]
    EmailInUse,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid or expired token")]
    InvalidResetToken,
    #[error("user not found")]
    UserNotFound,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MalformedBody
            | Self::InvalidEmail
            | Self::WeakPassword
            | Self::InvalidName
            | Self::PasswordMismatch => ErrorClass::Validation,
            Self::EmailInUse => ErrorClass::Conflict,
            Self::InvalidCredentials | Self::InvalidRefreshToken | Self::InvalidToken => {
                ErrorClass::Unauthorized
            }
            Self::InvalidResetToken => ErrorClass::BadRequest,
            Self::UserNotFound => ErrorClass::NotFound,
            Self::Internal(_) => ErrorClass::Internal,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedBody => "MALFORMED_BODY",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::InvalidName => "INVALID_NAME",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::EmailInUse => "EMAIL_IN_USE",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidResetToken => "INVALID_RESET_TOKEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

/// Axum's own rejection (missing content type, bad JSON, missing field) renders
/// as plain text; fold it into the service taxonomy instead.
impl From<JsonRejection> for AuthServiceError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(
            status = %rejection.status(),
            reason = %rejection.body_text(),
            "rejected request body"
        );
        Self::MalformedBody
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match self.class() {
            ErrorClass::Validation | ErrorClass::BadRequest => StatusCode::BAD_REQUEST,
            ErrorClass::Conflict => StatusCode::CONFLICT,
            ErrorClass::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorClass::NotFound => StatusCode::NOT_FOUND,
            ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // TraceLayer already records every status; only the 500 cause needs logging here.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
