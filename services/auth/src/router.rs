use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use atelier_core::health::healthz;
use atelier_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    account::{login, me, register},
    health::readyz,
    password::{change_password, forgot_password, reset_password},
    token::{logout, refresh},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Account
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        // Session
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        // Password
        .route("/auth/password/forgot", post(forgot_password))
        .route("/auth/password/reset", post(reset_password))
        .route("/auth/password/change", post(change_password))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
