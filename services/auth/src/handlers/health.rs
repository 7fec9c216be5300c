use axum::{extract::State, http::StatusCode};
use tracing::warn;

use atelier_core::health::readiness;

use crate::state::AppState;

// ── GET /readyz ───────────────────────────────────────────────────────────────

/// Ready when Postgres answers and the notification worker is still draining.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    let db_ok = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "readiness: database ping failed");
            false
        }
    };
    let notifier_ok = state.notifier.is_running();
    if !notifier_ok {
        warn!("readiness: notification worker stopped");
    }
    readiness(db_ok && notifier_ok)
}
