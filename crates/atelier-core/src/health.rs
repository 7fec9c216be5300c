use axum::http::StatusCode;

/// `GET /healthz`: the process is up and serving requests.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Status for `GET /readyz` once a service has probed its dependencies.
/// Load balancers drain an instance on 503 without restarting it.
pub fn readiness(dependencies_ok: bool) -> StatusCode {
    if dependencies_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
