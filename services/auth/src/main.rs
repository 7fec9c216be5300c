use sea_orm::Database;
use tracing::info;

use atelier_auth::config::AuthConfig;
use atelier_auth::infra::db::OutboxNotificationGateway;
use atelier_auth::infra::hasher::BcryptHasher;
use atelier_auth::infra::jwt::JwtTokenCodec;
use atelier_auth::router::build_router;
use atelier_auth::state::AppState;
use atelier_auth::usecase::notification::{Notifier, spawn_notification_worker};
use atelier_core::config::Config;
use atelier_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing("info,sqlx=warn,sea_orm=warn");

    let config = AuthConfig::from_env();
    config.validate().expect("invalid auth configuration");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let hasher = BcryptHasher::new(config.bcrypt_cost).expect("failed to initialise bcrypt hasher");

    let (notifier, notifications) = Notifier::channel(config.notification_queue_size);
    spawn_notification_worker(OutboxNotificationGateway { db: db.clone() }, notifications);

    let state = AppState {
        db,
        codec: JwtTokenCodec {
            access_secret: config.jwt_access_secret,
            refresh_secret: config.jwt_refresh_secret,
            access_ttl_secs: config.access_token_ttl_secs,
            refresh_ttl_secs: config.refresh_token_ttl_secs,
        },
        hasher,
        notifier,
        cookie_domain: config.cookie_domain,
        password_reset_ttl_secs: config.password_reset_ttl_secs,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
