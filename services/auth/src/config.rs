use anyhow::ensure;
use serde::Deserialize;

use atelier_core::config::Config;

fn default_access_token_ttl_secs() -> u64 {
    900
}

fn default_refresh_token_ttl_secs() -> u64 {
    604_800
}

fn default_password_reset_ttl_secs() -> u64 {
    3600
}

fn default_bcrypt_cost() -> u32 {
    10
}

fn default_auth_port() -> u16 {
    3112
}

fn default_notification_queue_size() -> usize {
    256
}

/// Auth service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for access tokens. Env var: `JWT_ACCESS_SECRET`.
    pub jwt_access_secret: String,
    /// HMAC secret for refresh tokens; must differ from the access secret.
    pub jwt_refresh_secret: String,
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: u64,
    #[serde(default = "default_refresh_token_ttl_secs")]
    pub refresh_token_ttl_secs: u64,
    #[serde(default = "default_password_reset_ttl_secs")]
    pub password_reset_ttl_secs: u64,
    /// bcrypt work factor (4..=31).
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    /// Cookie domain attribute (root domain, e.g. "example.com").
    pub cookie_domain: String,
    /// TCP port to listen on (default 3112). Env var: `AUTH_PORT`.
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,
    /// Capacity of the in-process notification queue.
    #[serde(default = "default_notification_queue_size")]
    pub notification_queue_size: usize,
}

impl Config for AuthConfig {}

impl AuthConfig {
    /// Reject configurations that would weaken token separation or break issuance.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            !self.jwt_access_secret.is_empty(),
            "JWT_ACCESS_SECRET must not be empty"
        );
        ensure!(
            !self.jwt_refresh_secret.is_empty(),
            "JWT_REFRESH_SECRET must not be empty"
        );
        ensure!(
            self.jwt_access_secret != self.jwt_refresh_secret,
            "JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ"
        );
        ensure!(
            (4..=31).contains(&self.bcrypt_cost),
            "BCRYPT_COST must be within 4..=31"
        );
        ensure!(
            self.access_token_ttl_secs > 0
                && self.refresh_token_ttl_secs > 0
                && self.password_reset_ttl_secs > 0,
            "token TTLs must be positive"
        );
        ensure!(
            self.notification_queue_size > 0,
            "NOTIFICATION_QUEUE_SIZE must be positive"
        );
        Ok(())
    }
}
