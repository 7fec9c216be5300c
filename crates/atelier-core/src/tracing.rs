use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize JSON tracing on stdout. `RUST_LOG` wins when set; otherwise
/// `default_directives` applies (e.g. `"info,sqlx=warn"` to keep per-query
/// logs out of production output).
///
/// Only the first call installs a subscriber.
pub fn init_tracing(default_directives: &str) {
    let filter = filter_from(std::env::var("RUST_LOG").ok().as_deref(), default_directives);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true).with_current_span(false))
        .try_init();
}

fn filter_from(env: Option<&str>, default_directives: &str) -> EnvFilter {
    env.filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directives))
}
