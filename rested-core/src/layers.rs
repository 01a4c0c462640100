use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a human-readable tracing subscriber filtered by `RUST_LOG`
/// (default `info`). Calling it twice is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .try_init();
}

/// Install a JSON tracing subscriber, for log shipping.
pub fn init_tracing_json() {
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter())
        .try_init();
}
