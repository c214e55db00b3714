//! Console logging for the bot process

use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "info,jupiter_arb_bot=debug,jupiter_arb_core=info";

/// Filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`] when unset or unparsable
fn build_filter(directives: Option<&str>) -> (EnvFilter, Option<String>) {
    match directives.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => match EnvFilter::try_new(directives) {
            Ok(filter) => (filter, None),
            Err(e) => (
                EnvFilter::new(DEFAULT_FILTER),
                Some(format!("Ignoring RUST_LOG {:?}: {}", directives, e)),
            ),
        },
        None => (EnvFilter::new(DEFAULT_FILTER), None),
    }
}

pub fn setup() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, rejected) = build_filter(rust_log.as_deref());

    let console = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .with_ansi(true)
        .compact();

    // a second install (tests, embedding) keeps the first subscriber
    if tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .try_init()
        .is_ok()
    {
        if let Some(message) = rejected {
            warn!("{}", message);
        }
    }
}
