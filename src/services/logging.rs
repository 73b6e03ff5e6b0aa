//! Tracing subscriber setup.
//!
//! One global subscriber: an `EnvFilter` (from `RUST_LOG`, falling back to a
//! crate-level default) plus a JSON or human-readable fmt layer.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;

/// Filter used when `RUST_LOG` is unset or invalid
const DEFAULT_FILTER: &str = "blog_posts_api=debug,tower_http=debug,sqlx=warn";

/// Install the global subscriber. Call once, before anything logs.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
    }
}
