//! Log output for the server.
//!
//! Development gets pretty, multi-line events with source locations;
//! production writes one JSON object per line with the active span fields
//! (`request_id`, method, uri) flattened in. `RUST_LOG` replaces the default
//! filter in both modes, e.g. `RUST_LOG=anki_api=trace,sqlx=info`.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(env: &Environment) -> &'static str {
    if env.is_development() {
        "info,anki_api=debug,anki_db=debug,serv=debug,tower_http=debug,sqlx=warn"
    } else {
        "info,tower_http=info,sqlx=warn,tower_governor=warn"
    }
}

/// Install the global subscriber. Call once, before the first log line.
pub fn init_tracing(env: &Environment) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(env)));

    let fmt_layer = if env.is_development() {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .flatten_event(true)
            .with_target(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(env_filter))
        .init();

    tracing::info!(environment = ?env, "Logging initialized");
}
