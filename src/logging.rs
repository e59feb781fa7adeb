//! Application-wide structured logging.
//!
//! Builds a tracing subscriber that:
//! - Filters by `RUST_LOG`, falling back to a caller-supplied default
//! - Emits Bunyan-formatted JSON to the given sink
//! - Captures `log` records (sqlx logs through `log`) via `LogTracer`

use tracing::Subscriber;
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, fmt::MakeWriter, layer::SubscriberExt};

/// Composes the subscriber without installing it.
///
/// # Parameters
/// - `name`: service name written into every Bunyan record
/// - `env_filter`: filter used when `RUST_LOG` is unset or invalid
/// - `sink`: where formatted records go (`std::io::stdout`, `std::io::sink`, ...)
///
/// # Example
/// ```rust
/// use news_aggregator::{get_subscriber, init_subscriber};
///
/// let subscriber = get_subscriber("news_aggregator".into(), "info".into(), std::io::stdout);
/// init_subscriber(subscriber);
/// ```
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = BunyanFormattingLayer::new(name, sink);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Installs `subscriber` as the global default. Call once, at startup.
///
/// # Panics
/// Panics if a global logger or subscriber has already been set.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("Failed to set logger");
    set_global_default(subscriber).expect("Failed to set subscriber");
}
