//! Tracing subscriber setup.
//!
//! Events go to stderr so stdout stays free for the run summary.

use stocksync_domain::{LoggingConfig, Result, StockSyncError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this when a subscriber
/// is already installed is not an error.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), &config.level)?;

    let layer = if config.json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer().with_target(true).with_writer(std::io::stderr).boxed()
    };

    if tracing_subscriber::registry().with(layer.with_filter(filter)).try_init().is_err() {
        tracing::debug!("observability.subscriber_already_set");
    }
    Ok(())
}

fn build_filter(rust_log: Option<&str>, level: &str) -> Result<EnvFilter> {
    let directives = rust_log.filter(|value| !value.trim().is_empty()).unwrap_or(level);
    EnvFilter::try_new(directives)
        .map_err(|e| StockSyncError::Config(format!("Invalid log filter '{directives}': {e}")))
}
