//! Tracing subscriber bootstrap

use crate::config::LoggingConfig;
use crate::{Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for the TrendBasket crates at `level`
pub fn default_directive(level: &str) -> String {
    format!("tb_ingest={level},tb_common={level}")
}

/// Install the global subscriber
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to the
/// TrendBasket crates. Output goes to stderr so stdout stays free for the
/// run summary.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {}", e)))
}
