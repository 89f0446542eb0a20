use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wordlens_core::config::LoggingConfig;

const DEFAULT_FILTER: &str = "info,wordlens=debug";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `logging.filter`. Calling this twice is a no-op.
pub fn configure_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.filter.as_deref().unwrap_or(DEFAULT_FILTER))
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
