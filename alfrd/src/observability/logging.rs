//! Subscriber installation for the `alfrd` binary and embedding programs.

use crate::config::LogConfig;
use crate::errors::AlfrdError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Output goes to stderr so
/// step reports on stdout stay machine-readable.
///
/// # Errors
///
/// Returns `AlfrdError::Config` if the level is not a valid filter directive
/// or a global subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> Result<(), AlfrdError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| AlfrdError::Config(format!("invalid log level '{}': {e}", config.level)))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| AlfrdError::Config(e.to_string()))
}
