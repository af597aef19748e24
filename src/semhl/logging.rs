//! Process-wide logging setup

use std::sync::Once;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

static LOGGING_INIT: Once = Once::new();

#[derive(Debug, Error)]
#[error("failed to initialize logging: {0}")]
pub struct LoggingError(String);

/// Installs a fmt subscriber on stderr, filtered by `RUST_LOG` or else `default_filter`.
///
/// Repeated calls are no-ops once the first one ran.
pub fn init_logging(default_filter: &str) -> Result<(), LoggingError> {
    let mut init_result = Ok(());

    LOGGING_INIT.call_once(|| {
        init_result = tracing_subscriber::fmt()
            .with_env_filter(env_filter(default_filter))
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|error| LoggingError(error.to_string()));
    });

    init_result
}

fn env_filter(default_filter: &str) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(default_filter),
    }
}
