use crate::error::ConfigurationError;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the stderr subscriber. `RUST_LOG` wins over `level` when set.
/// Calling it again after a subscriber is installed is a no-op.
pub fn init(level: &str) -> Result<(), ConfigurationError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|_| ConfigurationError::InvalidLogLevel(level.to_string()))?,
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}
