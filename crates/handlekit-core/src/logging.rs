use crate::config_manager::{ConfigError, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global tracing subscriber configured from `config`.
///
/// Returns `Ok(true)` when this call installed the subscriber and `Ok(false)` when one was
/// already in place (installed earlier by us or by the host process). Output goes to stderr
/// so a host's stdout stays untouched.
pub fn init_logging(config: &LoggingConfig) -> Result<bool, ConfigError> {
    let filter = EnvFilter::try_new(&config.level).map_err(|e| {
        ConfigError::ValidationError(format!("Invalid log filter '{}': {}", config.level, e))
    })?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        "pretty" => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        _ => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    };

    Ok(installed.is_ok())
}
