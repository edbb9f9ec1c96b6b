//! Tracing subscriber setup

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{LogConfig, LogFormat};

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level when set.
///
/// # Errors
/// Returns error if the level is not a valid filter or a subscriber is already installed
pub fn init(config: &LogConfig) -> eyre::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let base = fmt::layer().with_target(true).with_writer(std::io::stderr);
    let fmt_layer = match config.format {
        LogFormat::Json => base.json().boxed(),
        LogFormat::Text => base.boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}
