//! Tracing subscriber setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::LoggingConfig,
    error::{AppError, AppResult},
};

/// Default filter directive when `RUST_LOG` is not set
pub fn default_directive(config: &LoggingConfig) -> String {
    format!("locallibrary_catalog={},sqlx=warn", config.level)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. The output format is
/// `json` or anything else for the human-readable layout.
pub fn init(config: &LoggingConfig) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    result.map_err(|e| AppError::Configuration(format!("Failed to initialise logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_uses_level() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        };
        assert_eq!(default_directive(&config), "locallibrary_catalog=debug,sqlx=warn");
    }
}
