//! Tracing subscriber setup for the binary.

use crate::error::TokenError;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging options, read from `LOG_LEVEL` / `LOG_JSON`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Reported in the startup event
    pub service_name: String,
    /// Filter directives, used when `RUST_LOG` is unset
    pub log_level: String,
    /// One JSON object per event instead of human-readable lines
    pub json_output: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "token-issuer".to_string(),
            log_level: "info".to_string(),
            json_output: false,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    #[must_use]
    pub const fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }

    fn filter(&self) -> Result<EnvFilter, TokenError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        parse_filter(&self.log_level)
    }
}

fn parse_filter(directives: &str) -> Result<EnvFilter, TokenError> {
    EnvFilter::try_new(directives)
        .map_err(|e| TokenError::config(format!("Invalid LOG_LEVEL {:?}: {}", directives, e)))
}

/// Install the global subscriber. `RUST_LOG` overrides `log_level`.
///
/// # Errors
///
/// Returns `Config` if the level directives do not parse or a subscriber
/// is already installed.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TokenError> {
    let registry = tracing_subscriber::registry().with(config.filter()?);
    let installed = if config.json_output {
        registry.with(fmt::layer().json().flatten_event(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };
    installed.map_err(|e| TokenError::config(format!("Tracing already initialized: {}", e)))?;

    info!(
        service = %config.service_name,
        json = config.json_output,
        "Tracing initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = TracingConfig::default()
            .with_service_name("issuer-test")
            .with_log_level("token_issuer=debug,warn")
            .with_json_output();

        assert_eq!(config.service_name, "issuer-test");
        assert_eq!(config.log_level, "token_issuer=debug,warn");
        assert!(config.json_output);
        assert!(!TracingConfig::default().json_output);
    }

    #[test]
    fn test_filter_directives() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("token_issuer=debug,warn").is_ok());
        assert!(matches!(
            parse_filter("token_issuer=loud"),
            Err(TokenError::Config(_))
        ));
    }
}
