//! Configuration types for tinvest-bot
//!
//! All settings come from the environment (optionally seeded from a `.env`
//! file by the binary). Configuration is loaded once by the caller and passed
//! into constructors explicitly; there is no global config state.

use thiserror::Error;

/// Environment variable holding the API token.
pub const ENV_API_TOKEN: &str = "TINKOFF_API_TOKEN";
/// Environment variable selecting the sandbox endpoints.
pub const ENV_USE_SANDBOX: &str = "USE_SANDBOX";
/// Environment variable overriding the application name.
pub const ENV_APP_NAME: &str = "APP_NAME";
/// Environment variable overriding the default log level.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
/// Environment variable enabling the Prometheus exporter on a port.
pub const ENV_METRICS_PORT: &str = "METRICS_PORT";

/// Application name sent to the API when none is configured
pub const DEFAULT_APP_NAME: &str = "tinvest-bot";

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required API token is absent from the environment
    #[error("TINKOFF_API_TOKEN is not set; add it to the environment or .env file")]
    MissingToken,
    /// A configured value could not be parsed
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Root configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    /// API token used as the bearer credential
    pub api_token: String,
    /// Use the sandbox endpoints instead of production.
    /// Unset means production.
    pub use_sandbox: bool,
    /// Application name reported to the API
    pub app_name: String,
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Port for the Prometheus exporter; disabled when unset
    pub metrics_port: Option<u16>,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_token = lookup(ENV_API_TOKEN)
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let use_sandbox = lookup(ENV_USE_SANDBOX)
            .map(|v| parse_truthy(&v))
            .unwrap_or(false);

        let app_name = lookup(ENV_APP_NAME)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());

        let log_level = lookup(ENV_LOG_LEVEL).unwrap_or_else(|| "info".to_string());

        let metrics_port = lookup(ENV_METRICS_PORT)
            .map(|v| {
                v.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                    name: ENV_METRICS_PORT,
                    value: v,
                })
            })
            .transpose()?;

        Ok(Self {
            api_token,
            use_sandbox,
            app_name,
            log_level,
            metrics_port,
        })
    }

    /// Token masked for display
    pub fn masked_token(&self) -> String {
        "*".repeat(self.api_token.len().min(10))
    }
}

/// Parse a truthy environment value: "true", "1", "yes", "y" (any case)
pub fn parse_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y"
    )
}
