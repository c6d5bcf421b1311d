//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Primary environment variable for the upstream base URL.
pub const ENV_UPSTREAM_BASE_URL: &str = "UPSTREAM_BASE_URL";
/// Legacy name of the same setting, still honoured.
pub const ENV_USER_SERVICE_URL: &str = "USER_SERVICE_URL";
pub const ENV_UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
pub const ENV_BIND_ADDRESS: &str = "GATEWAY_BIND_ADDRESS";
pub const ENV_LOG_FORMAT: &str = "GATEWAY_LOG_FORMAT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {message}")]
    Env { var: &'static str, message: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_address: Option<String>,
    pub upstream_base_url: Option<String>,
}

impl Overrides {
    pub fn apply(&self, config: &mut GatewayConfig) {
        if let Some(addr) = &self.bind_address {
            config.listener.bind_address = addr.clone();
        }
        if let Some(url) = &self.upstream_base_url {
            config.upstream.base_url = url.clone();
        }
    }
}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment, then `overrides`. The result is validated before it
/// is returned.
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML file without validating it.
pub fn read_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment overrides through `lookup`, so callers (and tests) pick
/// the source of variables.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(ENV_UPSTREAM_BASE_URL).or_else(|| non_empty(ENV_USER_SERVICE_URL)) {
        config.upstream.base_url = url.trim().to_string();
    }

    if let Some(raw) = non_empty(ENV_UPSTREAM_TIMEOUT_SECS) {
        config.upstream.timeout_secs = raw.trim().parse().map_err(|e| ConfigError::Env {
            var: ENV_UPSTREAM_TIMEOUT_SECS,
            message: format!("{}", e),
        })?;
    }

    if let Some(addr) = non_empty(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr.trim().to_string();
    }

    if let Some(raw) = non_empty(ENV_LOG_FORMAT) {
        config.observability.log_format = raw
            .parse()
            .map_err(|message| ConfigError::Env { var: ENV_LOG_FORMAT, message })?;
    }

    Ok(())
}
