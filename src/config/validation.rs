//! Configuration validation.
//!
//! Serde handles syntax; this module checks values: the upstream base URL
//! is usable, timeouts are finite and non-zero, addresses parse.
//! All errors are collected, not just the first.

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(message) = check_base_url(&config.upstream.base_url) {
        errors.push(ValidationError::new("upstream.base_url", message));
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.timeout_secs", "must be greater than 0"));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "upstream.connect_timeout_secs",
            "must be greater than 0",
        ));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_body_bytes", "must be greater than 0"));
    }
    if config.limits.max_upstream_body_bytes == 0 {
        errors.push(ValidationError::new(
            "limits.max_upstream_body_bytes",
            "must be greater than 0",
        ));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("'{}' is not a valid URL: {}", raw, e))?;

    // The pooled connector speaks plain HTTP only.
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme '{}', expected http", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("must not carry a query or fragment".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_base_url_with_path_prefix_is_valid() {
        let mut config = GatewayConfig::default();
        config.upstream.base_url = "http://10.0.0.5:8001/api/".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_unusable_base_urls() {
        for raw in ["user-service:8001", "https://user-service", "http://h/x?y=1", "not a url"] {
            let mut config = GatewayConfig::default();
            config.upstream.base_url = raw.into();
            let errors = validate_config(&config).unwrap_err();
            assert_eq!(errors.len(), 1, "{}", raw);
            assert_eq!(errors[0].field, "upstream.base_url");
        }
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.upstream.timeout_secs = 0;
        config.upstream.connect_timeout_secs = 0;
        config.listener.bind_address = "localhost".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nope".into();

        let fields: Vec<_> = validate_config(&config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(
            fields,
            vec![
                "upstream.timeout_secs",
                "upstream.connect_timeout_secs",
                "listener.bind_address",
                "observability.metrics_address",
            ]
        );
    }

    #[test]
    fn test_rejects_zero_body_limits() {
        let mut config = GatewayConfig::default();
        config.limits.max_body_bytes = 0;
        config.limits.max_upstream_body_bytes = 0;

        let fields: Vec<_> = validate_config(&config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["limits.max_body_bytes", "limits.max_upstream_body_bytes"]);
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());
    }
}
