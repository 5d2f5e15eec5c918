// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use std::net::IpAddr;
use std::str::FromStr;
use thiserror::Error;

/// Validates that a string is a valid host (IP address or hostname).
fn is_valid_host(host: &str) -> bool {
    if IpAddr::from_str(host).is_ok() {
        return true;
    }

    if host.is_empty() || host.len() > 253 {
        return false;
    }

    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("Invalid host address or hostname: {0}")]
    InvalidHost(String),

    #[error("Port must be between 1 and 65535, got {0}")]
    InvalidPort(u16),
}

/// Configuration for the `/healthcheck` + `/metrics` HTTP surface.
///
/// Both routes are served from a single Axum router bound to
/// `(bind_host, port)`. `prometheus_metrics_port`, when configured to a value
/// different from `port`, is accepted but never opens a second listener.
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Env: `REST_API_SERVER_IP_ADDRESS`, default `0.0.0.0`
    pub bind_host: String,
    /// Env: `REST_API_SERVER_PORT`, default 8000
    pub port: u16,
    /// Env: `PROMETHEUS_METRICS_PORT`, default 8000. Only consulted to warn
    /// when it disagrees with `port`.
    pub prometheus_metrics_port: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 8000,
            prometheus_metrics_port: 8000,
        }
    }
}

impl HealthConfig {
    pub(crate) fn validate(&self) -> Result<(), HealthError> {
        if !is_valid_host(&self.bind_host) {
            return Err(HealthError::InvalidHost(self.bind_host.clone()));
        }

        if self.port == 0 {
            return Err(HealthError::InvalidPort(self.port));
        }

        if self.prometheus_metrics_port == 0 {
            return Err(HealthError::InvalidPort(self.prometheus_metrics_port));
        }

        Ok(())
    }

    /// True when a distinct metrics port was configured and the caller should
    /// log a startup warning that it is being ignored.
    pub fn has_conflicting_metrics_port(&self) -> bool {
        self.prometheus_metrics_port != self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_health_config() {
        let config = HealthConfig::default();
        assert_eq!(config.bind_host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.prometheus_metrics_port, 8000);
        assert!(config.validate().is_ok());
        assert!(!config.has_conflicting_metrics_port());
    }

    #[test]
    fn test_valid_hostname() {
        let config = HealthConfig {
            bind_host: "healthcheck.internal".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_host() {
        let config = HealthConfig {
            bind_host: "-bad".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_port() {
        let config = HealthConfig {
            port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_conflicting_metrics_port_is_detected_but_not_fatal() {
        let config = HealthConfig {
            prometheus_metrics_port: 8001,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.has_conflicting_metrics_port());
    }
}
