// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

mod error;
mod health;
mod log;
mod oracle;

pub use error::ConfigError;
pub use health::{HealthConfig, HealthError};
pub use log::{LogConfig, LogError};
pub use oracle::{KeySource, OracleConfig, OracleError, OracleMode};

use std::env;

/// Complete daemon configuration, assembled from the environment.
///
/// The env surface mixes unprefixed names (`WS_URL_RELAY`, `CONTRACT_ADDRESS`,
/// ...) with no common prefix, so this loader reads `std::env::var` directly
/// per field rather than one `envy`-deserialized struct, and leans on each
/// section's own `validate()` for shape checking.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub oracle: OracleConfig,
    pub log: LogConfig,
    pub health: HealthConfig,
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse::<T>().map_err(|_| {
            ConfigError::ValidateError(format!("Invalid value for {name}: '{raw}'"))
        }),
        Err(_) => Ok(default),
    }
}

impl DaemonConfig {
    /// Load and validate configuration from the process environment.
    ///
    /// Fatal (returns `Err`) on: a missing required variable, a malformed
    /// value for any field, or an ambiguous oracle key source (both or
    /// neither of `ORACLE_PRIVATE_KEY`/`ORACLE_PRIVATE_KEY_PATH` set).
    pub fn from_env() -> Result<Self, ConfigError> {
        let ws_url_relay = require_env("WS_URL_RELAY")?;
        let ws_url_para = require_env("WS_URL_PARA")?;
        let contract_address = require_env("CONTRACT_ADDRESS")?;

        let key_source = resolve_key_source()?;

        let oracle = OracleConfig {
            ws_url_relay,
            ws_url_para,
            contract_address,
            key_source,
            abi_path: env_string("ABI_PATH", "assets/oracle.json"),
            gas_limit: env_parse("GAS_LIMIT", 10_000_000)?,
            max_priority_fee_per_gas: env_parse("MAX_PRIORITY_FEE_PER_GAS", 0)?,
            frequency_of_requests_secs: env_parse("FREQUENCY_OF_REQUESTS", 180)?,
            max_number_of_failure_requests: env_parse("MAX_NUMBER_OF_FAILURE_REQUESTS", 10)?,
            blacklist_timeout_secs: env_parse("TIMEOUT", 60)?,
            era_duration_in_seconds: env_parse("ERA_DURATION_IN_SECONDS", 180)?,
            era_duration_in_blocks: env_parse("ERA_DURATION_IN_BLOCKS", 30)?,
            initial_block_number: env_parse("INITIAL_BLOCK_NUMBER", 1)?,
            ss58_format: env_parse("SS58_FORMAT", 2)?,
            type_registry_preset: env_string("TYPE_REGISTRY_PRESET", "kusama"),
            para_id: env_parse("PARA_ID", 999)?,
            mode: OracleMode::parse(&env_string("ORACLE_MODE", ""))?,
            era_update_delay_secs: env_parse("ERA_UPDATE_DELAY", 360)?,
            era_delay_time_secs: env_parse("ERA_DELAY_TIME", 600)?,
            waiting_time_before_shutdown_secs: env_parse("WAITING_TIME_BEFORE_SHUTDOWN", 600)?,
            reconnect_initial_delay_ms: env_parse("SAS_SUBSTRATE_RECONNECT_INITIAL_DELAY_MS", 100)?,
            reconnect_max_delay_ms: env_parse("SAS_SUBSTRATE_RECONNECT_MAX_DELAY_MS", 10_000)?,
            reconnect_request_timeout_ms: env_parse(
                "SAS_SUBSTRATE_RECONNECT_REQUEST_TIMEOUT_MS",
                30_000,
            )?,
        };

        let log = LogConfig {
            level: env_string("LOG_LEVEL_STDOUT", "info").to_lowercase(),
        };

        let health = HealthConfig {
            bind_host: env_string("REST_API_SERVER_IP_ADDRESS", "0.0.0.0"),
            port: env_parse("REST_API_SERVER_PORT", 8000)?,
            prometheus_metrics_port: env_parse("PROMETHEUS_METRICS_PORT", 8000)?,
        };

        let config = Self {
            oracle,
            log,
            health,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.oracle.validate()?;
        self.log.validate()?;
        self.health.validate()?;
        Ok(())
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map_err(|_| ConfigError::ValidateError(format!("Missing required env var {name}")))
}

fn resolve_key_source() -> Result<KeySource, ConfigError> {
    let inline = env::var("ORACLE_PRIVATE_KEY").ok().filter(|s| !s.is_empty());
    let path = env::var("ORACLE_PRIVATE_KEY_PATH")
        .ok()
        .filter(|s| !s.is_empty());

    match (inline, path) {
        (Some(key), None) => Ok(KeySource::Inline(key)),
        (None, Some(path)) => Ok(KeySource::Path(path)),
        (None, None) => Err(ConfigError::ValidateError(
            "One of ORACLE_PRIVATE_KEY or ORACLE_PRIVATE_KEY_PATH must be set".to_string(),
        )),
        (Some(_), Some(_)) => Err(OracleError::KeySourceAmbiguous { found: 2 }.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "WS_URL_RELAY",
            "WS_URL_PARA",
            "CONTRACT_ADDRESS",
            "ORACLE_PRIVATE_KEY",
            "ORACLE_PRIVATE_KEY_PATH",
            "ERA_DURATION_IN_BLOCKS",
            "ERA_DURATION_IN_SECONDS",
            "INITIAL_BLOCK_NUMBER",
            "SS58_FORMAT",
            "TYPE_REGISTRY_PRESET",
            "LOG_LEVEL_STDOUT",
            "REST_API_SERVER_PORT",
            "ORACLE_MODE",
        ] {
            unsafe {
                env::remove_var(var);
            }
        }
    }

    fn set_required() {
        unsafe {
            env::set_var("WS_URL_RELAY", "wss://relay.example:443");
            env::set_var("WS_URL_PARA", "wss://para.example:443");
            env::set_var("CONTRACT_ADDRESS", "0x0000000000000000000000000000000000dEaD");
            env::set_var("ORACLE_PRIVATE_KEY", "0xabc123");
            env::set_var("ERA_DURATION_IN_SECONDS", "180");
            env::set_var("ERA_DURATION_IN_BLOCKS", "30");
            env::set_var("INITIAL_BLOCK_NUMBER", "1");
            env::set_var("SS58_FORMAT", "2");
            env::set_var("TYPE_REGISTRY_PRESET", "kusama");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_happy_path() {
        clear_env();
        set_required();
        let config = DaemonConfig::from_env().expect("should load");
        assert_eq!(config.oracle.ws_url_relay, "wss://relay.example:443");
        assert_eq!(config.oracle.gas_limit, 10_000_000);
        assert_eq!(config.health.port, 8000);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.oracle.mode, OracleMode::Normal);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_required_is_fatal() {
        clear_env();
        let result = DaemonConfig::from_env();
        assert!(result.is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_ambiguous_key_source_is_fatal() {
        clear_env();
        set_required();
        unsafe {
            env::set_var("ORACLE_PRIVATE_KEY_PATH", "/etc/oracle/key");
        }
        let result = DaemonConfig::from_env();
        assert!(result.is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_debug_mode() {
        clear_env();
        set_required();
        unsafe {
            env::set_var("ORACLE_MODE", "DEBUG");
        }
        let config = DaemonConfig::from_env().expect("should load");
        assert!(config.oracle.mode.is_debug());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_numeric_value() {
        clear_env();
        set_required();
        unsafe {
            env::set_var("GAS_LIMIT", "not-a-number");
        }
        let result = DaemonConfig::from_env();
        assert!(result.is_err());
        clear_env();
    }
}
