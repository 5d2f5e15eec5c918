// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("{0} cannot be empty")]
    EmptyValue(&'static str),

    #[error("Invalid URL '{value}' for {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid URL scheme '{scheme}' for {field}. Must be ws://, wss://, http://, or https://")]
    InvalidScheme { field: &'static str, scheme: String },

    #[error(
        "Exactly one of ORACLE_PRIVATE_KEY or ORACLE_PRIVATE_KEY_PATH must be set, found {found}"
    )]
    KeySourceAmbiguous { found: usize },

    #[error("ERA_DURATION_IN_BLOCKS must be greater than 0")]
    ZeroEraDurationBlocks,

    #[error("ERA_DURATION_IN_SECONDS must be greater than 0")]
    ZeroEraDurationSeconds,

    #[error("Unrecognized ORACLE_MODE '{0}', expected 'normal' or 'DEBUG'")]
    InvalidOracleMode(String),
}

/// Where the oracle's signing key comes from. The key material itself is
/// never stored here — `crates/daemon::secrets` resolves this into the actual
/// signer and is the only place the key bytes are held in memory.
#[derive(Clone)]
pub enum KeySource {
    /// `ORACLE_PRIVATE_KEY=0x...`
    Inline(String),
    /// `ORACLE_PRIVATE_KEY_PATH=/path/to/key`
    Path(String),
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Inline(_) => write!(f, "KeySource::Inline(<redacted>)"),
            KeySource::Path(p) => write!(f, "KeySource::Path({p:?})"),
        }
    }
}

/// Whether the Submitter dispatches transactions or only logs what it would
/// have sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OracleMode {
    #[default]
    Normal,
    Debug,
}

impl OracleMode {
    pub(crate) fn parse(raw: &str) -> Result<Self, OracleError> {
        match raw {
            "" | "normal" => Ok(OracleMode::Normal),
            "DEBUG" | "debug" => Ok(OracleMode::Debug),
            other => Err(OracleError::InvalidOracleMode(other.to_string())),
        }
    }

    pub fn is_debug(self) -> bool {
        matches!(self, OracleMode::Debug)
    }
}

/// Everything the Reporter/ChainClient/Submitter components need: the two
/// chain URLs, the signing key source, and the timing/gas knobs that drive
/// era polling and transaction submission.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Env: `WS_URL_RELAY`
    pub ws_url_relay: String,
    /// Env: `WS_URL_PARA`
    pub ws_url_para: String,
    /// Env: `CONTRACT_ADDRESS`
    pub contract_address: String,
    /// Env: `ORACLE_PRIVATE_KEY` / `ORACLE_PRIVATE_KEY_PATH`
    pub key_source: KeySource,
    /// Env: `ABI_PATH`, default `assets/oracle.json`
    pub abi_path: String,
    /// Env: `GAS_LIMIT`, default 10_000_000
    pub gas_limit: u64,
    /// Env: `MAX_PRIORITY_FEE_PER_GAS`, default 0
    pub max_priority_fee_per_gas: u64,
    /// Env: `FREQUENCY_OF_REQUESTS`, default 180
    pub frequency_of_requests_secs: u64,
    /// Env: `MAX_NUMBER_OF_FAILURE_REQUESTS`, default 10
    pub max_number_of_failure_requests: u32,
    /// Env: `TIMEOUT`, default 60
    pub blacklist_timeout_secs: u64,
    /// Env: `ERA_DURATION_IN_SECONDS`, default 180 (watchdog period only)
    pub era_duration_in_seconds: u64,
    /// Env: `ERA_DURATION_IN_BLOCKS`, default 30
    pub era_duration_in_blocks: u64,
    /// Env: `INITIAL_BLOCK_NUMBER`, default 1
    pub initial_block_number: u64,
    /// Env: `SS58_FORMAT`, default 2
    pub ss58_format: u16,
    /// Env: `TYPE_REGISTRY_PRESET`, default `kusama`
    pub type_registry_preset: String,
    /// Env: `PARA_ID`, default 999
    pub para_id: u32,
    /// Env: `ORACLE_MODE`, default normal
    pub mode: OracleMode,
    /// Env: `ERA_UPDATE_DELAY`, default 360
    pub era_update_delay_secs: u64,
    /// Env: `ERA_DELAY_TIME`, default 600
    pub era_delay_time_secs: u64,
    /// Env: `WAITING_TIME_BEFORE_SHUTDOWN`, default 600
    pub waiting_time_before_shutdown_secs: u64,
    /// Reconnecting RPC client tuning for the relay `ChainClient`. Not part of
    /// the documented env surface; fixed to sensible defaults.
    pub reconnect_initial_delay_ms: u64,
    pub reconnect_max_delay_ms: u64,
    pub reconnect_request_timeout_ms: u64,
}

fn validate_ws_url(field: &'static str, value: &str) -> Result<(), OracleError> {
    if value.is_empty() {
        return Err(OracleError::EmptyValue(field));
    }
    let parsed = url::Url::parse(value).map_err(|source| OracleError::InvalidUrl {
        field,
        value: value.to_string(),
        source,
    })?;
    match parsed.scheme() {
        "ws" | "wss" | "http" | "https" => Ok(()),
        scheme => Err(OracleError::InvalidScheme {
            field,
            scheme: scheme.to_string(),
        }),
    }
}

impl OracleConfig {
    pub(crate) fn validate(&self) -> Result<(), OracleError> {
        validate_ws_url("WS_URL_RELAY", &self.ws_url_relay)?;
        validate_ws_url("WS_URL_PARA", &self.ws_url_para)?;

        if self.contract_address.is_empty() {
            return Err(OracleError::EmptyValue("CONTRACT_ADDRESS"));
        }

        if self.era_duration_in_blocks == 0 {
            return Err(OracleError::ZeroEraDurationBlocks);
        }

        if self.era_duration_in_seconds == 0 {
            return Err(OracleError::ZeroEraDurationSeconds);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> OracleConfig {
        OracleConfig {
            ws_url_relay: "wss://relay.example:443".to_string(),
            ws_url_para: "wss://para.example:443".to_string(),
            contract_address: "0x0000000000000000000000000000000000dEaD".to_string(),
            key_source: KeySource::Inline("0xabc".to_string()),
            abi_path: "assets/oracle.json".to_string(),
            gas_limit: 10_000_000,
            max_priority_fee_per_gas: 0,
            frequency_of_requests_secs: 180,
            max_number_of_failure_requests: 10,
            blacklist_timeout_secs: 60,
            era_duration_in_seconds: 180,
            era_duration_in_blocks: 30,
            initial_block_number: 1,
            ss58_format: 2,
            type_registry_preset: "kusama".to_string(),
            para_id: 999,
            mode: OracleMode::Normal,
            era_update_delay_secs: 360,
            era_delay_time_secs: 600,
            waiting_time_before_shutdown_secs: 600,
            reconnect_initial_delay_ms: 100,
            reconnect_max_delay_ms: 10_000,
            reconnect_request_timeout_ms: 30_000,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_empty_relay_url() {
        let mut cfg = base();
        cfg.ws_url_relay = String::new();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_bad_scheme() {
        let mut cfg = base();
        cfg.ws_url_para = "ftp://para.example".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_empty_contract_address() {
        let mut cfg = base();
        cfg.contract_address = String::new();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_era_duration_blocks() {
        let mut cfg = base();
        cfg.era_duration_in_blocks = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_oracle_mode_parse_normal() {
        assert_eq!(OracleMode::parse("").unwrap(), OracleMode::Normal);
        assert_eq!(OracleMode::parse("normal").unwrap(), OracleMode::Normal);
    }

    #[test]
    fn test_oracle_mode_parse_debug() {
        assert_eq!(OracleMode::parse("DEBUG").unwrap(), OracleMode::Debug);
        assert!(OracleMode::Debug.is_debug());
    }

    #[test]
    fn test_oracle_mode_parse_invalid() {
        assert!(OracleMode::parse("YOLO").is_err());
    }

    #[test]
    fn test_key_source_debug_redacts_inline() {
        let key = KeySource::Inline("0xsupersecret".to_string());
        let rendered = format!("{key:?}");
        assert!(!rendered.contains("supersecret"));
    }
}
