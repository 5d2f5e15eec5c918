// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid log level '{level}'. Must be one of: {valid_levels}")]
    InvalidLogLevel { level: String, valid_levels: String },
}

/// Logging configuration.
///
/// Env: `LOG_LEVEL_STDOUT` (default `INFO`). No JSON/file-rotation knobs are
/// exposed — logs always go to stdout in plain-text format.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Stored lower-cased; `tracing_subscriber::EnvFilter` accepts either case
    /// but comparisons in `validate()` are easier this way.
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl LogConfig {
    pub(crate) fn validate(&self) -> Result<(), LogError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];

        if !valid_levels.contains(&self.level.as_str()) {
            return Err(LogError::InvalidLogLevel {
                level: self.level.clone(),
                valid_levels: valid_levels.join(", "),
            });
        }

        Ok(())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_valid_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let config = LogConfig {
                level: level.to_string(),
            };
            assert!(config.validate().is_ok(), "Level {} should be valid", level);
        }
    }

    #[test]
    fn test_validate_invalid_level() {
        let config = LogConfig {
            level: "verbose".to_string(),
        };
        assert!(config.validate().is_err());
    }
}
