use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration from environment: {0}")]
    EnvError(#[from] envy::Error),

    #[error("Invalid configuration value: {0}")]
    ValidateError(String),

    #[error("Failed to parse JSON configuration value: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Log(#[from] crate::log::LogError),

    #[error(transparent)]
    Health(#[from] crate::health::HealthError),

    #[error(transparent)]
    Oracle(#[from] crate::oracle::OracleError),
}
