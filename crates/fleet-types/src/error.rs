//! Error types for fleet-manager

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rejected input: empty name, out-of-range capacity or package count
    #[error("{0}")]
    Validation(String),

    /// Duplicate vehicle name within a kind
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    /// Vehicle already holds `capacity` packages
    #[error("{0}")]
    CapacityReached(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_display_bare_message() {
        let err = Error::Conflict("Name already exists".to_string());
        assert_eq!(err.to_string(), "Name already exists");
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_config_error_converts() {
        let err: Error = ConfigError::NotFound.into();
        assert!(matches!(err, Error::Config(ConfigError::NotFound)));
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
