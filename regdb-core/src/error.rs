//! Error types for regdb catalog access and configuration

use crate::{EntityKind, Scope};
use thiserror::Error;

/// Errors reported by a catalog connection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("Insert failed for {kind} '{name}' in {scope} catalog: {reason}")]
    InsertFailed {
        kind: EntityKind,
        name: String,
        scope: Scope,
        reason: String,
    },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Unexpected result shape: {reason}")]
    UnexpectedResult { reason: String },

    #[error("Catalog lock poisoned")]
    LockPoisoned,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Result type alias for catalog operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_failed_display() {
        let err = StorageError::InsertFailed {
            kind: EntityKind::Model,
            name: "m1".to_string(),
            scope: Scope::Global,
            reason: "duplicate key".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Model 'm1'"));
        assert!(msg.contains("global catalog"));
        assert!(msg.contains("duplicate key"));
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "layout.schema",
            reason: "must not be empty".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("layout.schema"));
        assert!(msg.contains("must not be empty"));
    }
}
