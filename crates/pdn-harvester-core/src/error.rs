//! Core error types for pdn-harvester-core.
//!
//! Transport failures are deliberately absent from the common paths: the
//! remote client reports them as empty results (see [`crate::client`]).
//! What remains here are the failures the caller has to act on.

use std::path::PathBuf;
use thiserror::Error;

use crate::resource::ResourceType;

/// Core error type for pdn-harvester-core.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A raw record lacks a field the reconciler cannot default.
    #[error("{resource_type} record is missing required field '{field}'")]
    MissingField {
        resource_type: ResourceType,
        field: String,
    },

    /// A composite resource id that cannot be split into type and remote id.
    #[error("Invalid resource id: {0}")]
    InvalidResourceId(String),

    /// A resource type name outside the closed set of collections.
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    /// The HTTP client could not be constructed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for HarvestError {
    fn from(err: rusqlite::Error) -> Self {
        HarvestError::Database(err.into())
    }
}

/// Result type alias for HarvestError
pub type Result<T, E = HarvestError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_names_type_and_field() {
        let err = HarvestError::MissingField {
            resource_type: ResourceType::Alert,
            field: "id".into(),
        };
        assert_eq!(err.to_string(), "alert record is missing required field 'id'");
    }

    #[test]
    fn rusqlite_errors_become_query_failures() {
        let err: DatabaseError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, DatabaseError::QueryFailed(_)));
    }
}
