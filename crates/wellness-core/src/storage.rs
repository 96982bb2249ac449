//! Storage areas and persistence failures

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical storage area a value is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    /// Plain user preferences
    Defaults,
    /// Credentials and session tokens
    Secure,
    /// Structured records such as workouts
    Database,
}

impl StorageType {
    pub const ALL: [StorageType; 3] = [
        StorageType::Defaults,
        StorageType::Secure,
        StorageType::Database,
    ];

    /// Directory name used by file-backed stores
    pub fn dir_name(&self) -> &'static str {
        match self {
            StorageType::Defaults => "defaults",
            StorageType::Secure => "secure",
            StorageType::Database => "database",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Data encoding error")]
    EncodingError,

    #[error("Data decoding error")]
    DecodingError,

    #[error("Item not found")]
    ItemNotFound,

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        PersistenceError::StorageError(err.to_string())
    }
}

/// Validate a storage key: non-empty, no path separators, no leading dot
pub fn validate_key(key: &str) -> Result<(), PersistenceError> {
    let invalid = key.is_empty()
        || key.starts_with('.')
        || key.contains(['/', '\\'])
        || key.chars().any(char::is_control);
    if invalid {
        return Err(PersistenceError::StorageError(format!(
            "invalid storage key: {key:?}"
        )));
    }
    Ok(())
}
