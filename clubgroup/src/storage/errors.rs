//! Error types for storage operations

use std::error::Error;
use std::fmt;

/// Error type for storage operations
#[derive(Debug, Clone)]
pub enum StorageError {
    /// Configuration error
    Configuration(String),

    /// Connection error
    Connection(String),

    /// The store is temporarily unreachable
    Unavailable(String),

    /// Query error
    Query(String),

    /// Data not found
    NotFound(String),

    /// Serialization/deserialization error
    Serialization(String),

    /// Storage timeout error
    Timeout(String),

    /// Internal error
    Internal(String),

    /// Other error
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Whether the error means the store could not be reached at all
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StorageError::Connection(_) | StorageError::Unavailable(_) | StorageError::Timeout(_)
        )
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            StorageError::Connection(msg) => write!(f, "Connection error: {}", msg),
            StorageError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
            StorageError::Query(msg) => write!(f, "Query error: {}", msg),
            StorageError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StorageError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            StorageError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            StorageError::Internal(msg) => write!(f, "Internal error: {}", msg),
            StorageError::Other(msg) => write!(f, "Other error: {}", msg),
        }
    }
}

impl Error for StorageError {}

/// Convert a JSON error to a storage error
impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

// This allows StorageError to be converted to the top-level ClubGroupError
impl From<StorageError> for crate::ClubGroupError {
    fn from(err: StorageError) -> Self {
        if err.is_unavailable() {
            crate::ClubGroupError::StoreUnavailable(err.to_string())
        } else {
            crate::ClubGroupError::Storage(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClubGroupError;

    #[test]
    fn test_unavailable_errors_map_to_store_unavailable() {
        for err in [
            StorageError::Connection("refused".into()),
            StorageError::Unavailable("down".into()),
            StorageError::Timeout("5s".into()),
        ] {
            assert!(matches!(
                ClubGroupError::from(err),
                ClubGroupError::StoreUnavailable(_)
            ));
        }

        let mapped = ClubGroupError::from(StorageError::Query("bad syntax".into()));
        assert!(matches!(mapped, ClubGroupError::Storage(ref msg) if msg.contains("bad syntax")));
    }
}
