//! Error types for the response store

use std::fmt;

/// Errors that can occur while reading or writing a store
#[derive(Debug)]
pub enum StoreError {
    /// Disk read/write failed
    Io(Box<std::io::Error>),
    /// The persisted metadata index could not be parsed
    Index(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Store IO error: {}", e),
            Self::Index(e) => write!(f, "Store index error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e.as_ref()),
            Self::Index(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(Box::new(e))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Index(e)
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
