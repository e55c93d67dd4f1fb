//! Error types for the persistence layer

use thiserror::Error;

/// Result type alias for persistence operations
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Errors that can occur in the persistence layer
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A snapshot file exists but does not describe a usable league
    #[error("Data corruption: {0}")]
    Corruption(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Another writer saved the league after this state was loaded
    #[error("League {league} changed since it was loaded: expected revision {expected}, found {found}")]
    Conflict { league: String, expected: u64, found: u64 },

    /// Invalid operation for current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl PersistenceError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(league: impl Into<String>, expected: u64, found: u64) -> Self {
        Self::Conflict { league: league.into(), expected, found }
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub(crate) fn not_initialized() -> Self {
        Self::invalid_operation("Persistence backend not initialized")
    }
}
