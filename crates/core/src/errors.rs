//! Error taxonomy shared across the workspace.

use thiserror::Error;

/// Result type alias used throughout the core and storage crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Local storage failures, reported by the storage crate.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A query or statement failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Getting a pooled connection failed.
    #[error("Connection pool error: {0}")]
    Pool(String),

    /// Anything else the storage layer cannot express more precisely.
    #[error("{0}")]
    Internal(String),
}

/// Top-level error for repository and service operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Local I/O failure; propagated to the caller, never retried here.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// JSON encode/decode failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No resolvable signed-in user. Sync treats this as "nothing to do";
    /// repository writes surface it to the caller.
    #[error("No authenticated session")]
    Unauthenticated,

    /// Rejected domain input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A record the operation requires does not exist locally.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}
