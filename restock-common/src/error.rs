//! Common error types for restock
//!
//! Shared by every catalog backend. Variants map to the failure classes a
//! catalog can actually produce: store access (`Database`, `Io`),
//! configuration loading, lookup misses, lifecycle precondition violations,
//! and stored records that no longer decode.

use thiserror::Error;

/// Common result type for restock operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across restock services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested catalog entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Purchase order lifecycle precondition violation
    #[error("Workflow violation: {0}")]
    Workflow(String),

    /// Stored catalog record failed to decode (uuid, date, price, state)
    #[error("Corrupt catalog record: {0}")]
    Corrupt(String),
}
