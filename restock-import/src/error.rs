//! Error types for restock-import
//!
//! The taxonomy follows the recovery boundary each error belongs to:
//! archive errors abort the invocation, row errors reject one row,
//! lifecycle errors leave one order in its last good state. Cancellation
//! is not an error; it is reported through the import outcome.

use thiserror::Error;

/// Result type for import operations
pub type ImportResult<T> = std::result::Result<T, ImportError>;

/// Import error type
#[derive(Debug, Error)]
pub enum ImportError {
    /// Corrupt archive, undecodable payload, or missing CSV entry.
    /// Fatal for the whole invocation; no orders are processed.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Malformed numeric field in one export row. The row is rejected
    /// and the batch continues.
    #[error("Row {row}: {reason}")]
    RowFormat { row: usize, reason: String },

    /// A lifecycle transition failed for one order. The order is left in
    /// its last successful state; other orders still advance.
    #[error("Order {reference}: {reason}")]
    Lifecycle { reference: String, reason: String },

    /// Collaborator (catalog or workflow) failure
    #[error(transparent)]
    Catalog(#[from] restock_common::Error),
}
