//! Import result reporting
//!
//! The invocation returns a structured [`ImportReport`] rather than a bare
//! success flag, so an operator can audit exactly which rows and orders the
//! batch touched and re-run safely.

use serde::{Deserialize, Serialize};

/// One export row rejected during parsing or assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRow {
    /// Zero-based row index in the CSV (header is row 0)
    pub row: usize,
    pub reason: String,
}

/// One order that failed lifecycle advancement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleFailure {
    /// External order reference
    pub reference: String,
    pub reason: String,
}

/// Per-batch row counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    /// Data rows seen (header excluded)
    pub rows_seen: usize,
    /// Rows accepted into the order map
    pub accepted: usize,
    /// Rows rejected, with reasons
    pub rejected: Vec<RejectedRow>,
    /// Date fields that failed to parse and proceeded as null; a row with
    /// both dates malformed contributes two
    pub date_warnings: usize,
}

impl BatchStats {
    pub fn display_string(&self) -> String {
        format!(
            "{} rows seen, {} accepted, {} rejected, {} date warnings",
            self.rows_seen,
            self.accepted,
            self.rejected.len(),
            self.date_warnings
        )
    }
}

/// Terminal outcome of one import invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImportOutcome {
    /// Batch ran to the end (individual rows/orders may still have failed)
    Completed,
    /// Cancelled at a row or order boundary
    Cancelled,
}

/// Structured result of one `import_orders` invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub outcome: ImportOutcome,
    pub stats: BatchStats,
    /// Distinct orders touched by this batch
    pub orders_touched: usize,
    /// Orders that reached (or already held) the completed state
    pub orders_completed: usize,
    /// Orders left short of completed, with reasons
    pub lifecycle_failures: Vec<LifecycleFailure>,
}

impl ImportReport {
    pub fn display_string(&self) -> String {
        format!(
            "{}; {} orders touched, {} completed, {} lifecycle failures",
            self.stats.display_string(),
            self.orders_touched,
            self.orders_completed,
            self.lifecycle_failures.len()
        )
    }
}
