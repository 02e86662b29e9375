//! Data models for the import engine

pub mod report;
pub mod row_fact;

pub use report::{BatchStats, ImportOutcome, ImportReport, LifecycleFailure, RejectedRow};
pub use row_fact::OrderRowFact;
