//! Restock Import - Order History Reconciliation Engine
//!
//! Replays a retail order-history export (a ZIP archive containing a CSV
//! manifest) into a purchasing catalog. Each run is idempotent: entities are
//! matched by natural keys, so re-importing the same archive converges on the
//! same catalog state instead of duplicating it.
//!
//! Pipeline stages:
//! - Archive intake: decode, unzip, and read the CSV manifest
//! - Row parsing: per-row validation into normalized order facts
//! - Batch orchestration: identity resolution and order assembly per row
//! - Lifecycle driving: place, receive, and complete each touched order

pub mod archive;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod services;

pub use error::{ImportError, ImportResult};
pub use service::OrderImportService;
