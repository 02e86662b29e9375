//! # Restock Common Library
//!
//! Shared code for the restock services:
//! - Catalog entity model (suppliers, parts, purchase orders, line items)
//! - Common error types

pub mod error;
pub mod model;

pub use error::{Error, Result};
