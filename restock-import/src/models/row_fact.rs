//! Validated export row

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One validated order-history export row
///
/// Immutable once constructed by the row parser. Dates are `None` when the
/// export carried no value or a value that failed to parse; numeric fields
/// are always valid (a row with a malformed numeric field is rejected
/// outright and never becomes a fact).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRowFact {
    /// Marketplace domain, used to derive the product link
    pub source_domain: String,
    /// External order reference
    pub order_reference: String,
    /// Order date from the export
    pub order_date: Option<DateTime<Utc>>,
    /// Completion date from the export
    pub completed_date: Option<DateTime<Utc>>,
    /// Supplier product code (SKU)
    pub product_code: String,
    /// Display title, truncated with a ".." suffix when over the limit
    pub product_title: String,
    /// Untruncated title, populated only when truncation occurred
    pub product_description: String,
    /// Ordered quantity (may be zero)
    pub quantity: u32,
    /// Aggregate total price for the row
    pub total_price: Decimal,
    /// Currency code
    pub currency: String,
}
