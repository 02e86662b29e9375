//! Catalog entity model
//!
//! Entities managed by the host catalog. Each entity carries an internal
//! `Uuid` identity plus the natural key the import engine deduplicates on:
//!
//! - `Supplier` — name
//! - `Part` — (name, description)
//! - `SupplierPart` — (supplier, sku)
//! - `PurchaseOrder` — (supplier, reference)
//! - `OrderLineItem` — (order, supplier_part, quantity, currency)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A company goods are purchased from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    /// Natural key: supplier name (e.g. "Amazon")
    pub name: String,
}

/// Internal product record
///
/// Keyed by (name, description) in the absence of a richer external key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// Binding of a [`Part`] to a [`Supplier`] via the supplier's external SKU
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierPart {
    pub id: Uuid,
    pub part_id: Uuid,
    pub supplier_id: Uuid,
    /// Supplier-assigned product code
    pub sku: String,
    /// Product page hyperlink, derived from (marketplace domain, sku)
    pub link: String,
}

/// Purchase order lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderState {
    /// Order created but not yet placed with the supplier
    Draft,
    /// Order issued for internal approval
    Issued,
    /// Order placed with the supplier
    Placed,
    /// All goods received, not yet closed out
    Received,
    /// Order closed out
    Completed,
}

/// A purchase order against a supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub supplier_id: Uuid,
    /// Natural key (with supplier): the supplier's order reference
    pub reference: String,
    pub state: OrderState,
    /// When the order was placed, sourced from the export
    pub issue_date: Option<DateTime<Utc>>,
    /// When the order was fulfilled, sourced from the export
    pub complete_date: Option<DateTime<Utc>>,
}

/// Line item receipt state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineState {
    /// Ordered, goods not yet received
    Pending,
    /// Full quantity received into stock
    Received,
}

/// One quantity/price entry on a purchase order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub supplier_part_id: Uuid,
    pub quantity: u32,
    pub currency: String,
    /// Per-unit purchase price derived from the export's aggregate total
    pub unit_price: Decimal,
    pub state: LineState,
}

/// Record of goods received into stock for one line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReceipt {
    pub id: Uuid,
    pub line_item_id: Uuid,
    /// Stock location the goods were booked into, if one was supplied
    pub location: Option<String>,
    pub quantity: u32,
    /// User the receipt is attributed to
    pub received_by: String,
    pub received_at: DateTime<Utc>,
}
