//! Collaborator seams for the host catalog
//!
//! The engine never owns persistence or workflow semantics; it talks to two
//! traits, passed in explicitly:
//!
//! - [`Catalog`] — natural-key lookup and creation for suppliers, parts,
//!   supplier parts, purchase orders, and line items
//! - [`OrderWorkflow`] — purchase-order lifecycle transitions with their
//!   host side effects (stock receipt, wall-clock date stamping)
//!
//! Both backends in this crate ([`MemoryCatalog`] and
//! [`crate::db::SqliteCatalog`]) implement both traits.

pub mod memory;

pub use memory::{CatalogCounts, MemoryCatalog};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use restock_common::model::{OrderLineItem, Part, PurchaseOrder, Supplier, SupplierPart};
use restock_common::Result;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Persistence collaborator
///
/// Lookups are by natural key; creation is explicit. The engine's identity
/// resolver composes the two into idempotent get-or-create, so a backend
/// only has to answer "does this key exist" and "make this entity".
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn supplier_by_name(&self, name: &str) -> Result<Option<Supplier>>;
    async fn create_supplier(&self, name: &str) -> Result<Supplier>;

    async fn part_by_natural_key(&self, name: &str, description: &str) -> Result<Option<Part>>;
    async fn create_part(&self, name: &str, description: &str) -> Result<Part>;

    async fn supplier_part_by_sku(
        &self,
        supplier_id: Uuid,
        sku: &str,
    ) -> Result<Option<SupplierPart>>;
    async fn create_supplier_part(
        &self,
        part_id: Uuid,
        supplier_id: Uuid,
        sku: &str,
        link: &str,
    ) -> Result<SupplierPart>;

    async fn order_by_reference(
        &self,
        supplier_id: Uuid,
        reference: &str,
    ) -> Result<Option<PurchaseOrder>>;
    async fn order_by_id(&self, order_id: Uuid) -> Result<Option<PurchaseOrder>>;
    /// Create a purchase order in draft state with no dates set
    async fn create_order(&self, supplier_id: Uuid, reference: &str) -> Result<PurchaseOrder>;
    /// Overwrite both order dates with the given values (including `None`)
    async fn set_order_dates(
        &self,
        order_id: Uuid,
        issue_date: Option<DateTime<Utc>>,
        complete_date: Option<DateTime<Utc>>,
    ) -> Result<()>;

    async fn line_item_by_key(
        &self,
        order_id: Uuid,
        supplier_part_id: Uuid,
        quantity: u32,
        currency: &str,
    ) -> Result<Option<OrderLineItem>>;
    async fn create_line_item(
        &self,
        order_id: Uuid,
        supplier_part_id: Uuid,
        quantity: u32,
        currency: &str,
        unit_price: Decimal,
    ) -> Result<OrderLineItem>;
    async fn set_line_unit_price(&self, line_id: Uuid, unit_price: Decimal) -> Result<()>;
}

/// Workflow collaborator
///
/// Host semantics: `place_order` and `complete_order` stamp the order's
/// `issue_date`/`complete_date` with wall-clock "now". The lifecycle driver
/// re-applies the export dates afterwards, which is why [`Catalog`] exposes
/// `set_order_dates` separately.
#[async_trait]
pub trait OrderWorkflow: Send + Sync {
    /// draft → placed; requires at least one line item
    async fn place_order(&self, order_id: Uuid) -> Result<()>;

    /// Line items of the order not yet received
    async fn pending_line_items(&self, order_id: Uuid) -> Result<Vec<OrderLineItem>>;

    /// Receive goods for one pending line into the given stock location,
    /// attributed to the acting user
    async fn receive_line_item(
        &self,
        line_id: Uuid,
        location: Option<&str>,
        quantity: u32,
        user: &str,
    ) -> Result<()>;

    /// placed → completed; requires no pending lines
    async fn complete_order(&self, order_id: Uuid) -> Result<()>;
}
