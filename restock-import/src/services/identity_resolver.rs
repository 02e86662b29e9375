//! Identity resolution
//!
//! Idempotently maps external identifiers onto catalog entities, creating
//! new entities only when no natural-key match exists.
//!
//! Part resolution is a two-level lookup, and the order matters: the
//! supplier part is matched first by `(supplier, sku)`, and only a miss
//! falls through to `(name, description)` part matching. The SKU is the
//! durable external key; matching on name/description first would re-create
//! duplicate parts whenever the catalog copy was edited after import.

use restock_common::model::{PurchaseOrder, Supplier, SupplierPart};
use restock_common::Result;
use tracing::debug;

use crate::catalog::Catalog;
use crate::models::OrderRowFact;

/// Derive the product page hyperlink from marketplace domain and SKU
pub fn product_link(source_domain: &str, product_code: &str) -> String {
    format!("https://{source_domain}/dp/{product_code}")
}

/// Identity resolver over a catalog collaborator
pub struct IdentityResolver<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: Catalog + ?Sized> IdentityResolver<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Get-or-create a supplier by name
    pub async fn resolve_supplier(&self, name: &str) -> Result<Supplier> {
        if let Some(supplier) = self.catalog.supplier_by_name(name).await? {
            return Ok(supplier);
        }
        debug!(supplier = name, "creating supplier");
        self.catalog.create_supplier(name).await
    }

    /// Get-or-create a purchase order by `(supplier, reference)`
    ///
    /// New orders are created in draft state with no dates set; the order
    /// assembler applies the export dates right after creation. Returns
    /// whether the order was created by this call.
    pub async fn resolve_order(
        &self,
        supplier: &Supplier,
        reference: &str,
    ) -> Result<(PurchaseOrder, bool)> {
        if let Some(order) = self
            .catalog
            .order_by_reference(supplier.id, reference)
            .await?
        {
            return Ok((order, false));
        }
        debug!(reference, "creating purchase order");
        let order = self.catalog.create_order(supplier.id, reference).await?;
        Ok((order, true))
    }

    /// Resolve the supplier part for one row, SKU-first
    ///
    /// An existing supplier part wins outright: its part identity is reused
    /// as-is, preserving any edits made in the host catalog since the first
    /// import. Only a SKU miss creates entities, and only then is the
    /// product link derived.
    pub async fn resolve_part(
        &self,
        supplier: &Supplier,
        fact: &OrderRowFact,
    ) -> Result<SupplierPart> {
        if let Some(supplier_part) = self
            .catalog
            .supplier_part_by_sku(supplier.id, &fact.product_code)
            .await?
        {
            return Ok(supplier_part);
        }

        let part = match self
            .catalog
            .part_by_natural_key(&fact.product_title, &fact.product_description)
            .await?
        {
            Some(part) => part,
            None => {
                debug!(title = %fact.product_title, "creating part");
                self.catalog
                    .create_part(&fact.product_title, &fact.product_description)
                    .await?
            }
        };

        let link = product_link(&fact.source_domain, &fact.product_code);
        debug!(sku = %fact.product_code, link = %link, "creating supplier part");
        self.catalog
            .create_supplier_part(part.id, supplier.id, &fact.product_code, &link)
            .await
    }
}
