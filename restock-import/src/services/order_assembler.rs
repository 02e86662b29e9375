//! Order assembly
//!
//! Takes one validated row plus resolved identities and upserts the
//! purchase order, its line item, and the derived unit price, recording the
//! touched order in the batch's order map.

use restock_common::model::{PurchaseOrder, Supplier};
use restock_common::Result;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::models::OrderRowFact;
use crate::services::identity_resolver::IdentityResolver;

/// Per-unit price from the export's aggregate total
///
/// `total / quantity` for positive quantities; a zero quantity divides by
/// one instead and yields the total unchanged. Zero-quantity rows occur in
/// real exports (cancelled and zero-cost lines) and must never fault.
pub fn unit_price(total: Decimal, quantity: u32) -> Decimal {
    if quantity == 0 {
        total
    } else {
        total / Decimal::from(quantity)
    }
}

/// Order assembler over a catalog collaborator
pub struct OrderAssembler<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    resolver: IdentityResolver<'a, C>,
}

impl<'a, C: Catalog + ?Sized> OrderAssembler<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            resolver: IdentityResolver::new(catalog),
        }
    }

    /// Upsert the order and line item for one validated row
    ///
    /// The order map is keyed by the order's internal identity, so an order
    /// touched by several rows appears exactly once regardless of how its
    /// external reference was spelled across them.
    pub async fn assemble(
        &self,
        fact: &OrderRowFact,
        supplier: &Supplier,
        order_map: &mut HashMap<Uuid, PurchaseOrder>,
    ) -> Result<()> {
        let (mut order, created) = self
            .resolver
            .resolve_order(supplier, &fact.order_reference)
            .await?;

        // Export dates are applied right after creation, never at creation
        // time, and an existing order's stored dates are left alone.
        if created {
            self.catalog
                .set_order_dates(order.id, fact.order_date, fact.completed_date)
                .await?;
            order.issue_date = fact.order_date;
            order.complete_date = fact.completed_date;
        }

        let supplier_part = self.resolver.resolve_part(supplier, fact).await?;

        let price = unit_price(fact.total_price, fact.quantity);
        match self
            .catalog
            .line_item_by_key(order.id, supplier_part.id, fact.quantity, &fact.currency)
            .await?
        {
            Some(line) => {
                if line.unit_price != price {
                    self.catalog.set_line_unit_price(line.id, price).await?;
                }
            }
            None => {
                debug!(
                    reference = %fact.order_reference,
                    sku = %fact.product_code,
                    quantity = fact.quantity,
                    %price,
                    "creating line item"
                );
                self.catalog
                    .create_line_item(
                        order.id,
                        supplier_part.id,
                        fact.quantity,
                        &fact.currency,
                        price,
                    )
                    .await?;
            }
        }

        order_map.entry(order.id).or_insert(order);
        Ok(())
    }
}
