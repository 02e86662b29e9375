//! In-memory catalog backend
//!
//! A natural-key registry holding every entity type in plain vectors behind
//! one mutex. Used by tests and as the CLI's default backend when no
//! database path is given. Implements both collaborator traits, including
//! the host's date-stamping behavior on lifecycle transitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use restock_common::model::{
    LineState, OrderLineItem, OrderState, Part, PurchaseOrder, StockReceipt, Supplier,
    SupplierPart,
};
use restock_common::{Error, Result};
use rust_decimal::Decimal;
use std::sync::Mutex;
use uuid::Uuid;

use super::{Catalog, OrderWorkflow};

#[derive(Debug, Default)]
struct State {
    suppliers: Vec<Supplier>,
    parts: Vec<Part>,
    supplier_parts: Vec<SupplierPart>,
    orders: Vec<PurchaseOrder>,
    lines: Vec<OrderLineItem>,
    receipts: Vec<StockReceipt>,
}

/// Entity counts, for idempotence verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCounts {
    pub suppliers: usize,
    pub parts: usize,
    pub supplier_parts: usize,
    pub orders: usize,
    pub line_items: usize,
    pub stock_receipts: usize,
}

/// In-memory implementation of [`Catalog`] and [`OrderWorkflow`]
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: Mutex<State>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entity counts across all registries
    pub fn counts(&self) -> CatalogCounts {
        let state = self.state.lock().unwrap();
        CatalogCounts {
            suppliers: state.suppliers.len(),
            parts: state.parts.len(),
            supplier_parts: state.supplier_parts.len(),
            orders: state.orders.len(),
            line_items: state.lines.len(),
            stock_receipts: state.receipts.len(),
        }
    }

    /// Snapshot of all purchase orders
    pub fn orders(&self) -> Vec<PurchaseOrder> {
        self.state.lock().unwrap().orders.clone()
    }

    /// Snapshot of all line items
    pub fn line_items(&self) -> Vec<OrderLineItem> {
        self.state.lock().unwrap().lines.clone()
    }

    /// Snapshot of all supplier parts
    pub fn supplier_parts(&self) -> Vec<SupplierPart> {
        self.state.lock().unwrap().supplier_parts.clone()
    }

    /// Snapshot of all stock receipts
    pub fn stock_receipts(&self) -> Vec<StockReceipt> {
        self.state.lock().unwrap().receipts.clone()
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn supplier_by_name(&self, name: &str) -> Result<Option<Supplier>> {
        let state = self.state.lock().unwrap();
        Ok(state.suppliers.iter().find(|s| s.name == name).cloned())
    }

    async fn create_supplier(&self, name: &str) -> Result<Supplier> {
        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.state.lock().unwrap().suppliers.push(supplier.clone());
        Ok(supplier)
    }

    async fn part_by_natural_key(&self, name: &str, description: &str) -> Result<Option<Part>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .parts
            .iter()
            .find(|p| p.name == name && p.description == description)
            .cloned())
    }

    async fn create_part(&self, name: &str, description: &str) -> Result<Part> {
        let part = Part {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
        };
        self.state.lock().unwrap().parts.push(part.clone());
        Ok(part)
    }

    async fn supplier_part_by_sku(
        &self,
        supplier_id: Uuid,
        sku: &str,
    ) -> Result<Option<SupplierPart>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .supplier_parts
            .iter()
            .find(|sp| sp.supplier_id == supplier_id && sp.sku == sku)
            .cloned())
    }

    async fn create_supplier_part(
        &self,
        part_id: Uuid,
        supplier_id: Uuid,
        sku: &str,
        link: &str,
    ) -> Result<SupplierPart> {
        let supplier_part = SupplierPart {
            id: Uuid::new_v4(),
            part_id,
            supplier_id,
            sku: sku.to_string(),
            link: link.to_string(),
        };
        self.state
            .lock()
            .unwrap()
            .supplier_parts
            .push(supplier_part.clone());
        Ok(supplier_part)
    }

    async fn order_by_reference(
        &self,
        supplier_id: Uuid,
        reference: &str,
    ) -> Result<Option<PurchaseOrder>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .iter()
            .find(|o| o.supplier_id == supplier_id && o.reference == reference)
            .cloned())
    }

    async fn order_by_id(&self, order_id: Uuid) -> Result<Option<PurchaseOrder>> {
        let state = self.state.lock().unwrap();
        Ok(state.orders.iter().find(|o| o.id == order_id).cloned())
    }

    async fn create_order(&self, supplier_id: Uuid, reference: &str) -> Result<PurchaseOrder> {
        let order = PurchaseOrder {
            id: Uuid::new_v4(),
            supplier_id,
            reference: reference.to_string(),
            state: OrderState::Draft,
            issue_date: None,
            complete_date: None,
        };
        self.state.lock().unwrap().orders.push(order.clone());
        Ok(order)
    }

    async fn set_order_dates(
        &self,
        order_id: Uuid,
        issue_date: Option<DateTime<Utc>>,
        complete_date: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| Error::NotFound(format!("order {order_id}")))?;
        order.issue_date = issue_date;
        order.complete_date = complete_date;
        Ok(())
    }

    async fn line_item_by_key(
        &self,
        order_id: Uuid,
        supplier_part_id: Uuid,
        quantity: u32,
        currency: &str,
    ) -> Result<Option<OrderLineItem>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .lines
            .iter()
            .find(|l| {
                l.order_id == order_id
                    && l.supplier_part_id == supplier_part_id
                    && l.quantity == quantity
                    && l.currency == currency
            })
            .cloned())
    }

    async fn create_line_item(
        &self,
        order_id: Uuid,
        supplier_part_id: Uuid,
        quantity: u32,
        currency: &str,
        unit_price: Decimal,
    ) -> Result<OrderLineItem> {
        let line = OrderLineItem {
            id: Uuid::new_v4(),
            order_id,
            supplier_part_id,
            quantity,
            currency: currency.to_string(),
            unit_price,
            state: LineState::Pending,
        };
        self.state.lock().unwrap().lines.push(line.clone());
        Ok(line)
    }

    async fn set_line_unit_price(&self, line_id: Uuid, unit_price: Decimal) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let line = state
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| Error::NotFound(format!("line item {line_id}")))?;
        line.unit_price = unit_price;
        Ok(())
    }
}

#[async_trait]
impl OrderWorkflow for MemoryCatalog {
    async fn place_order(&self, order_id: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let has_lines = state.lines.iter().any(|l| l.order_id == order_id);
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| Error::NotFound(format!("order {order_id}")))?;

        if order.state != OrderState::Draft {
            return Err(Error::Workflow(format!(
                "cannot place order {} in state {:?}",
                order.reference, order.state
            )));
        }
        if !has_lines {
            return Err(Error::Workflow(format!(
                "cannot place order {} without line items",
                order.reference
            )));
        }

        order.state = OrderState::Placed;
        // Host behavior: placement stamps "now"
        order.issue_date = Some(Utc::now());
        Ok(())
    }

    async fn pending_line_items(&self, order_id: Uuid) -> Result<Vec<OrderLineItem>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .lines
            .iter()
            .filter(|l| l.order_id == order_id && l.state == LineState::Pending)
            .cloned()
            .collect())
    }

    async fn receive_line_item(
        &self,
        line_id: Uuid,
        location: Option<&str>,
        quantity: u32,
        user: &str,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let line = state
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| Error::NotFound(format!("line item {line_id}")))?;

        if line.state != LineState::Pending {
            return Err(Error::Workflow(format!(
                "line item {line_id} is not pending"
            )));
        }

        line.state = LineState::Received;
        state.receipts.push(StockReceipt {
            id: Uuid::new_v4(),
            line_item_id: line_id,
            location: location.map(str::to_string),
            quantity,
            received_by: user.to_string(),
            received_at: Utc::now(),
        });
        Ok(())
    }

    async fn complete_order(&self, order_id: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let pending = state
            .lines
            .iter()
            .any(|l| l.order_id == order_id && l.state == LineState::Pending);
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| Error::NotFound(format!("order {order_id}")))?;

        if order.state != OrderState::Placed {
            return Err(Error::Workflow(format!(
                "cannot complete order {} in state {:?}",
                order.reference, order.state
            )));
        }
        if pending {
            return Err(Error::Workflow(format!(
                "cannot complete order {} with pending line items",
                order.reference
            )));
        }

        order.state = OrderState::Completed;
        // Host behavior: completion stamps "now"
        order.complete_date = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn place_requires_draft_state_and_lines() {
        let catalog = MemoryCatalog::new();
        let supplier = catalog.create_supplier("Amazon").await.unwrap();
        let order = catalog.create_order(supplier.id, "301-1").await.unwrap();

        // No line items yet
        let err = catalog.place_order(order.id).await.unwrap_err();
        assert!(matches!(err, Error::Workflow(_)));
        assert!(err.to_string().contains("without line items"));

        let part = catalog.create_part("Widget", "").await.unwrap();
        let sp = catalog
            .create_supplier_part(part.id, supplier.id, "B000", "https://x/dp/B000")
            .await
            .unwrap();
        catalog
            .create_line_item(order.id, sp.id, 1, "EUR", Decimal::ONE)
            .await
            .unwrap();

        catalog.place_order(order.id).await.unwrap();
        let placed = catalog.order_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(placed.state, OrderState::Placed);
        assert!(placed.issue_date.is_some(), "placement stamps now");

        // Placing twice violates the lifecycle
        assert!(catalog.place_order(order.id).await.is_err());
    }

    #[tokio::test]
    async fn complete_requires_all_lines_received() {
        let catalog = MemoryCatalog::new();
        let supplier = catalog.create_supplier("Amazon").await.unwrap();
        let order = catalog.create_order(supplier.id, "301-2").await.unwrap();
        let part = catalog.create_part("Widget", "").await.unwrap();
        let sp = catalog
            .create_supplier_part(part.id, supplier.id, "B001", "https://x/dp/B001")
            .await
            .unwrap();
        let line = catalog
            .create_line_item(order.id, sp.id, 3, "EUR", Decimal::ONE)
            .await
            .unwrap();

        catalog.place_order(order.id).await.unwrap();

        let err = catalog.complete_order(order.id).await.unwrap_err();
        assert!(err.to_string().contains("pending line items"));

        catalog
            .receive_line_item(line.id, Some("Bin 4"), 3, "alice")
            .await
            .unwrap();
        catalog.complete_order(order.id).await.unwrap();

        let done = catalog.order_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(done.state, OrderState::Completed);

        let receipts = catalog.stock_receipts();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].received_by, "alice");
        assert_eq!(receipts[0].location.as_deref(), Some("Bin 4"));
        assert_eq!(receipts[0].quantity, 3);
    }
}
