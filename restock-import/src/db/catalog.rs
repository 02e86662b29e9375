//! SQLite implementation of the catalog and workflow collaborators

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use restock_common::model::{
    LineState, OrderLineItem, OrderState, Part, PurchaseOrder, Supplier, SupplierPart,
};
use restock_common::{Error, Result};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use crate::catalog::{Catalog, OrderWorkflow};

/// SQLite-backed implementation of [`Catalog`] and [`OrderWorkflow`]
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| Error::Corrupt(format!("invalid uuid {raw:?}: {e}")))
}

fn parse_date(raw: Option<String>) -> Result<Option<DateTime<Utc>>> {
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::Corrupt(format!("invalid date {s:?}: {e}")))
    })
    .transpose()
}

fn order_state_to_str(state: OrderState) -> &'static str {
    match state {
        OrderState::Draft => "DRAFT",
        OrderState::Issued => "ISSUED",
        OrderState::Placed => "PLACED",
        OrderState::Received => "RECEIVED",
        OrderState::Completed => "COMPLETED",
    }
}

fn order_state_from_str(raw: &str) -> Result<OrderState> {
    match raw {
        "DRAFT" => Ok(OrderState::Draft),
        "ISSUED" => Ok(OrderState::Issued),
        "PLACED" => Ok(OrderState::Placed),
        "RECEIVED" => Ok(OrderState::Received),
        "COMPLETED" => Ok(OrderState::Completed),
        other => Err(Error::Corrupt(format!("unknown order state {other:?}"))),
    }
}

fn line_state_from_str(raw: &str) -> Result<LineState> {
    match raw {
        "PENDING" => Ok(LineState::Pending),
        "RECEIVED" => Ok(LineState::Received),
        other => Err(Error::Corrupt(format!("unknown line state {other:?}"))),
    }
}

fn order_from_row(row: &SqliteRow) -> Result<PurchaseOrder> {
    Ok(PurchaseOrder {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        supplier_id: parse_uuid(&row.get::<String, _>("supplier_id"))?,
        reference: row.get("reference"),
        state: order_state_from_str(&row.get::<String, _>("state"))?,
        issue_date: parse_date(row.get("issue_date"))?,
        complete_date: parse_date(row.get("complete_date"))?,
    })
}

fn line_from_row(row: &SqliteRow) -> Result<OrderLineItem> {
    let unit_price: String = row.get("unit_price");
    Ok(OrderLineItem {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        order_id: parse_uuid(&row.get::<String, _>("order_id"))?,
        supplier_part_id: parse_uuid(&row.get::<String, _>("supplier_part_id"))?,
        quantity: row.get::<i64, _>("quantity") as u32,
        currency: row.get("currency"),
        unit_price: Decimal::from_str(&unit_price)
            .map_err(|e| Error::Corrupt(format!("invalid unit price {unit_price:?}: {e}")))?,
        state: line_state_from_str(&row.get::<String, _>("state"))?,
    })
}

fn supplier_part_from_row(row: &SqliteRow) -> Result<SupplierPart> {
    Ok(SupplierPart {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        part_id: parse_uuid(&row.get::<String, _>("part_id"))?,
        supplier_id: parse_uuid(&row.get::<String, _>("supplier_id"))?,
        sku: row.get("sku"),
        link: row.get("link"),
    })
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn supplier_by_name(&self, name: &str) -> Result<Option<Supplier>> {
        let row = sqlx::query("SELECT id, name FROM suppliers WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(Supplier {
                id: parse_uuid(&row.get::<String, _>("id"))?,
                name: row.get("name"),
            })
        })
        .transpose()
    }

    async fn create_supplier(&self, name: &str) -> Result<Supplier> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO suppliers (id, name) VALUES (?, ?)")
            .bind(id.to_string())
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(Supplier {
            id,
            name: name.to_string(),
        })
    }

    async fn part_by_natural_key(&self, name: &str, description: &str) -> Result<Option<Part>> {
        let row = sqlx::query("SELECT id, name, description FROM parts WHERE name = ? AND description = ?")
            .bind(name)
            .bind(description)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(Part {
                id: parse_uuid(&row.get::<String, _>("id"))?,
                name: row.get("name"),
                description: row.get("description"),
            })
        })
        .transpose()
    }

    async fn create_part(&self, name: &str, description: &str) -> Result<Part> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO parts (id, name, description) VALUES (?, ?, ?)")
            .bind(id.to_string())
            .bind(name)
            .bind(description)
            .execute(&self.pool)
            .await?;

        Ok(Part {
            id,
            name: name.to_string(),
            description: description.to_string(),
        })
    }

    async fn supplier_part_by_sku(
        &self,
        supplier_id: Uuid,
        sku: &str,
    ) -> Result<Option<SupplierPart>> {
        let row = sqlx::query(
            "SELECT id, part_id, supplier_id, sku, link FROM supplier_parts
             WHERE supplier_id = ? AND sku = ?",
        )
        .bind(supplier_id.to_string())
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| supplier_part_from_row(&row)).transpose()
    }

    async fn create_supplier_part(
        &self,
        part_id: Uuid,
        supplier_id: Uuid,
        sku: &str,
        link: &str,
    ) -> Result<SupplierPart> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO supplier_parts (id, part_id, supplier_id, sku, link)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(part_id.to_string())
        .bind(supplier_id.to_string())
        .bind(sku)
        .bind(link)
        .execute(&self.pool)
        .await?;

        Ok(SupplierPart {
            id,
            part_id,
            supplier_id,
            sku: sku.to_string(),
            link: link.to_string(),
        })
    }

    async fn order_by_reference(
        &self,
        supplier_id: Uuid,
        reference: &str,
    ) -> Result<Option<PurchaseOrder>> {
        let row = sqlx::query(
            "SELECT id, supplier_id, reference, state, issue_date, complete_date
             FROM purchase_orders WHERE supplier_id = ? AND reference = ?",
        )
        .bind(supplier_id.to_string())
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| order_from_row(&row)).transpose()
    }

    async fn order_by_id(&self, order_id: Uuid) -> Result<Option<PurchaseOrder>> {
        let row = sqlx::query(
            "SELECT id, supplier_id, reference, state, issue_date, complete_date
             FROM purchase_orders WHERE id = ?",
        )
        .bind(order_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| order_from_row(&row)).transpose()
    }

    async fn create_order(&self, supplier_id: Uuid, reference: &str) -> Result<PurchaseOrder> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO purchase_orders (id, supplier_id, reference, state)
             VALUES (?, ?, ?, 'DRAFT')",
        )
        .bind(id.to_string())
        .bind(supplier_id.to_string())
        .bind(reference)
        .execute(&self.pool)
        .await?;

        Ok(PurchaseOrder {
            id,
            supplier_id,
            reference: reference.to_string(),
            state: OrderState::Draft,
            issue_date: None,
            complete_date: None,
        })
    }

    async fn set_order_dates(
        &self,
        order_id: Uuid,
        issue_date: Option<DateTime<Utc>>,
        complete_date: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE purchase_orders SET issue_date = ?, complete_date = ? WHERE id = ?",
        )
        .bind(issue_date.map(|dt| dt.to_rfc3339()))
        .bind(complete_date.map(|dt| dt.to_rfc3339()))
        .bind(order_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("order {order_id}")));
        }
        Ok(())
    }

    async fn line_item_by_key(
        &self,
        order_id: Uuid,
        supplier_part_id: Uuid,
        quantity: u32,
        currency: &str,
    ) -> Result<Option<OrderLineItem>> {
        let row = sqlx::query(
            "SELECT id, order_id, supplier_part_id, quantity, currency, unit_price, state
             FROM order_lines
             WHERE order_id = ? AND supplier_part_id = ? AND quantity = ? AND currency = ?",
        )
        .bind(order_id.to_string())
        .bind(supplier_part_id.to_string())
        .bind(i64::from(quantity))
        .bind(currency)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| line_from_row(&row)).transpose()
    }

    async fn create_line_item(
        &self,
        order_id: Uuid,
        supplier_part_id: Uuid,
        quantity: u32,
        currency: &str,
        unit_price: Decimal,
    ) -> Result<OrderLineItem> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO order_lines (id, order_id, supplier_part_id, quantity, currency, unit_price, state)
             VALUES (?, ?, ?, ?, ?, ?, 'PENDING')",
        )
        .bind(id.to_string())
        .bind(order_id.to_string())
        .bind(supplier_part_id.to_string())
        .bind(i64::from(quantity))
        .bind(currency)
        .bind(unit_price.to_string())
        .execute(&self.pool)
        .await?;

        Ok(OrderLineItem {
            id,
            order_id,
            supplier_part_id,
            quantity,
            currency: currency.to_string(),
            unit_price,
            state: LineState::Pending,
        })
    }

    async fn set_line_unit_price(&self, line_id: Uuid, unit_price: Decimal) -> Result<()> {
        let result = sqlx::query("UPDATE order_lines SET unit_price = ? WHERE id = ?")
            .bind(unit_price.to_string())
            .bind(line_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("line item {line_id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderWorkflow for SqliteCatalog {
    async fn place_order(&self, order_id: Uuid) -> Result<()> {
        let order = self
            .order_by_id(order_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("order {order_id}")))?;

        if order.state != OrderState::Draft {
            return Err(Error::Workflow(format!(
                "cannot place order {} in state {:?}",
                order.reference, order.state
            )));
        }

        let line_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM order_lines WHERE order_id = ?")
                .bind(order_id.to_string())
                .fetch_one(&self.pool)
                .await?;
        if line_count == 0 {
            return Err(Error::Workflow(format!(
                "cannot place order {} without line items",
                order.reference
            )));
        }

        // Host behavior: placement stamps "now"
        sqlx::query("UPDATE purchase_orders SET state = ?, issue_date = ? WHERE id = ?")
            .bind(order_state_to_str(OrderState::Placed))
            .bind(Utc::now().to_rfc3339())
            .bind(order_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn pending_line_items(&self, order_id: Uuid) -> Result<Vec<OrderLineItem>> {
        let rows = sqlx::query(
            "SELECT id, order_id, supplier_part_id, quantity, currency, unit_price, state
             FROM order_lines WHERE order_id = ? AND state = 'PENDING'",
        )
        .bind(order_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(line_from_row).collect()
    }

    async fn receive_line_item(
        &self,
        line_id: Uuid,
        location: Option<&str>,
        quantity: u32,
        user: &str,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let state: Option<String> =
            sqlx::query_scalar("SELECT state FROM order_lines WHERE id = ?")
                .bind(line_id.to_string())
                .fetch_optional(&mut *tx)
                .await?;
        match state.as_deref() {
            None => return Err(Error::NotFound(format!("line item {line_id}"))),
            Some("PENDING") => {}
            Some(_) => {
                return Err(Error::Workflow(format!(
                    "line item {line_id} is not pending"
                )))
            }
        }

        sqlx::query("UPDATE order_lines SET state = 'RECEIVED' WHERE id = ?")
            .bind(line_id.to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO stock_receipts (id, line_item_id, location, quantity, received_by, received_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(line_id.to_string())
        .bind(location)
        .bind(i64::from(quantity))
        .bind(user)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn complete_order(&self, order_id: Uuid) -> Result<()> {
        let order = self
            .order_by_id(order_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("order {order_id}")))?;

        if order.state != OrderState::Placed {
            return Err(Error::Workflow(format!(
                "cannot complete order {} in state {:?}",
                order.reference, order.state
            )));
        }

        let pending: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM order_lines WHERE order_id = ? AND state = 'PENDING'",
        )
        .bind(order_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        if pending > 0 {
            return Err(Error::Workflow(format!(
                "cannot complete order {} with pending line items",
                order.reference
            )));
        }

        // Host behavior: completion stamps "now"
        sqlx::query("UPDATE purchase_orders SET state = ?, complete_date = ? WHERE id = ?")
            .bind(order_state_to_str(OrderState::Completed))
            .bind(Utc::now().to_rfc3339())
            .bind(order_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
