//! Purchase order lifecycle driver
//!
//! After a batch is fully parsed, each distinct order is advanced through
//! place → receive-all-lines → complete. The host workflow stamps
//! wall-clock dates on placement and completion, so the driver re-applies
//! the export-supplied dates immediately after each transition.
//!
//! The driver advances from whatever state the order is currently in:
//! already-completed orders are skipped, orders left half-advanced by an
//! earlier failed batch pick up where they stopped. This is what makes a
//! re-import converge instead of tripping over its own previous run.
//!
//! Orders are processed independently; a failure while advancing one order
//! is recorded and does not block the others.

use restock_common::model::{OrderState, PurchaseOrder};
use restock_common::{Error, Result};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{Catalog, OrderWorkflow};
use crate::error::{ImportError, ImportResult};
use crate::models::LifecycleFailure;

/// Result of advancing one batch's orders
#[derive(Debug, Default)]
pub struct LifecycleOutcome {
    /// Orders that reached (or already held) the completed state
    pub completed: usize,
    /// Orders left short of completed
    pub failures: Vec<LifecycleFailure>,
    /// True when cancellation stopped the phase before all orders ran
    pub cancelled: bool,
}

/// Lifecycle driver over the workflow and catalog collaborators
pub struct LifecycleDriver<'a, C: Catalog + ?Sized, W: OrderWorkflow + ?Sized> {
    catalog: &'a C,
    workflow: &'a W,
    acting_user: &'a str,
    default_location: Option<&'a str>,
}

impl<'a, C: Catalog + ?Sized, W: OrderWorkflow + ?Sized> LifecycleDriver<'a, C, W> {
    pub fn new(
        catalog: &'a C,
        workflow: &'a W,
        acting_user: &'a str,
        default_location: Option<&'a str>,
    ) -> Self {
        Self {
            catalog,
            workflow,
            acting_user,
            default_location,
        }
    }

    /// Advance every order in the batch, isolating per-order failures
    pub async fn advance_all(
        &self,
        order_map: &HashMap<Uuid, PurchaseOrder>,
        cancel: &CancellationToken,
    ) -> LifecycleOutcome {
        let mut outcome = LifecycleOutcome::default();

        for order in order_map.values() {
            if cancel.is_cancelled() {
                warn!("lifecycle phase cancelled, stopping before next order");
                outcome.cancelled = true;
                break;
            }

            match self.advance(order).await {
                Ok(()) => outcome.completed += 1,
                Err(e) => {
                    warn!(reference = %order.reference, error = %e, "lifecycle advancement failed");
                    let failure = match e {
                        ImportError::Lifecycle { reference, reason } => {
                            LifecycleFailure { reference, reason }
                        }
                        other => LifecycleFailure {
                            reference: order.reference.clone(),
                            reason: other.to_string(),
                        },
                    };
                    outcome.failures.push(failure);
                }
            }
        }

        info!(
            "Lifecycle phase finished: {} completed, {} failures",
            outcome.completed,
            outcome.failures.len()
        );
        outcome
    }

    /// Advance one order from its current state to completed
    ///
    /// Any collaborator failure along the way is wrapped as
    /// [`ImportError::Lifecycle`], carrying the order's external reference.
    async fn advance(&self, order: &PurchaseOrder) -> ImportResult<()> {
        self.apply_transitions(order)
            .await
            .map_err(|e| ImportError::Lifecycle {
                reference: order.reference.clone(),
                reason: e.to_string(),
            })
    }

    async fn apply_transitions(&self, order: &PurchaseOrder) -> Result<()> {
        let current = self
            .catalog
            .order_by_id(order.id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("order {}", order.reference)))?;

        if current.state == OrderState::Completed {
            debug!(reference = %order.reference, "order already completed, skipping");
            return Ok(());
        }

        if current.state == OrderState::Draft {
            self.workflow.place_order(order.id).await?;
            // Placement stamped "now"; restore the export's issue date
            self.catalog
                .set_order_dates(order.id, order.issue_date, order.complete_date)
                .await?;
        }

        for line in self.workflow.pending_line_items(order.id).await? {
            self.workflow
                .receive_line_item(
                    line.id,
                    self.default_location,
                    line.quantity,
                    self.acting_user,
                )
                .await?;
        }

        self.workflow.complete_order(order.id).await?;
        // Completion stamped "now"; restore the export's completion date
        self.catalog
            .set_order_dates(order.id, order.issue_date, order.complete_date)
            .await?;

        debug!(reference = %order.reference, "order completed");
        Ok(())
    }
}
