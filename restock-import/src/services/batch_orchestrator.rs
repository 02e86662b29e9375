//! Batch orchestration
//!
//! Drives the parse phase: every row runs through the parser and assembler
//! before any lifecycle transition happens, so an order whose rows are
//! scattered through the file is never placed on partial line data.
//!
//! Row failures are isolated: a rejected row is counted and logged, and the
//! batch moves on. Cancellation is checked between rows; a cancelled batch
//! hands back no order map, so nothing reaches the lifecycle phase
//! half-built.

use restock_common::model::{PurchaseOrder, Supplier};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::ImportConfig;
use crate::models::{BatchStats, RejectedRow};
use crate::services::order_assembler::OrderAssembler;
use crate::services::row_parser::RowParser;

/// Result of one parse phase
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Distinct orders touched by this batch, keyed by internal identity
    pub order_map: HashMap<Uuid, PurchaseOrder>,
    pub stats: BatchStats,
    /// True when cancellation stopped the batch before all rows ran
    pub cancelled: bool,
}

/// Batch orchestrator over a catalog collaborator
pub struct BatchOrchestrator<'a, C: Catalog + ?Sized> {
    parser: RowParser,
    assembler: OrderAssembler<'a, C>,
}

impl<'a, C: Catalog + ?Sized> BatchOrchestrator<'a, C> {
    pub fn new(catalog: &'a C, config: &ImportConfig) -> Self {
        Self {
            parser: RowParser::new(config),
            assembler: OrderAssembler::new(catalog),
        }
    }

    /// Run the parse phase over all records
    pub async fn run(
        &self,
        records: &[csv::StringRecord],
        supplier: &Supplier,
        cancel: &CancellationToken,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for (row, record) in records.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!("batch cancelled at row {row}, discarding order map");
                outcome.cancelled = true;
                outcome.order_map.clear();
                break;
            }

            let parsed = match self.parser.parse(row, record) {
                Ok(None) => continue, // header
                Ok(Some(parsed)) => {
                    outcome.stats.rows_seen += 1;
                    parsed
                }
                Err(e) => {
                    outcome.stats.rows_seen += 1;
                    warn!(row, error = %e, "row rejected");
                    outcome.stats.rejected.push(RejectedRow {
                        row,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            for warning in &parsed.warnings {
                warn!(row = warning.row, field = warning.field, "{}", warning.message);
                outcome.stats.date_warnings += 1;
            }

            match self
                .assembler
                .assemble(&parsed.fact, supplier, &mut outcome.order_map)
                .await
            {
                Ok(()) => outcome.stats.accepted += 1,
                Err(e) => {
                    warn!(row, error = %e, "row rejected during assembly");
                    outcome.stats.rejected.push(RejectedRow {
                        row,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!("Processed {}", outcome.stats.display_string());
        outcome
    }
}
