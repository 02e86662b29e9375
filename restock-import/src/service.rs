//! Import service facade
//!
//! One [`OrderImportService`] owns the collaborators and the per-supplier
//! locks, and exposes the invocation contract: decode the payload, extract
//! the CSV, run the parse phase over every row, then advance each distinct
//! order's lifecycle.
//!
//! Identity resolution reads then creates without store-level isolation, so
//! two interleaved batches against the same supplier could race into
//! duplicate entities. Each invocation therefore holds an exclusive
//! per-supplier lock for parsing plus lifecycle advancement; the lock guard
//! is dropped unconditionally on every exit path.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::archive;
use crate::catalog::{Catalog, OrderWorkflow};
use crate::config::ImportConfig;
use crate::error::ImportResult;
use crate::models::{ImportOutcome, ImportReport};
use crate::services::{BatchOrchestrator, IdentityResolver, LifecycleDriver};

/// Order-history import service
pub struct OrderImportService<C, W> {
    catalog: Arc<C>,
    workflow: Arc<W>,
    config: ImportConfig,
    /// One lock per supplier name, held for the duration of a batch
    supplier_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<C, W> OrderImportService<C, W>
where
    C: Catalog,
    W: OrderWorkflow,
{
    pub fn new(catalog: Arc<C>, workflow: Arc<W>, config: ImportConfig) -> Self {
        Self {
            catalog,
            workflow,
            config,
            supplier_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Import a base64-encoded export archive
    pub async fn import_orders(
        &self,
        payload_b64: &str,
        acting_user: &str,
        default_location: Option<&str>,
        cancel: &CancellationToken,
    ) -> ImportResult<ImportReport> {
        let bytes = archive::decode_payload(payload_b64)?;
        self.import_archive(&bytes, acting_user, default_location, cancel)
            .await
    }

    /// Import a raw export archive
    pub async fn import_archive(
        &self,
        bytes: &[u8],
        acting_user: &str,
        default_location: Option<&str>,
        cancel: &CancellationToken,
    ) -> ImportResult<ImportReport> {
        let _guard = self.lock_supplier(&self.config.supplier_name).await;

        // Archive problems are fatal; nothing has been touched yet
        let records = archive::read_order_history(bytes, &self.config.archive_entry)?;
        info!(
            supplier = %self.config.supplier_name,
            records = records.len(),
            "starting order-history import"
        );

        let resolver = IdentityResolver::new(self.catalog.as_ref());
        let supplier = resolver.resolve_supplier(&self.config.supplier_name).await?;

        let orchestrator = BatchOrchestrator::new(self.catalog.as_ref(), &self.config);
        let batch = orchestrator.run(&records, &supplier, cancel).await;

        if batch.cancelled {
            return Ok(ImportReport {
                outcome: ImportOutcome::Cancelled,
                stats: batch.stats,
                orders_touched: 0,
                orders_completed: 0,
                lifecycle_failures: Vec::new(),
            });
        }

        let orders_touched = batch.order_map.len();
        let driver = LifecycleDriver::new(
            self.catalog.as_ref(),
            self.workflow.as_ref(),
            acting_user,
            default_location,
        );
        let lifecycle = driver.advance_all(&batch.order_map, cancel).await;

        let report = ImportReport {
            outcome: if lifecycle.cancelled {
                ImportOutcome::Cancelled
            } else {
                ImportOutcome::Completed
            },
            stats: batch.stats,
            orders_touched,
            orders_completed: lifecycle.completed,
            lifecycle_failures: lifecycle.failures,
        };

        info!("Import finished: {}", report.display_string());
        Ok(report)
    }

    /// Acquire the exclusive lock for one supplier
    async fn lock_supplier(&self, supplier_name: &str) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.supplier_locks.lock().await;
            locks
                .entry(supplier_name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
