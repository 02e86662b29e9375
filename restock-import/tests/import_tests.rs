//! End-to-end import tests against the in-memory catalog
//!
//! Each test builds a real export archive, runs it through the full
//! service (archive intake, parsing, assembly, lifecycle), and inspects
//! the resulting catalog state.

mod helpers;

use std::sync::Arc;

use base64::Engine as _;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;

use restock_common::model::OrderState;
use restock_import::catalog::{Catalog, MemoryCatalog};
use restock_import::config::ImportConfig;
use restock_import::models::ImportOutcome;
use restock_import::{ImportError, OrderImportService};

fn service(
    catalog: Arc<MemoryCatalog>,
) -> OrderImportService<MemoryCatalog, MemoryCatalog> {
    OrderImportService::new(catalog.clone(), catalog, ImportConfig::default())
}

async fn import(
    service: &OrderImportService<MemoryCatalog, MemoryCatalog>,
    archive: &[u8],
) -> restock_import::models::ImportReport {
    service
        .import_archive(archive, "importer", Some("Inbound"), &CancellationToken::new())
        .await
        .unwrap()
}

#[tokio::test]
async fn full_import_completes_orders_and_preserves_dates() {
    let catalog = Arc::new(MemoryCatalog::new());
    let service = service(catalog.clone());

    let archive = helpers::export_archive(&[
        helpers::simple_row("302-0000001", "B07A", "2", "19.98"),
        helpers::simple_row("302-0000002", "B07B", "1", "5.00"),
    ]);

    let report = import(&service, &archive).await;
    assert_eq!(report.outcome, ImportOutcome::Completed);
    assert_eq!(report.stats.rows_seen, 2);
    assert_eq!(report.stats.accepted, 2);
    assert!(report.stats.rejected.is_empty());
    assert_eq!(report.orders_touched, 2);
    assert_eq!(report.orders_completed, 2);
    assert!(report.lifecycle_failures.is_empty());

    let orders = catalog.orders();
    assert_eq!(orders.len(), 2);
    let issue = Utc.with_ymd_and_hms(2023, 6, 1, 10, 30, 0).unwrap();
    let complete = Utc.with_ymd_and_hms(2023, 6, 3, 8, 0, 0).unwrap();
    for order in &orders {
        assert_eq!(order.state, OrderState::Completed);
        // Export dates survive the workflow's wall-clock stamping
        assert_eq!(order.issue_date, Some(issue));
        assert_eq!(order.complete_date, Some(complete));
    }
}

#[tokio::test]
async fn reimport_converges_on_the_same_catalog_state() {
    let catalog = Arc::new(MemoryCatalog::new());
    let service = service(catalog.clone());

    let archive = helpers::export_archive(&[
        helpers::simple_row("302-0000001", "B07A", "2", "19.98"),
        helpers::simple_row("302-0000002", "B07B", "1", "5.00"),
    ]);

    import(&service, &archive).await;
    let counts_after_first = catalog.counts();

    let second = import(&service, &archive).await;
    assert_eq!(second.outcome, ImportOutcome::Completed);
    assert_eq!(second.orders_touched, 2);
    // Already-completed orders count as completed, not as failures
    assert_eq!(second.orders_completed, 2);
    assert!(second.lifecycle_failures.is_empty());

    assert_eq!(catalog.counts(), counts_after_first);
}

#[tokio::test]
async fn order_without_export_dates_still_completes() {
    let catalog = Arc::new(MemoryCatalog::new());
    let service = service(catalog.clone());

    let archive = helpers::export_archive(&[helpers::row(
        "302-0000003",
        "",
        "",
        "EUR",
        "5.00",
        "B07C",
        "1",
        "Widget",
    )]);

    let report = import(&service, &archive).await;
    assert_eq!(report.orders_completed, 1);
    assert_eq!(report.stats.date_warnings, 0, "empty dates are not warnings");

    let order = &catalog.orders()[0];
    assert_eq!(order.state, OrderState::Completed);
    assert_eq!(order.issue_date, None);
    assert_eq!(order.complete_date, None);
}

#[tokio::test]
async fn unparsable_date_degrades_with_a_warning() {
    let catalog = Arc::new(MemoryCatalog::new());
    let service = service(catalog.clone());

    let archive = helpers::export_archive(&[helpers::row(
        "302-0000004",
        "sometime in June",
        "2023-06-03T08:00:00Z",
        "EUR",
        "5.00",
        "B07D",
        "1",
        "Widget",
    )]);

    let report = import(&service, &archive).await;
    assert_eq!(report.stats.accepted, 1);
    assert_eq!(report.stats.date_warnings, 1);
    assert_eq!(report.orders_completed, 1);

    let order = &catalog.orders()[0];
    assert_eq!(order.issue_date, None);
    assert!(order.complete_date.is_some());
}

#[tokio::test]
async fn malformed_row_is_rejected_without_sinking_the_batch() {
    let catalog = Arc::new(MemoryCatalog::new());
    let service = service(catalog.clone());

    let archive = helpers::export_archive(&[
        helpers::simple_row("302-0000005", "B07E", "two", "5.00"),
        helpers::simple_row("302-0000006", "B07F", "1", "5.00"),
    ]);

    let report = import(&service, &archive).await;
    assert_eq!(report.stats.rows_seen, 2);
    assert_eq!(report.stats.accepted, 1);
    assert_eq!(report.stats.rejected.len(), 1);
    assert_eq!(report.stats.rejected[0].row, 1);
    assert!(report.stats.rejected[0].reason.contains("quantity"));
    assert_eq!(report.orders_completed, 1);

    // The rejected row created nothing
    assert_eq!(catalog.counts().orders, 1);
}

#[tokio::test]
async fn zero_quantity_line_uses_total_as_unit_price() {
    let catalog = Arc::new(MemoryCatalog::new());
    let service = service(catalog.clone());

    let archive = helpers::export_archive(&[helpers::simple_row(
        "302-0000007",
        "B07G",
        "0",
        "9.99",
    )]);

    let report = import(&service, &archive).await;
    assert_eq!(report.orders_completed, 1);

    let lines = catalog.line_items();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 0);
    assert_eq!(lines[0].unit_price, Decimal::from_str("9.99").unwrap());
}

#[tokio::test]
async fn two_skus_in_one_order_become_two_lines() {
    let catalog = Arc::new(MemoryCatalog::new());
    let service = service(catalog.clone());

    let archive = helpers::export_archive(&[
        helpers::simple_row("302-0000008", "B07H", "1", "5.00"),
        helpers::simple_row("302-0000008", "B07I", "3", "30.00"),
    ]);

    let report = import(&service, &archive).await;
    assert_eq!(report.orders_touched, 1);
    assert_eq!(report.orders_completed, 1);

    let counts = catalog.counts();
    assert_eq!(counts.orders, 1);
    assert_eq!(counts.line_items, 2);
    assert_eq!(counts.supplier_parts, 2);
    assert_eq!(counts.stock_receipts, 2);
}

#[tokio::test]
async fn same_sku_across_orders_shares_one_supplier_part() {
    let catalog = Arc::new(MemoryCatalog::new());
    let service = service(catalog.clone());

    let archive = helpers::export_archive(&[
        helpers::simple_row("302-0000009", "B07J", "1", "5.00"),
        helpers::simple_row("302-0000010", "B07J", "2", "10.00"),
    ]);

    import(&service, &archive).await;

    let counts = catalog.counts();
    assert_eq!(counts.orders, 2);
    assert_eq!(counts.supplier_parts, 1);
    assert_eq!(counts.parts, 1);

    let sp = &catalog.supplier_parts()[0];
    assert_eq!(sp.sku, "B07J");
    assert_eq!(sp.link, format!("https://{}/dp/B07J", helpers::DOMAIN));
}

#[tokio::test]
async fn long_title_is_truncated_into_name_and_description() {
    let catalog = Arc::new(MemoryCatalog::new());
    let service = service(catalog.clone());

    let title = "A remarkably long product title that will not fit in the catalog name field at all";
    let archive = helpers::export_archive(&[helpers::row(
        "302-0000011",
        "2023-06-01T10:30:00Z",
        "",
        "EUR",
        "5.00",
        "B07K",
        "1",
        title,
    )]);

    import(&service, &archive).await;

    let sp = &catalog.supplier_parts()[0];
    let part = catalog
        .part_by_natural_key(
            &format!("{}..", &title.chars().take(50).collect::<String>()),
            title,
        )
        .await
        .unwrap();
    assert!(part.is_some());
    assert_eq!(part.unwrap().id, sp.part_id);
}

#[tokio::test]
async fn missing_manifest_entry_is_fatal() {
    let catalog = Arc::new(MemoryCatalog::new());
    let service = service(catalog.clone());

    let archive = helpers::export_archive_at(
        "Somewhere/else.csv",
        &[helpers::simple_row("302-0000012", "B07L", "1", "5.00")],
    );

    let err = service
        .import_archive(&archive, "importer", None, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Archive(_)));
    assert_eq!(catalog.counts().suppliers, 0, "fatal errors touch nothing");
}

#[tokio::test]
async fn corrupt_base64_payload_is_fatal() {
    let catalog = Arc::new(MemoryCatalog::new());
    let service = service(catalog.clone());

    let err = service
        .import_orders("%%% not base64 %%%", "importer", None, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Archive(_)));
}

#[tokio::test]
async fn base64_entry_point_imports_the_archive() {
    let catalog = Arc::new(MemoryCatalog::new());
    let service = service(catalog.clone());

    let archive = helpers::export_archive(&[helpers::simple_row(
        "302-0000013",
        "B07M",
        "1",
        "5.00",
    )]);
    let encoded = base64::engine::general_purpose::STANDARD.encode(&archive);

    let report = service
        .import_orders(&encoded, "importer", None, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.outcome, ImportOutcome::Completed);
    assert_eq!(report.orders_completed, 1);
}

#[tokio::test]
async fn cancelled_token_stops_before_any_order_is_assembled() {
    let catalog = Arc::new(MemoryCatalog::new());
    let service = service(catalog.clone());

    let archive = helpers::export_archive(&[helpers::simple_row(
        "302-0000014",
        "B07N",
        "1",
        "5.00",
    )]);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = service
        .import_archive(&archive, "importer", None, &cancel)
        .await
        .unwrap();
    assert_eq!(report.outcome, ImportOutcome::Cancelled);
    assert_eq!(report.orders_touched, 0);
    assert_eq!(catalog.counts().orders, 0);
}

#[tokio::test]
async fn concurrent_imports_for_one_supplier_do_not_interleave() {
    let catalog = Arc::new(MemoryCatalog::new());
    let service = service(catalog.clone());

    let archive = helpers::export_archive(&[
        helpers::simple_row("302-0000016", "B07Q", "1", "5.00"),
        helpers::simple_row("302-0000017", "B07R", "2", "10.00"),
    ]);

    // Two invocations against the same supplier at once. Identity
    // resolution reads then creates across await points, so without the
    // supplier lock these could race into duplicate entities.
    let cancel = CancellationToken::new();
    let (a, b) = tokio::join!(
        service.import_archive(&archive, "importer", None, &cancel),
        service.import_archive(&archive, "importer", None, &cancel),
    );
    assert_eq!(a.unwrap().outcome, ImportOutcome::Completed);
    assert_eq!(b.unwrap().outcome, ImportOutcome::Completed);

    // The catalog ends exactly where a single import leaves it
    let counts = catalog.counts();
    assert_eq!(counts.suppliers, 1);
    assert_eq!(counts.orders, 2);
    assert_eq!(counts.line_items, 2);
    assert_eq!(counts.supplier_parts, 2);
    assert_eq!(counts.parts, 1);
    assert_eq!(counts.stock_receipts, 2);
}

#[tokio::test]
async fn receipts_carry_user_and_location() {
    let catalog = Arc::new(MemoryCatalog::new());
    let service = service(catalog.clone());

    let archive = helpers::export_archive(&[helpers::simple_row(
        "302-0000015",
        "B07P",
        "4",
        "20.00",
    )]);

    service
        .import_archive(&archive, "warehouse-bot", Some("Dock 2"), &CancellationToken::new())
        .await
        .unwrap();

    let receipts = catalog.stock_receipts();
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].received_by, "warehouse-bot");
    assert_eq!(receipts[0].location.as_deref(), Some("Dock 2"));
    assert_eq!(receipts[0].quantity, 4);
}
