//! Shared fixtures for integration tests
//!
//! Builds order-history export archives in the retailer's layout: a zip
//! archive with the CSV manifest at the well-known entry path, 24 columns
//! wide, header row first.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

pub const ENTRY: &str = "Retail.OrderHistory.2/Retail.OrderHistory.2.csv";
pub const DOMAIN: &str = "www.amazon.de";

const WIDTH: usize = 24;

/// One export data row with every consumed column populated
pub fn row(
    reference: &str,
    order_date: &str,
    completion_date: &str,
    currency: &str,
    total_price: &str,
    sku: &str,
    quantity: &str,
    title: &str,
) -> Vec<String> {
    let mut fields = vec![String::new(); WIDTH];
    fields[0] = DOMAIN.to_string();
    fields[1] = reference.to_string();
    fields[2] = order_date.to_string();
    fields[4] = currency.to_string();
    fields[9] = total_price.to_string();
    fields[12] = sku.to_string();
    fields[14] = quantity.to_string();
    fields[18] = completion_date.to_string();
    fields[23] = title.to_string();
    fields
}

/// A row with typical dates and pricing, varying only the identity columns
pub fn simple_row(reference: &str, sku: &str, quantity: &str, total_price: &str) -> Vec<String> {
    row(
        reference,
        "2023-06-01T10:30:00Z",
        "2023-06-03T08:00:00Z",
        "EUR",
        total_price,
        sku,
        quantity,
        "USB-C Cable",
    )
}

/// Zip archive holding the given data rows under the standard entry path
pub fn export_archive(rows: &[Vec<String>]) -> Vec<u8> {
    export_archive_at(ENTRY, rows)
}

/// Zip archive holding the given data rows under an arbitrary entry path
pub fn export_archive_at(entry: &str, rows: &[Vec<String>]) -> Vec<u8> {
    let mut csv_writer = csv::Writer::from_writer(Vec::new());

    let header: Vec<String> = (0..WIDTH).map(|i| format!("Column {i}")).collect();
    csv_writer.write_record(&header).unwrap();
    for fields in rows {
        csv_writer.write_record(fields).unwrap();
    }
    let csv_bytes = csv_writer.into_inner().unwrap();

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file(entry, SimpleFileOptions::default()).unwrap();
    writer.write_all(&csv_bytes).unwrap();
    writer
        .start_file("Retail.Other/readme.txt", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"not order history").unwrap();
    writer.finish().unwrap().into_inner()
}
