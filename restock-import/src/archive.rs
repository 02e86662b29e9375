//! Export archive handling
//!
//! The retailer's export is a zip archive holding the order-history CSV at
//! a fixed entry path; every other entry is ignored. Any failure here is
//! fatal for the invocation: a batch never starts from a payload that
//! cannot be fully decoded.

use base64::Engine as _;
use csv::StringRecord;
use std::io::{Cursor, Read};
use tracing::debug;

use crate::error::{ImportError, ImportResult};

/// Decode a base64 invocation payload into raw archive bytes
pub fn decode_payload(payload: &str) -> ImportResult<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| ImportError::Archive(format!("base64 decode failed: {e}")))
}

/// Extract the order-history CSV records from the archive bytes
///
/// Records are returned raw, header included; the row parser owns the
/// header-skip and all per-field validation.
pub fn read_order_history(bytes: &[u8], entry_name: &str) -> ImportResult<Vec<StringRecord>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ImportError::Archive(format!("unreadable zip archive: {e}")))?;

    debug!(
        entries = archive.len(),
        entry = entry_name,
        "opened export archive"
    );

    let mut entry = archive
        .by_name(entry_name)
        .map_err(|e| ImportError::Archive(format!("entry {entry_name:?} not found: {e}")))?;

    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|e| ImportError::Archive(format!("entry is not valid UTF-8: {e}")))?;

    // Rows vary in width across export revisions; short rows surface later
    // as per-row errors rather than failing the whole decode.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record.map_err(|e| ImportError::Archive(format!("CSV decode failed: {e}")))?);
    }
    Ok(records)
}
