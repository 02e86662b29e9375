//! Export row parsing and validation
//!
//! Turns one raw CSV record into a typed [`OrderRowFact`]. Failure handling
//! is asymmetric on purpose: a malformed date degrades to a null date plus a
//! warning (the order is still worth importing, just without the
//! timestamp), while a malformed numeric field rejects the whole row, since
//! a line item without a trustworthy quantity or price would corrupt the
//! order it lands on.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::StringRecord;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::config::{ColumnMap, ImportConfig};
use crate::error::{ImportError, ImportResult};
use crate::models::OrderRowFact;

/// A non-fatal problem found while parsing one row
#[derive(Debug, Clone)]
pub struct RowWarning {
    pub row: usize,
    pub field: &'static str,
    pub message: String,
}

/// One parsed row plus any warnings recorded along the way
#[derive(Debug, Clone)]
pub struct ParsedRow {
    pub fact: OrderRowFact,
    pub warnings: Vec<RowWarning>,
}

/// Row parser/validator
#[derive(Debug, Clone)]
pub struct RowParser {
    columns: ColumnMap,
    title_limit: usize,
}

impl RowParser {
    pub fn new(config: &ImportConfig) -> Self {
        Self {
            columns: config.columns.clone(),
            title_limit: config.title_limit,
        }
    }

    /// Parse one record at the given zero-based row index
    ///
    /// Returns `Ok(None)` for the header row (index 0). Returns
    /// [`ImportError::RowFormat`] when a required column is missing or a
    /// numeric field fails to parse; the caller rejects the row and
    /// continues with the next one.
    pub fn parse(&self, row: usize, record: &StringRecord) -> ImportResult<Option<ParsedRow>> {
        if row == 0 {
            return Ok(None);
        }

        let mut warnings = Vec::new();

        let source_domain = self.field(record, self.columns.marketplace_domain, "marketplace domain", row)?;
        let order_reference = self.field(record, self.columns.order_reference, "order reference", row)?;
        let order_date_raw = self.field(record, self.columns.order_date, "order date", row)?;
        let currency = self.field(record, self.columns.currency, "currency", row)?;
        let total_price_raw = self.field(record, self.columns.total_price, "total price", row)?;
        let product_code = self.field(record, self.columns.product_code, "product code", row)?;
        let quantity_raw = self.field(record, self.columns.quantity, "quantity", row)?;
        let completion_raw = self.field(record, self.columns.completion_date, "completion date", row)?;
        let title_raw = self.field(record, self.columns.product_title, "product title", row)?;

        let order_date = self.parse_date(order_date_raw, "order date", row, &mut warnings);
        let completed_date = self.parse_date(completion_raw, "completion date", row, &mut warnings);

        let quantity: u32 = quantity_raw.trim().parse().map_err(|_| ImportError::RowFormat {
            row,
            reason: format!("invalid quantity {quantity_raw:?}"),
        })?;

        let total_price = Decimal::from_str(total_price_raw.trim()).map_err(|_| {
            ImportError::RowFormat {
                row,
                reason: format!("invalid total price {total_price_raw:?}"),
            }
        })?;

        let (product_title, product_description) = self.truncate_title(title_raw);

        Ok(Some(ParsedRow {
            fact: OrderRowFact {
                source_domain: source_domain.to_string(),
                order_reference: order_reference.to_string(),
                order_date,
                completed_date,
                product_code: product_code.to_string(),
                product_title,
                product_description,
                quantity,
                total_price,
                currency: currency.to_string(),
            },
            warnings,
        }))
    }

    fn field<'r>(
        &self,
        record: &'r StringRecord,
        index: usize,
        name: &'static str,
        row: usize,
    ) -> ImportResult<&'r str> {
        record.get(index).ok_or_else(|| ImportError::RowFormat {
            row,
            reason: format!("missing column {index} ({name})"),
        })
    }

    /// Strict ISO-8601 date parse; `None` on failure with a recorded warning.
    /// An empty field is treated as absent, not malformed (open orders have
    /// no completion date).
    fn parse_date(
        &self,
        raw: &str,
        field: &'static str,
        row: usize,
        warnings: &mut Vec<RowWarning>,
    ) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let parsed = DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                    .ok()
                    .map(|naive| Utc.from_utc_datetime(&naive))
            })
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|naive| Utc.from_utc_datetime(&naive))
            });

        if parsed.is_none() {
            warnings.push(RowWarning {
                row,
                field,
                message: format!("unparsable {field} {raw:?}, proceeding without it"),
            });
        }
        parsed
    }

    /// Truncate the title to the display limit with a ".." suffix; the
    /// untruncated title becomes the description, but only when truncation
    /// actually occurred.
    fn truncate_title(&self, title: &str) -> (String, String) {
        if title.chars().count() > self.title_limit {
            let truncated: String = title.chars().take(self.title_limit).collect();
            (format!("{truncated}.."), title.to_string())
        } else {
            (title.to_string(), String::new())
        }
    }
}
