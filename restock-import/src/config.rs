//! Import configuration
//!
//! One immutable [`ImportConfig`] is constructed per invocation and passed
//! down to every component. The export's column positions are an explicit,
//! named mapping rather than bare indices scattered through the parser:
//! they are a compatibility surface, and changing one silently breaks
//! existing exports.
//!
//! Resolution priority follows the usual ordering: CLI argument, then the
//! `RESTOCK_IMPORT_CONFIG` environment variable, then compiled defaults.

use restock_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Zero-based column positions consumed from the order-history CSV
///
/// Defaults match the retailer's `Retail.OrderHistory.2` export layout.
/// All other columns are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    /// Marketplace domain (e.g. "www.amazon.de"), used for product links
    pub marketplace_domain: usize,
    /// External order reference
    pub order_reference: usize,
    /// Order date, ISO-8601
    pub order_date: usize,
    /// Currency code
    pub currency: usize,
    /// Aggregate total price for the line
    pub total_price: usize,
    /// Supplier product code (SKU)
    pub product_code: usize,
    /// Ordered quantity
    pub quantity: usize,
    /// Completion date, ISO-8601
    pub completion_date: usize,
    /// Product title
    pub product_title: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            marketplace_domain: 0,
            order_reference: 1,
            order_date: 2,
            currency: 4,
            total_price: 9,
            product_code: 12,
            quantity: 14,
            completion_date: 18,
            product_title: 23,
        }
    }
}

/// Immutable per-invocation import configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Supplier all imported orders are attributed to
    pub supplier_name: String,
    /// Exact path of the CSV entry inside the export archive
    pub archive_entry: String,
    /// Product titles longer than this are truncated with a ".." suffix
    pub title_limit: usize,
    /// Column positions consumed from the CSV
    pub columns: ColumnMap,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            supplier_name: "Amazon".to_string(),
            archive_entry: "Retail.OrderHistory.2/Retail.OrderHistory.2.csv".to_string(),
            title_limit: 50,
            columns: ColumnMap::default(),
        }
    }
}

impl ImportConfig {
    /// Resolve configuration: CLI path, then env var, then defaults
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_path {
            return Self::load(path);
        }

        if let Ok(path) = std::env::var("RESTOCK_IMPORT_CONFIG") {
            return Self::load(Path::new(&path));
        }

        Ok(Self::default())
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read config failed ({}): {}", path.display(), e)))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse config failed ({}): {}", path.display(), e)))?;

        info!("Import configuration loaded from {}", path.display());
        Ok(config)
    }
}
