//! restock-import - Order History Reconciliation CLI
//!
//! Replays a retail order-history archive into a purchasing catalog and
//! drives every touched purchase order through its lifecycle. Runs against
//! an in-memory catalog by default, or a SQLite catalog with `--db`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use restock_import::config::ImportConfig;
use restock_import::db::{init_catalog_pool, SqliteCatalog};
use restock_import::models::ImportReport;
use restock_import::catalog::MemoryCatalog;
use restock_import::OrderImportService;

#[derive(Parser, Debug)]
#[command(name = "restock-import", version, about = "Replay an order-history archive into a purchasing catalog")]
struct Cli {
    /// Path to the order-history ZIP archive
    archive: PathBuf,

    /// Treat the archive file as base64-encoded text
    #[arg(long)]
    base64: bool,

    /// Username recorded on stock receipts
    #[arg(long, default_value = "importer")]
    user: String,

    /// Stock location recorded on stock receipts
    #[arg(long)]
    location: Option<String>,

    /// SQLite database path (in-memory catalog when omitted)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long, env = "RESTOCK_IMPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Emit the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting restock-import");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = ImportConfig::resolve(cli.config.as_deref())?;
    info!("Supplier: {}", config.supplier_name);

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling import");
            ctrl_c_token.cancel();
        }
    });

    let payload = std::fs::read(&cli.archive)?;
    let location = cli.location.as_deref();

    let report = match &cli.db {
        Some(db_path) => {
            info!("Database: {}", db_path.display());
            let pool = init_catalog_pool(db_path).await?;
            let catalog = Arc::new(SqliteCatalog::new(pool));
            let service =
                OrderImportService::new(catalog.clone(), catalog, config);
            run_import(&service, &payload, cli.base64, &cli.user, location, &cancel).await?
        }
        None => {
            info!("Using in-memory catalog");
            let catalog = Arc::new(MemoryCatalog::new());
            let service =
                OrderImportService::new(catalog.clone(), catalog, config);
            run_import(&service, &payload, cli.base64, &cli.user, location, &cancel).await?
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.display_string());
    }

    Ok(())
}

async fn run_import<C, W>(
    service: &OrderImportService<C, W>,
    payload: &[u8],
    base64: bool,
    user: &str,
    location: Option<&str>,
    cancel: &CancellationToken,
) -> Result<ImportReport>
where
    C: restock_import::catalog::Catalog + 'static,
    W: restock_import::catalog::OrderWorkflow + 'static,
{
    let report = if base64 {
        let text = String::from_utf8(payload.to_vec())?;
        service
            .import_orders(text.trim(), user, location, cancel)
            .await?
    } else {
        service
            .import_archive(payload, user, location, cancel)
            .await?
    };
    Ok(report)
}
