//! # Catalog Importer
//!
//! Loads variants from a JSON file grouped by device type.
//!
//! ## Usage
//! ```bash
//! # Append the file's variants to ./orchard.db
//! cargo run -p orchard-db --bin import -- --file catalog.json
//!
//! # Replace every variant no order references
//! cargo run -p orchard-db --bin import -- --file catalog.json --replace
//!
//! # Specify database path
//! cargo run -p orchard-db --bin import -- --file catalog.json --db ./data/orchard.db
//! ```
//!
//! ## File Shape
//! ```json
//! {
//!   "phones":  [{ "model": "iPhone 13", "price_cents": 59900, "storage": 128, ... }],
//!   "laptops": [{ "model": "MacBook Air", "price": 999.99, "cpu": "M2", "ram": 8, ... }],
//!   "tablets": [{ "model": "iPad Air", "price": "$449", "connectivity": "WiFi", ... }]
//! }
//! ```
//! The legacy bucket names `iPhones`, `MacBooks` and `iPads` are accepted,
//! as is the legacy `price` field, which is in dollars.
//!
//! The whole file is validated first; one invalid item aborts the import
//! before anything is written. Rows the store rejects are skipped and
//! sampled in the log.

use std::env;
use std::time::Instant;

use orchard_core::validation::{validate_bulk, BulkVariants};
use orchard_core::BULK_BATCH_SIZE;
use orchard_db::{BatchResult, Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Store failures logged per batch.
const FAILURE_SAMPLE: usize = 3;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./orchard.db");
    let mut file: Option<String> = None;
    let mut replace = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--file" | "-f" => {
                if i + 1 < args.len() {
                    file = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--replace" => replace = true,
            "--help" | "-h" => {
                println!("Orchard Catalog Importer");
                println!();
                println!("Usage: import --file <PATH> [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -f, --file <PATH>  JSON catalog file (required)");
                println!("  -d, --db <PATH>    Database file path (default: ./orchard.db)");
                println!("      --replace      Delete unreferenced variants first");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let Some(file) = file else {
        return Err("missing --file <PATH> (see --help)".into());
    };

    let text = std::fs::read_to_string(&file)?;
    let payload: BulkVariants = serde_json::from_str(&text)?;
    let variants = validate_bulk(&payload)?;

    info!(
        file = %file,
        phones = payload.phones.len(),
        laptops = payload.laptops.len(),
        tablets = payload.tablets.len(),
        "Catalog file validated"
    );

    let db = Database::new(DbConfig::new(&db_path)).await?;

    if replace {
        let removed = db.variants().delete_unreferenced().await?;
        info!(removed, "Cleared existing variants");
    }

    let start = Instant::now();
    let mut total = BatchResult::default();

    for (batch_index, batch) in variants.chunks(BULK_BATCH_SIZE).enumerate() {
        let result = db.variants().insert_many(batch).await?;

        for failure in result.failed.iter().take(FAILURE_SAMPLE) {
            warn!(
                batch = batch_index,
                index = batch_index * BULK_BATCH_SIZE + failure.index,
                error = %failure.message,
                "Variant rejected"
            );
        }

        total.absorb(result, batch_index * BULK_BATCH_SIZE);
    }

    info!(
        inserted = total.inserted,
        failed = total.failed.len(),
        total = variants.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Import complete"
    );
    println!("Inserted {} of {} variants", total.inserted, variants.len());

    db.close().await;
    Ok(())
}
