//! stock-sync: set per-location stock levels from a CSV of scanned variant IDs

use anyhow::Result;

fn main() -> Result<()> {
    stock_sync::cli::run()
}
