//! Locations command implementation

use anyhow::{Context, Result};
use clap::Args;

use super::utils::{build_catalog, build_runtime, load_merged_config, short_id, ConnectionArgs};
use crate::catalog::LocationDirectory;
use crate::config::CliOverrides;

#[derive(Args)]
pub struct LocationsArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

pub fn run(args: LocationsArgs) -> Result<()> {
    let overrides = CliOverrides {
        shop: args.connection.shop,
        endpoint: args.connection.endpoint,
        ..CliOverrides::default()
    };
    let config = load_merged_config(args.connection.config.as_deref(), overrides)?;
    let catalog = build_catalog(&config)?;

    let runtime = build_runtime()?;
    let locations =
        runtime.block_on(catalog.locations()).context("Failed to list locations")?;

    if locations.is_empty() {
        println!("No locations found.");
        return Ok(());
    }
    let width = locations.iter().map(|l| short_id(&l.id).len()).max().unwrap_or(0);
    for location in &locations {
        println!("{:<width$}  {}", short_id(&location.id), location.name);
    }
    Ok(())
}
