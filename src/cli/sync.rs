//! Sync command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::utils::{build_catalog, build_notifier, build_runtime, load_merged_config, ConnectionArgs};
use crate::catalog::{LocationDirectory, ShopProfile};
use crate::config::CliOverrides;
use crate::domain::{Config, InputFile, Location, NotifyKind};
use crate::engine::{Engine, EngineSettings, RunOutcome, RunRequest};
use crate::error::InputError;
use crate::notify::fallback_recipient;
use crate::parse::parse_upload;
use crate::render::{render_console_summary, render_results_csv, results_file_name};

/// Shown when the location's display name cannot be resolved.
const UNKNOWN_LOCATION: &str = "Unknown";

/// Extra time granted to a pending notification before the process exits.
const EXIT_GRACE: Duration = Duration::from_secs(1);

#[derive(Args)]
pub struct SyncArgs {
    /// CSV upload: a `variant_id` header followed by one ID per scanned unit
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Location to reconcile (numeric ID or gid://shopify/Location/...)
    #[arg(short, long, value_name = "ID")]
    pub location: String,

    /// Classify everything but write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Write the per-variant results CSV to this file (or into this directory)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the run outcome as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Run report delivery: none, log, webhook or outbox
    #[arg(long, value_name = "KIND")]
    pub notify: Option<NotifyKind>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

pub fn run(args: SyncArgs) -> Result<()> {
    let overrides = CliOverrides {
        shop: args.connection.shop.clone(),
        endpoint: args.connection.endpoint.clone(),
        notify_kind: args.notify,
        ..CliOverrides::default()
    };
    let config = load_merged_config(args.connection.config.as_deref(), overrides)?;
    let input = read_upload(&args.file, config.max_input_bytes)?;

    let runtime = build_runtime()?;
    runtime.block_on(execute(args, config, input))
}

async fn execute(args: SyncArgs, config: Config, input: InputFile) -> Result<()> {
    let catalog = Arc::new(build_catalog(&config)?);
    let location_name = match catalog.location_name(&args.location).await {
        Ok(Some(name)) => name,
        Ok(None) => {
            tracing::warn!(location = %args.location, "location not found in catalog");
            UNKNOWN_LOCATION.to_string()
        }
        Err(err) => {
            tracing::warn!(location = %args.location, error = %err, "could not resolve location name");
            UNKNOWN_LOCATION.to_string()
        }
    };

    let settings = EngineSettings::from_config(&config);
    let notify_timeout = settings.notify_timeout;
    let mut engine = Engine::new(catalog.clone(), settings);
    let mut notify = config.notify.clone();
    if notify.kind == NotifyKind::Webhook && notify.recipient.is_none() {
        notify.recipient = owner_recipient(catalog.as_ref(), config.shop.as_deref()).await;
    }
    if let Some(notifier) = build_notifier(&notify)? {
        engine = engine.with_notifier(notifier);
    }

    let request = RunRequest {
        input,
        location: Location::new(args.location.clone(), location_name.clone()),
        dry_run: args.dry_run,
        shop: config.shop.clone().unwrap_or_default(),
    };
    let outcome = engine.run(request).await?;

    if let Some(output) = &args.output {
        let path = write_results(output, &outcome)?;
        if !args.json {
            println!("Results written to {}", path.display());
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("Location: {location_name}");
        println!("{}", render_console_summary(&outcome.summary, &outcome.results, outcome.dry_run));
    }

    let background = engine.background_tasks();
    background.close();
    if tokio::time::timeout(notify_timeout + EXIT_GRACE, background.wait()).await.is_err() {
        tracing::warn!("run report delivery still pending at exit");
    }

    Ok(())
}

/// Shop owner's email, else `<handle>@shopify.com` for the configured shop.
async fn owner_recipient(profile: &dyn ShopProfile, shop: Option<&str>) -> Option<String> {
    match profile.owner_email().await {
        Ok(Some(email)) => return Some(email),
        Ok(None) => tracing::debug!("shop reports no owner email"),
        Err(err) => tracing::warn!(error = %err, "could not look up shop owner email"),
    }
    shop.and_then(fallback_recipient)
}

/// Read and validate the upload. Runs before anything talks to the shop, so a
/// malformed file never costs a catalog request.
fn read_upload(path: &Path, max_bytes: usize) -> Result<InputFile> {
    let size = fs::metadata(path)
        .with_context(|| format!("Failed to read upload: {}", path.display()))?
        .len();
    if size > max_bytes as u64 {
        return Err(InputError::OversizeInput { size: size as usize, limit: max_bytes }.into());
    }

    let bytes = fs::read(path).with_context(|| format!("Failed to read upload: {}", path.display()))?;
    let ids = parse_upload(&bytes, max_bytes)?;
    tracing::debug!(rows = ids.len(), "upload validated");

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("upload.csv");
    Ok(InputFile::new(name, bytes))
}

fn write_results(output: &Path, outcome: &RunOutcome) -> Result<PathBuf> {
    let path = if output.is_dir() {
        output.join(results_file_name(chrono::Utc::now().date_naive()))
    } else {
        output.to_path_buf()
    };
    fs::write(&path, render_results_csv(&outcome.results))
        .with_context(|| format!("Failed to write results: {}", path.display()))?;
    Ok(path)
}
