//! Shared CLI utilities.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::GraphqlCatalog;
use crate::config::{load_config, CliOverrides};
use crate::domain::{Config, NotifyConfig, NotifyKind};
use crate::notify::{LogNotifier, Notifier, OutboxNotifier, WebhookNotifier};
use std::time::Duration;

/// Options shared by every command that talks to the shop.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Path to config file (stock-sync.toml or stock-sync.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Shop domain, e.g. example.myshopify.com
    #[arg(long, value_name = "DOMAIN")]
    pub shop: Option<String>,

    /// Full GraphQL endpoint URL (overrides the one derived from --shop)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,
}

/// Load the config file for the working directory, apply flag overrides and
/// validate the result.
pub fn load_merged_config(config_path: Option<&Path>, overrides: CliOverrides) -> Result<Config> {
    let work_dir = std::env::current_dir().context("Failed to read working directory")?;
    let config = overrides.apply(load_config(&work_dir, config_path)?);
    config.validate()?;
    Ok(config)
}

pub fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

pub fn build_catalog(config: &Config) -> Result<GraphqlCatalog> {
    let endpoint = config.graphql_endpoint()?;
    let token = std::env::var(&config.access_token_env).with_context(|| {
        format!("Missing access token: set the {} environment variable", config.access_token_env)
    })?;
    tracing::debug!(%endpoint, "using catalog endpoint");
    GraphqlCatalog::new(endpoint, token, Duration::from_millis(config.request_timeout_ms))
        .context("Failed to build catalog client")
}

pub fn build_notifier(notify: &NotifyConfig) -> Result<Option<Arc<dyn Notifier>>> {
    let notifier: Arc<dyn Notifier> = match notify.kind {
        NotifyKind::None => return Ok(None),
        NotifyKind::Log => Arc::new(LogNotifier),
        NotifyKind::Webhook => {
            let url = notify.webhook_url.clone().context("notify.webhook_url is not set")?;
            Arc::new(WebhookNotifier::new(url, notify.recipient.clone())?)
        }
        NotifyKind::Outbox => {
            let dir = notify.outbox_dir.clone().context("notify.outbox_dir is not set")?;
            Arc::new(OutboxNotifier::new(dir))
        }
    };
    Ok(Some(notifier))
}

/// Numeric tail of a `gid://` location id, as accepted by `--location`.
pub fn short_id(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_strips_gid_prefix() {
        assert_eq!(short_id("gid://shopify/Location/42"), "42");
        assert_eq!(short_id("42"), "42");
    }

    #[test]
    fn notifier_follows_kind() {
        let none = build_notifier(&NotifyConfig::default()).expect("none");
        assert!(none.is_none());

        let log = NotifyConfig { kind: NotifyKind::Log, ..NotifyConfig::default() };
        let notifier = build_notifier(&log).expect("log").expect("some");
        assert_eq!(notifier.name(), "log");

        let outbox = NotifyConfig { kind: NotifyKind::Outbox, ..NotifyConfig::default() };
        assert!(build_notifier(&outbox).is_err());
    }
}
