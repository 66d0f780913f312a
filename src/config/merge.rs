//! Command-line overrides and validation of the merged config

use crate::domain::{Config, NotifyKind};
use anyhow::{bail, Result};
use std::path::PathBuf;

/// Flags that take precedence over file values when set.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub shop: Option<String>,
    pub endpoint: Option<String>,
    pub notify_kind: Option<NotifyKind>,
    pub webhook_url: Option<String>,
    pub outbox_dir: Option<PathBuf>,
}

impl CliOverrides {
    pub fn apply(self, mut config: Config) -> Config {
        if let Some(shop) = self.shop {
            config.shop = Some(shop);
        }
        if let Some(endpoint) = self.endpoint {
            config.endpoint = Some(endpoint);
        }
        if let Some(kind) = self.notify_kind {
            config.notify.kind = kind;
        }
        if let Some(url) = self.webhook_url {
            config.notify.webhook_url = Some(url);
        }
        if let Some(dir) = self.outbox_dir {
            config.notify.outbox_dir = Some(dir);
        }
        config
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.lookup_batch_size == 0 {
            bail!("lookup_batch_size must be at least 1");
        }
        if self.write_batch_size == 0 {
            bail!("write_batch_size must be at least 1");
        }
        if self.max_input_bytes == 0 {
            bail!("max_input_bytes must be at least 1");
        }
        match self.notify.kind {
            NotifyKind::Webhook if self.notify.webhook_url.is_none() => {
                bail!("notify kind 'webhook' requires notify.webhook_url")
            }
            NotifyKind::Outbox if self.notify.outbox_dir.is_none() => {
                bail!("notify kind 'outbox' requires notify.outbox_dir")
            }
            _ => Ok(()),
        }
    }

    /// GraphQL endpoint: the explicit override, else derived from `shop`.
    pub fn graphql_endpoint(&self) -> Result<String> {
        if let Some(endpoint) = &self.endpoint {
            return Ok(endpoint.clone());
        }
        match &self.shop {
            Some(shop) => Ok(crate::catalog::GraphqlCatalog::endpoint_for_shop(
                shop,
                &self.api_version,
            )),
            None => bail!("No shop configured. Pass --shop or set `shop` in stock-sync.toml"),
        }
    }
}
