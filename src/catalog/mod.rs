//! Inventory catalog contract
//!
//! The engine talks to the catalog only through [`Catalog`]: one lookup per
//! batch of identifiers, one absolute on-hand mutation per batch of changes.
//! [`LocationDirectory`] and [`ShopProfile`] cover the read-only queries the
//! CLI needs before a run starts.

use crate::domain::{InventoryItemRef, Location, VariantId};
use crate::error::CatalogError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod graphql;

pub use graphql::GraphqlCatalog;

/// Catalog view of a single variant at a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub variant_id: VariantId,
    pub tracked: bool,
    pub inventory_item: Option<InventoryItemRef>,
    /// Available quantity at the location, when the level reports one.
    pub available: Option<i64>,
    pub has_inventory_level: bool,
}

/// Absolute on-hand quantity to set for one inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuantityChange {
    pub inventory_item: InventoryItemRef,
    pub quantity: i64,
}

/// Field-level validation error returned by a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Look up a batch of identifiers. Identifiers the catalog does not know
    /// are simply absent from the returned records.
    async fn lookup(
        &self,
        ids: &[VariantId],
        location: &Location,
    ) -> Result<Vec<CatalogRecord>, CatalogError>;

    /// Set absolute on-hand quantities. An empty vector means the whole batch
    /// was applied.
    async fn set_on_hand(
        &self,
        changes: &[QuantityChange],
        location: &Location,
        reason: &str,
    ) -> Result<Vec<UserError>, CatalogError>;
}

#[async_trait]
pub trait LocationDirectory: Send + Sync {
    async fn locations(&self) -> Result<Vec<Location>, CatalogError>;

    async fn location_name(&self, id: &str) -> Result<Option<String>, CatalogError>;
}

#[async_trait]
pub trait ShopProfile: Send + Sync {
    /// Shop owner's email, falling back to the public contact email.
    async fn owner_email(&self) -> Result<Option<String>, CatalogError>;
}
