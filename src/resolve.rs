//! Batched catalog resolution of unique identifiers

use crate::catalog::Catalog;
use crate::domain::{Location, ResolutionRecord, VariantId};
use crate::error::ReconcileError;
use std::collections::{HashMap, HashSet};

/// Resolution data for every unique identifier of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolutions {
    records: HashMap<VariantId, ResolutionRecord>,
}

impl Resolutions {
    pub fn get(&self, id: &VariantId) -> Option<&ResolutionRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Look up `ids` in batches of `batch_size`, strictly one batch at a time.
///
/// A failing lookup aborts the whole resolution: without catalog data no
/// identifier can be classified.
pub async fn resolve(
    catalog: &dyn Catalog,
    ids: &[VariantId],
    location: &Location,
    batch_size: usize,
) -> Result<Resolutions, ReconcileError> {
    let batch_size = batch_size.max(1);
    let mut records = HashMap::with_capacity(ids.len());

    for (batch_index, batch) in ids.chunks(batch_size).enumerate() {
        tracing::debug!(batch = batch_index, size = batch.len(), "looking up variants");

        let found = catalog
            .lookup(batch, location)
            .await
            .map_err(|source| ReconcileError::CatalogUnavailable { batch: batch_index, source })?;

        let requested: HashSet<&VariantId> = batch.iter().collect();
        for record in found {
            if !requested.contains(&record.variant_id) {
                tracing::debug!(variant = %record.variant_id, "ignoring unrequested catalog record");
                continue;
            }
            records.insert(
                record.variant_id,
                ResolutionRecord {
                    found: true,
                    tracking_enabled: record.tracked,
                    inventory_item: record.inventory_item,
                    current_quantity: record.available,
                    has_inventory_level: record.has_inventory_level,
                },
            );
        }

        for id in batch {
            records.entry(id.clone()).or_insert_with(ResolutionRecord::not_found);
        }
    }

    tracing::info!(resolved = records.len(), "catalog resolution complete");
    Ok(Resolutions { records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogRecord, QuantityChange, UserError};
    use crate::domain::InventoryItemRef;
    use crate::error::CatalogError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Knows every even identifier; fails on the configured call index.
    struct EvenCatalog {
        calls: Mutex<Vec<usize>>,
        fail_on_call: Option<usize>,
    }

    impl EvenCatalog {
        fn new(fail_on_call: Option<usize>) -> Self {
            Self { calls: Mutex::new(Vec::new()), fail_on_call }
        }
    }

    #[async_trait]
    impl Catalog for EvenCatalog {
        async fn lookup(
            &self,
            ids: &[VariantId],
            _location: &Location,
        ) -> Result<Vec<CatalogRecord>, CatalogError> {
            let mut calls = self.calls.lock().expect("lock");
            calls.push(ids.len());
            if self.fail_on_call == Some(calls.len() - 1) {
                return Err(CatalogError::Transport("connection reset".to_string()));
            }
            Ok(ids
                .iter()
                .filter(|id| id.as_str().parse::<u64>().expect("numeric") % 2 == 0)
                .map(|id| CatalogRecord {
                    variant_id: id.clone(),
                    tracked: true,
                    inventory_item: Some(InventoryItemRef::new(format!("item-{id}"))),
                    available: Some(1),
                    has_inventory_level: true,
                })
                .chain(std::iter::once(CatalogRecord {
                    variant_id: VariantId::parse("999999").expect("id"),
                    tracked: true,
                    inventory_item: None,
                    available: None,
                    has_inventory_level: false,
                }))
                .collect())
        }

        async fn set_on_hand(
            &self,
            _changes: &[QuantityChange],
            _location: &Location,
            _reason: &str,
        ) -> Result<Vec<UserError>, CatalogError> {
            unreachable!("resolution never writes")
        }
    }

    fn ids(n: u64) -> Vec<VariantId> {
        (1..=n).map(|i| VariantId::parse(&i.to_string()).expect("id")).collect()
    }

    fn location() -> Location {
        Location::new("1", "Main")
    }

    #[tokio::test]
    async fn batches_by_size_and_marks_missing_as_not_found() {
        let catalog = EvenCatalog::new(None);
        let ids = ids(120);
        let resolved = resolve(&catalog, &ids, &location(), 50).await.expect("resolve");

        assert_eq!(*catalog.calls.lock().expect("lock"), vec![50, 50, 20]);
        assert_eq!(resolved.len(), 120);
        let two = resolved.get(&ids[1]).expect("2");
        assert!(two.found);
        assert_eq!(two.current_quantity, Some(1));
        let one = resolved.get(&ids[0]).expect("1");
        assert_eq!(*one, ResolutionRecord::not_found());
    }

    #[tokio::test]
    async fn unrequested_records_are_ignored() {
        let catalog = EvenCatalog::new(None);
        let resolved = resolve(&catalog, &ids(4), &location(), 50).await.expect("resolve");
        assert_eq!(resolved.len(), 4);
        assert!(resolved.get(&VariantId::parse("999999").expect("id")).is_none());
    }

    #[tokio::test]
    async fn failing_lookup_aborts_with_batch_index() {
        let catalog = EvenCatalog::new(Some(1));
        let err = resolve(&catalog, &ids(120), &location(), 50).await.expect_err("fatal");
        match err {
            ReconcileError::CatalogUnavailable { batch, source } => {
                assert_eq!(batch, 1);
                assert_eq!(source, CatalogError::Transport("connection reset".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
        // No later batch is attempted after the failure.
        assert_eq!(catalog.calls.lock().expect("lock").len(), 2);
    }
}
