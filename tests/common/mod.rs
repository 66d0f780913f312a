//! In-process fakes shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stock_sync::catalog::{Catalog, CatalogRecord, QuantityChange, UserError};
use stock_sync::domain::{InventoryItemRef, Location, VariantId};
use stock_sync::error::{CatalogError, NotifyError};
use stock_sync::notify::{Notifier, RunReport};
use tokio::time::Instant;

pub fn location() -> Location {
    Location::new("1", "Main Warehouse")
}

pub fn id(raw: &str) -> VariantId {
    VariantId::parse(raw).expect("numeric id")
}

#[derive(Debug, Clone)]
pub struct WriteCall {
    pub changes: Vec<QuantityChange>,
    pub reason: String,
    pub at: Instant,
}

/// Catalog holding a fixed set of variants. Write responses can be scripted
/// per call; unscripted calls succeed.
#[derive(Default)]
pub struct FakeCatalog {
    variants: HashMap<String, CatalogRecord>,
    lookup_failure: Option<CatalogError>,
    write_script: Mutex<VecDeque<Result<Vec<UserError>, CatalogError>>>,
    lookups: Mutex<Vec<Vec<String>>>,
    writes: Mutex<Vec<WriteCall>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variant(self, raw: &str, available: i64) -> Self {
        self.with_record(raw, |record| record.available = Some(available))
    }

    pub fn with_untracked(self, raw: &str) -> Self {
        self.with_record(raw, |record| record.tracked = false)
    }

    pub fn with_missing_level(self, raw: &str) -> Self {
        self.with_record(raw, |record| {
            record.has_inventory_level = false;
            record.available = None;
        })
    }

    pub fn with_missing_handle(self, raw: &str) -> Self {
        self.with_record(raw, |record| record.inventory_item = None)
    }

    pub fn failing_lookups(mut self, err: CatalogError) -> Self {
        self.lookup_failure = Some(err);
        self
    }

    pub fn script_write(self, response: Result<Vec<UserError>, CatalogError>) -> Self {
        self.write_script.lock().expect("lock").push_back(response);
        self
    }

    fn with_record(mut self, raw: &str, edit: impl FnOnce(&mut CatalogRecord)) -> Self {
        let mut record = CatalogRecord {
            variant_id: id(raw),
            tracked: true,
            inventory_item: Some(InventoryItemRef::new(format!("gid://shopify/InventoryItem/{raw}"))),
            available: Some(0),
            has_inventory_level: true,
        };
        edit(&mut record);
        self.variants.insert(raw.to_string(), record);
        self
    }

    pub fn lookups(&self) -> Vec<Vec<String>> {
        self.lookups.lock().expect("lock").clone()
    }

    pub fn writes(&self) -> Vec<WriteCall> {
        self.writes.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn lookup(
        &self,
        ids: &[VariantId],
        _location: &Location,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        self.lookups
            .lock()
            .expect("lock")
            .push(ids.iter().map(|id| id.to_string()).collect());
        if let Some(err) = &self.lookup_failure {
            return Err(err.clone());
        }
        Ok(ids.iter().filter_map(|id| self.variants.get(id.as_str()).cloned()).collect())
    }

    async fn set_on_hand(
        &self,
        changes: &[QuantityChange],
        _location: &Location,
        reason: &str,
    ) -> Result<Vec<UserError>, CatalogError> {
        self.writes.lock().expect("lock").push(WriteCall {
            changes: changes.to_vec(),
            reason: reason.to_string(),
            at: Instant::now(),
        });
        self.write_script.lock().expect("lock").pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Succeed,
    Fail,
    Hang,
}

/// Notifier that records what it was handed.
pub struct RecordingNotifier {
    delivery: Delivery,
    reports: Arc<Mutex<Vec<RunReport>>>,
}

impl RecordingNotifier {
    pub fn new(delivery: Delivery) -> Self {
        Self { delivery, reports: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn reports(&self) -> Vec<RunReport> {
        self.reports.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn notify(&self, report: &RunReport) -> Result<(), NotifyError> {
        self.reports.lock().expect("lock").push(report.clone());
        match self.delivery {
            Delivery::Succeed => Ok(()),
            Delivery::Fail => Err(NotifyError::Http(500)),
            Delivery::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

pub fn user_error(message: &str) -> UserError {
    UserError { field: Some(vec!["setQuantities".to_string()]), message: message.to_string() }
}
