//! Result ledger: exactly one record per unique identifier

use crate::aggregate::AggregatedTarget;
use crate::domain::{ResultRecord, VariantId};
use crate::error::LedgerError;
use std::collections::{HashMap, HashSet};

/// Append-only collection of result records for one run.
#[derive(Debug)]
pub struct Ledger {
    order: Vec<VariantId>,
    expected: HashSet<VariantId>,
    records: HashMap<VariantId, ResultRecord>,
}

impl Ledger {
    pub fn new(target: &AggregatedTarget) -> Self {
        Self {
            order: target.unique().to_vec(),
            expected: target.unique().iter().cloned().collect(),
            records: HashMap::with_capacity(target.len()),
        }
    }

    /// Append a record. Records are immutable: a second one for the same
    /// identifier is rejected.
    pub fn record(&mut self, record: ResultRecord) -> Result<(), LedgerError> {
        if !self.expected.contains(&record.variant_id) {
            return Err(LedgerError::Unknown(record.variant_id));
        }
        if self.records.contains_key(&record.variant_id) {
            return Err(LedgerError::Duplicate(record.variant_id));
        }
        self.records.insert(record.variant_id.clone(), record);
        Ok(())
    }

    pub fn extend(
        &mut self,
        records: impl IntoIterator<Item = ResultRecord>,
    ) -> Result<(), LedgerError> {
        records.into_iter().try_for_each(|record| self.record(record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Close the ledger, ordered by first occurrence in the upload.
    pub fn finish(mut self) -> Result<Vec<ResultRecord>, LedgerError> {
        let missing: Vec<&VariantId> =
            self.order.iter().filter(|id| !self.records.contains_key(*id)).collect();
        if let Some(first) = missing.first() {
            return Err(LedgerError::Missing { count: missing.len(), first: (*first).clone() });
        }

        Ok(self.order.iter().filter_map(|id| self.records.remove(id)).collect())
    }
}
