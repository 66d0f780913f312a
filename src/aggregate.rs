//! Collapse repeated identifiers into target quantities

use crate::domain::VariantId;
use std::collections::HashMap;

/// Target quantity per identifier plus the first-occurrence order of identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedTarget {
    counts: HashMap<VariantId, u32>,
    order: Vec<VariantId>,
}

impl AggregatedTarget {
    /// Unique identifiers in first-occurrence order.
    pub fn unique(&self) -> &[VariantId] {
        &self.order
    }

    /// Occurrence count, or `None` for identifiers not in the upload.
    pub fn target(&self, id: &VariantId) -> Option<u32> {
        self.counts.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VariantId, u32)> {
        self.order.iter().map(move |id| (id, self.counts[id]))
    }
}

pub fn aggregate(ids: &[VariantId]) -> AggregatedTarget {
    let mut target = AggregatedTarget::default();
    for id in ids {
        let count = target.counts.entry(id.clone()).or_insert(0);
        if *count == 0 {
            target.order.push(id.clone());
        }
        *count += 1;
    }
    target
}
