//! Decision table turning a resolution record into a status
//!
//! Rules are evaluated in a fixed priority order; the first match wins:
//!
//! 1. not in the catalog            → `not_found`
//! 2. inventory tracking disabled   → `skipped_not_tracked`
//! 3. no inventory item handle      → `failed`
//! 4. no level at the location      → `no_inventory_level`
//! 5. dry run                       → `dry_run`
//! 6. otherwise                     → queued for write-back

use crate::domain::{InventoryItemRef, ResolutionRecord, ResultRecord, Status, VariantId};

pub const MSG_NOT_FOUND: &str = "Variant ID not found in catalog";
pub const MSG_NOT_TRACKED: &str = "Inventory tracking is not enabled for this variant";
pub const MSG_NO_HANDLE: &str = "Could not retrieve inventory item handle";
pub const MSG_NO_LEVEL: &str =
    "No inventory level at this location. The variant must be connected to the location.";

/// Resolution record reduced to the cases the decision table distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState<'a> {
    NotFound,
    Untracked,
    MissingHandle,
    NoInventoryLevel,
    Writable { inventory_item: &'a InventoryItemRef, current: i64 },
}

impl<'a> ResolutionState<'a> {
    pub fn of(record: &'a ResolutionRecord) -> Self {
        if !record.found {
            return ResolutionState::NotFound;
        }
        if !record.tracking_enabled {
            return ResolutionState::Untracked;
        }
        let Some(inventory_item) = record.inventory_item.as_ref() else {
            return ResolutionState::MissingHandle;
        };
        if !record.has_inventory_level {
            return ResolutionState::NoInventoryLevel;
        }
        ResolutionState::Writable {
            inventory_item,
            current: record.current_quantity.unwrap_or(0),
        }
    }
}

/// An identifier that passed every rule and awaits a quantity mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteItem {
    pub variant_id: VariantId,
    pub inventory_item: InventoryItemRef,
    pub target: u32,
    pub current: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Terminal(ResultRecord),
    Write(WriteItem),
}

pub fn classify(
    variant_id: &VariantId,
    target: u32,
    record: &ResolutionRecord,
    dry_run: bool,
) -> Classification {
    let terminal = |status: Status, message: String| {
        Classification::Terminal(ResultRecord::new(variant_id.clone(), target, status, message))
    };

    match ResolutionState::of(record) {
        ResolutionState::NotFound => terminal(Status::NotFound, MSG_NOT_FOUND.to_string()),
        ResolutionState::Untracked => {
            terminal(Status::SkippedNotTracked, MSG_NOT_TRACKED.to_string())
        }
        ResolutionState::MissingHandle => terminal(Status::Failed, MSG_NO_HANDLE.to_string()),
        ResolutionState::NoInventoryLevel => {
            terminal(Status::NoInventoryLevel, MSG_NO_LEVEL.to_string())
        }
        ResolutionState::Writable { current, .. } if dry_run => {
            terminal(Status::DryRun, format!("Would be updated from {current} to {target}"))
        }
        ResolutionState::Writable { inventory_item, current } => Classification::Write(WriteItem {
            variant_id: variant_id.clone(),
            inventory_item: inventory_item.clone(),
            target,
            current,
        }),
    }
}
