//! Upload parsing and validation
//!
//! The accepted format is a single `variant_id` column. Lines that are not
//! purely numeric are dropped without being reported; only structural
//! problems (size, empty file, header, nothing usable) are errors.

use crate::domain::{VariantId, HEADER};
use crate::error::InputError;

/// Parse raw upload bytes into the ordered identifier sequence, duplicates kept.
pub fn parse_upload(bytes: &[u8], max_bytes: usize) -> Result<Vec<VariantId>, InputError> {
    if bytes.len() > max_bytes {
        return Err(InputError::OversizeInput { size: bytes.len(), limit: max_bytes });
    }

    let text = String::from_utf8_lossy(bytes);
    let mut lines = text.split('\n').map(str::trim).filter(|line| !line.is_empty());

    let header = lines.next().ok_or(InputError::EmptyInput)?;
    if header.to_lowercase() != HEADER {
        return Err(InputError::InvalidHeader { found: header.to_string() });
    }

    let mut ids = Vec::new();
    let mut dropped = 0usize;
    for line in lines {
        match VariantId::parse(line) {
            Some(id) => ids.push(id),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, "ignored non-numeric rows");
    }

    if ids.is_empty() {
        return Err(InputError::NoValidIdentifiers);
    }

    Ok(ids)
}
