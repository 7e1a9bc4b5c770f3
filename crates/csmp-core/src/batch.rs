//! Batch assembly: a pure, validated partition of the request into
//! embeddable `SpectrumBatch`es.

use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{SpectrumBatch, SpectrumRecord};

/// Partition parsed spectra into batches of at most `max_batch_size`,
/// preserving input order within and across batches.
///
/// Rejected before any remote call: an empty request, a record without peak
/// data, or a duplicate `index` (it is the sole correlation key).
pub fn assemble_batches(
    records: Vec<SpectrumRecord>,
    max_batch_size: usize,
) -> Result<Vec<SpectrumBatch>> {
    if max_batch_size == 0 {
        return Err(Error::InvalidConfig("max_batch_size must be positive".to_string()));
    }
    if records.is_empty() {
        return Err(Error::InvalidInput("request contains no spectra".to_string()));
    }
    let mut seen = HashSet::with_capacity(records.len());
    for record in &records {
        if record.peaks.is_empty() {
            return Err(Error::InvalidInput(format!("spectrum {} has no peaks", record.index)));
        }
        if !seen.insert(record.index) {
            return Err(Error::InvalidInput(format!("duplicate spectrum index {}", record.index)));
        }
    }

    let mut batches = Vec::with_capacity(records.len().div_ceil(max_batch_size));
    let mut current = Vec::with_capacity(max_batch_size.min(records.len()));
    for record in records {
        current.push(record);
        if current.len() == max_batch_size {
            batches.push(SpectrumBatch { batch_id: Uuid::new_v4(), records: std::mem::take(&mut current) });
        }
    }
    if !current.is_empty() {
        batches.push(SpectrumBatch { batch_id: Uuid::new_v4(), records: current });
    }
    Ok(batches)
}
