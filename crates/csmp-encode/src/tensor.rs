//! Fixed-shape input tensors for the encoder service.

use serde::Serialize;

use csmp_core::types::SpectrumRecord;

/// Zero-padded `[batch, max_peaks]` feature arrays plus per-row peak counts.
/// The shape is the external model's contract, not ours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchTensors {
    pub mzs: Vec<Vec<f32>>,
    pub intensities: Vec<Vec<f32>>,
    pub num_peaks: Vec<i64>,
}

/// Build the batch tensors: peaks beyond `max_peaks` are truncated, shorter
/// rows are zero-padded to the fixed width.
pub fn build_batch_tensors(records: &[SpectrumRecord], max_peaks: usize) -> BatchTensors {
    let mut mzs = Vec::with_capacity(records.len());
    let mut intensities = Vec::with_capacity(records.len());
    let mut num_peaks = Vec::with_capacity(records.len());
    for record in records {
        let take = record.peaks.len().min(max_peaks);
        let mut row_mz = vec![0f32; max_peaks];
        let mut row_intensity = vec![0f32; max_peaks];
        for (i, peak) in record.peaks.iter().take(max_peaks).enumerate() {
            row_mz[i] = peak.mz as f32;
            row_intensity[i] = peak.intensity as f32;
        }
        mzs.push(row_mz);
        intensities.push(row_intensity);
        num_peaks.push(take as i64);
    }
    BatchTensors { mzs, intensities, num_peaks }
}
