//! Deterministic hash-derived encoder, the network-free stand-in selected by
//! `CSMP_USE_FAKE_ENCODER=1` and used throughout the test suites.

use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use twox_hash::XxHash64;

use csmp_core::error::EncodeError;
use csmp_core::traits::SpectrumEncoder;
use csmp_core::types::{
    EmbeddingOutcome, EmbeddingResult, FailureReason, SpectrumBatch, SpectrumRecord, EMBEDDING_DIM,
};

pub struct FakeSpectrumEncoder {
    dim: usize,
    max_peaks: usize,
}

impl FakeSpectrumEncoder {
    pub fn new(dim: usize, max_peaks: usize) -> Self {
        Self { dim, max_peaks }
    }

    fn embed_record(&self, record: &SpectrumRecord) -> Result<Vec<f32>, FailureReason> {
        let take = record.peaks.len().min(self.max_peaks);
        if take == 0 {
            // Mirrors the remote contract: empty tensor rows are per-item
            // failures, not whole-batch ones.
            return Err(FailureReason::EmbeddingFailed);
        }
        let mut v = vec![0f32; self.dim];
        for peak in &record.peaks[..take] {
            let mut hasher = XxHash64::with_seed(0);
            // Quantize m/z so float noise does not move the bucket.
            ((peak.mz * 1000.0).round() as i64).hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let weight = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += weight + peak.intensity as f32 * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }
}

impl Default for FakeSpectrumEncoder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIM, 1024)
    }
}

#[async_trait]
impl SpectrumEncoder for FakeSpectrumEncoder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn encode_batch(&self, batch: &SpectrumBatch) -> Result<EmbeddingResult, EncodeError> {
        let items = batch
            .records
            .iter()
            .map(|r| EmbeddingOutcome {
                spectrum_index: r.index,
                outcome: self.embed_record(r),
            })
            .collect();
        Ok(EmbeddingResult { batch_id: batch.batch_id, items })
    }
}
