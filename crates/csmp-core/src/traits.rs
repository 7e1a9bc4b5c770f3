use async_trait::async_trait;

use crate::error::EncodeError;
use crate::types::{EmbeddingResult, MoleculeCandidate, SpectrumBatch};

/// Embedding collaborator: one remote call per batch, per-item outcomes.
#[async_trait]
pub trait SpectrumEncoder: Send + Sync {
    /// Embedding dimensionality (D).
    fn dim(&self) -> usize;

    /// Encode every record of `batch`. `Ok` covers exactly the submitted
    /// indices, each as a vector or a per-item failure marker; `Err` means
    /// the whole call failed.
    async fn encode_batch(&self, batch: &SpectrumBatch) -> Result<EmbeddingResult, EncodeError>;
}

/// Read-only molecule corpus collaborator. May be queried concurrently
/// without coordination; no write path exists in the pipeline.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// All molecules whose `monoisotopic_mass` lies in `[lo, hi]`, ordered
    /// by ascending mass (then inchikey) for deterministic testing.
    async fn candidates_in_mass_range(&self, lo: f64, hi: f64)
        -> anyhow::Result<Vec<MoleculeCandidate>>;

    /// The unfiltered corpus scope, used when no precursor m/z is available.
    async fn all_candidates(&self) -> anyhow::Result<Vec<MoleculeCandidate>>;
}
