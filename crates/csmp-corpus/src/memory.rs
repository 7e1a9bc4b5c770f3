//! In-memory `CandidateStore`, used by tests and small offline corpora.

use async_trait::async_trait;

use csmp_core::traits::CandidateStore;
use csmp_core::types::MoleculeCandidate;

pub struct MemoryCorpus {
    candidates: Vec<MoleculeCandidate>,
}

impl MemoryCorpus {
    pub fn new(mut candidates: Vec<MoleculeCandidate>) -> Self {
        candidates.sort_by(crate::by_mass_then_key);
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[async_trait]
impl CandidateStore for MemoryCorpus {
    async fn candidates_in_mass_range(
        &self,
        lo: f64,
        hi: f64,
    ) -> anyhow::Result<Vec<MoleculeCandidate>> {
        Ok(self
            .candidates
            .iter()
            .filter(|c| c.monoisotopic_mass >= lo && c.monoisotopic_mass <= hi)
            .cloned()
            .collect())
    }

    async fn all_candidates(&self) -> anyhow::Result<Vec<MoleculeCandidate>> {
        Ok(self.candidates.clone())
    }
}
