//! Cosine similarity ranking over the mass-filtered candidate pool.

use csmp_core::types::{CandidateResult, MoleculeCandidate};

/// Cosine similarity. Inputs need not be pre-normalized.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0f32;
    let mut norm_a = 0f32;
    let mut norm_b = 0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = (norm_a.sqrt() * norm_b.sqrt()).max(1e-12);
    dot / denom
}

/// Top-K candidates by descending score; equal scores ordered by ascending
/// inchikey. Scores are cosine similarity clamped to [0, 1].
pub fn rank_candidates(
    embedding: &[f32],
    pool: &[MoleculeCandidate],
    top_k: usize,
) -> Vec<CandidateResult> {
    let mut scored: Vec<(f32, &MoleculeCandidate)> = pool
        .iter()
        .map(|c| (cosine(embedding, &c.embedding).clamp(0.0, 1.0), c))
        .collect();
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.1.inchikey.cmp(&b.1.inchikey))
    });
    scored.truncate(top_k);
    scored
        .into_iter()
        .map(|(score, c)| CandidateResult {
            smiles: c.smiles.clone(),
            monoisotopic_mass: c.monoisotopic_mass,
            score,
        })
        .collect()
}
