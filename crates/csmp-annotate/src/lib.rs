//! Annotation pipeline: batch assembly, batch embedding, mass-window
//! filtering, similarity ranking, and order-preserving aggregation.
//!
//! Mass filtering and embedding similarity are separate composed stages:
//! the window bounds the cosine scan to a mass-plausible subset before any
//! similarity is computed.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tokio::time::Instant;

use csmp_core::adduct::AdductTable;
use csmp_core::batch::assemble_batches;
use csmp_core::config::AnnotateConfig;
use csmp_core::error::Error;
use csmp_core::traits::{CandidateStore, SpectrumEncoder};
use csmp_core::types::{
    AnnotationResult, EmbeddingResult, FailureReason, MoleculeCandidate, SpectrumBatch,
    SpectrumRecord,
};

pub mod rank;
pub mod response;
pub mod window;

use crate::window::MassWindow;

pub struct AnnotationPipeline {
    encoder: Arc<dyn SpectrumEncoder>,
    store: Arc<dyn CandidateStore>,
    adducts: AdductTable,
    config: AnnotateConfig,
}

impl AnnotationPipeline {
    pub fn new(
        encoder: Arc<dyn SpectrumEncoder>,
        store: Arc<dyn CandidateStore>,
        adducts: AdductTable,
        config: AnnotateConfig,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { encoder, store, adducts, config })
    }

    /// Annotate one request. Always returns exactly one result per input
    /// record, in input order; per-spectrum failures are captured in the
    /// results and only a malformed request shape errors out as a whole.
    pub async fn annotate(
        &self,
        records: Vec<SpectrumRecord>,
    ) -> Result<Vec<AnnotationResult>, Error> {
        let batches = assemble_batches(records, self.config.max_batch_size)?;
        let total: usize = batches.iter().map(|b| b.records.len()).sum();
        let deadline = Instant::now() + self.config.request_timeout();
        tracing::info!(spectra = total, batches = batches.len(), "annotation request started");

        // One remote call per batch; batches run concurrently and fail
        // independently.
        let embeddings = join_all(batches.iter().map(|b| self.embed_batch(b, deadline))).await;

        // `spectrum_index` is the sole correlation key: encoders may return
        // the per-item mapping in any order. A missing or duplicated index
        // fails that spectrum, never its neighbors.
        let unmatched: Result<Vec<f32>, FailureReason> = Err(FailureReason::EmbeddingFailed);
        let mut tasks = Vec::with_capacity(total);
        for (batch, embedded) in batches.iter().zip(&embeddings) {
            let mut by_index: HashMap<usize, &Result<Vec<f32>, FailureReason>> =
                HashMap::with_capacity(embedded.items.len());
            let mut ambiguous = HashSet::new();
            for item in &embedded.items {
                if by_index.insert(item.spectrum_index, &item.outcome).is_some() {
                    ambiguous.insert(item.spectrum_index);
                }
            }
            for record in &batch.records {
                let outcome = match by_index.get(&record.index) {
                    Some(outcome) if !ambiguous.contains(&record.index) => *outcome,
                    _ => {
                        tracing::warn!(
                            batch_id = %batch.batch_id,
                            spectrum_index = record.index,
                            "no unambiguous embedding outcome for spectrum"
                        );
                        &unmatched
                    }
                };
                tasks.push(self.annotate_one(record, outcome, deadline));
            }
        }
        let mut results = join_all(tasks).await;
        // Output order is input order, not completion order.
        results.sort_by_key(|r| r.spectrum_index);
        Ok(results)
    }

    async fn embed_batch(&self, batch: &SpectrumBatch, deadline: Instant) -> EmbeddingResult {
        match tokio::time::timeout_at(deadline, self.encoder.encode_batch(batch)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::warn!(batch_id = %batch.batch_id, error = %e, "batch embedding failed");
                EmbeddingResult::all_failed(batch, FailureReason::EmbeddingServiceUnavailable)
            }
            Err(_) => {
                tracing::warn!(batch_id = %batch.batch_id, "request deadline hit while embedding");
                EmbeddingResult::all_failed(batch, FailureReason::Timeout)
            }
        }
    }

    async fn annotate_one(
        &self,
        record: &SpectrumRecord,
        outcome: &Result<Vec<f32>, FailureReason>,
        deadline: Instant,
    ) -> AnnotationResult {
        let embedding = match outcome {
            Ok(v) => v,
            Err(reason) => return AnnotationResult::failed(record.index, *reason),
        };
        if embedding.iter().any(|x| !x.is_finite()) {
            return AnnotationResult::failed(record.index, FailureReason::EmbeddingFailed);
        }
        match tokio::time::timeout_at(deadline, self.filter_and_rank(record, embedding)).await {
            Ok(result) => result,
            Err(_) => AnnotationResult::failed(record.index, FailureReason::Timeout),
        }
    }

    async fn filter_and_rank(&self, record: &SpectrumRecord, embedding: &[f32]) -> AnnotationResult {
        let pool = match self.candidate_pool(record).await {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!(spectrum_index = record.index, error = %e, "corpus query failed");
                return AnnotationResult::failed(record.index, FailureReason::CorpusUnavailable);
            }
        };
        let candidates = rank::rank_candidates(embedding, &pool, self.config.top_k);
        AnnotationResult::ranked(record.index, candidates)
    }

    /// Mass window filter; skipped (unfiltered corpus scope, a deliberate
    /// degradation) when the record has no usable precursor m/z.
    async fn candidate_pool(
        &self,
        record: &SpectrumRecord,
    ) -> anyhow::Result<Vec<MoleculeCandidate>> {
        match record.effective_precursor_mz() {
            Some(mz) => {
                let target = self.adducts.neutral_mass(mz, record.adduct.as_deref());
                let window = MassWindow::around(
                    target,
                    self.config.mass_tolerance_ppm,
                    self.config.mass_tolerance_floor,
                );
                tracing::debug!(
                    spectrum_index = record.index,
                    lo = window.lo,
                    hi = window.hi,
                    "mass window filter"
                );
                self.store.candidates_in_mass_range(window.lo, window.hi).await
            }
            None => {
                tracing::debug!(spectrum_index = record.index, "no precursor m/z, filter skipped");
                self.store.all_candidates().await
            }
        }
    }
}
