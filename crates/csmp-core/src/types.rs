//! Domain types shared by the annotation pipeline and its collaborators.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dense embedding dimensionality (D) produced by the spectrum encoder and
/// stored alongside corpus molecules.
pub const EMBEDDING_DIM: usize = 256;

/// One centroided peak of a spectrum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Peak {
    pub mz: f64,
    pub intensity: f64,
}

/// One parsed spectrum instance as handed over by the (external) file parser.
///
/// `index` is the position within the source file and the sole correlation
/// key between input and output; the pipeline never reorders it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrumRecord {
    pub index: usize,
    #[serde(default)]
    pub precursor_mz: Option<f64>,
    #[serde(default)]
    pub adduct: Option<String>,
    #[serde(default)]
    pub formula: Option<String>,
    pub peaks: Vec<Peak>,
}

impl SpectrumRecord {
    /// Precursor m/z usable for mass filtering. Non-finite and non-positive
    /// values are treated as absent data.
    pub fn effective_precursor_mz(&self) -> Option<f64> {
        self.precursor_mz.filter(|mz| mz.is_finite() && *mz > 0.0)
    }
}

/// An ordered slice of one request, embedded with a single remote call.
///
/// `batch_id` correlates the asynchronous encoder call and is never persisted.
#[derive(Debug, Clone)]
pub struct SpectrumBatch {
    pub batch_id: Uuid,
    pub records: Vec<SpectrumRecord>,
}

/// Per-spectrum failure causes surfaced in `AnnotationResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    EmbeddingFailed,
    EmbeddingServiceUnavailable,
    CorpusUnavailable,
    Timeout,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureReason::EmbeddingFailed => "EmbeddingFailed",
            FailureReason::EmbeddingServiceUnavailable => "EmbeddingServiceUnavailable",
            FailureReason::CorpusUnavailable => "CorpusUnavailable",
            FailureReason::Timeout => "Timeout",
        };
        f.write_str(s)
    }
}

/// Outcome of embedding one spectrum of a batch.
#[derive(Debug, Clone)]
pub struct EmbeddingOutcome {
    pub spectrum_index: usize,
    pub outcome: Result<Vec<f32>, FailureReason>,
}

/// Embeddings (or failure markers) for every index of one submitted batch.
/// The set of indices is exactly the set submitted; nothing is dropped.
#[derive(Debug, Clone)]
pub struct EmbeddingResult {
    pub batch_id: Uuid,
    pub items: Vec<EmbeddingOutcome>,
}

impl EmbeddingResult {
    /// Mark every index of `batch` as failed with `reason`.
    pub fn all_failed(batch: &SpectrumBatch, reason: FailureReason) -> Self {
        Self {
            batch_id: batch.batch_id,
            items: batch
                .records
                .iter()
                .map(|r| EmbeddingOutcome { spectrum_index: r.index, outcome: Err(reason) })
                .collect(),
        }
    }
}

/// One row of the molecule corpus. Owned by the corpus collaborator; the
/// pipeline only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoleculeCandidate {
    pub inchikey: String,
    pub smiles: String,
    #[serde(default)]
    pub formula: Option<String>,
    pub monoisotopic_mass: f64,
    pub embedding: Vec<f32>,
}

/// Per-molecule output unit. `score` is cosine similarity clamped to [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResult {
    pub smiles: String,
    #[serde(rename = "mass")]
    pub monoisotopic_mass: f64,
    pub score: f32,
}

/// Terminal state of one spectrum's annotation. `NoCandidates` is a valid
/// empty result, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationStatus {
    Success,
    NoCandidates,
    Failed,
}

/// Per-spectrum output. Exactly one exists per input record, in the same
/// relative order as the input file.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationResult {
    pub spectrum_index: usize,
    pub status: AnnotationStatus,
    pub candidates: Vec<CandidateResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureReason>,
}

impl AnnotationResult {
    /// A ranked outcome; an empty candidate list terminates as `NoCandidates`.
    pub fn ranked(spectrum_index: usize, candidates: Vec<CandidateResult>) -> Self {
        let status = if candidates.is_empty() {
            AnnotationStatus::NoCandidates
        } else {
            AnnotationStatus::Success
        };
        Self { spectrum_index, status, candidates, error: None }
    }

    pub fn failed(spectrum_index: usize, reason: FailureReason) -> Self {
        Self {
            spectrum_index,
            status: AnnotationStatus::Failed,
            candidates: Vec::new(),
            error: Some(reason),
        }
    }
}
