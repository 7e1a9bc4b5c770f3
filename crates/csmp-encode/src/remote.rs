//! HTTP client for the external spectrum encoder service.
//!
//! One POST per batch carrying the fixed-shape tensors; the response carries
//! one row per submitted spectrum, aligned by position. Transient transport
//! failures (connect, timeout, 5xx) are retried with exponential backoff up
//! to `max_retries`; rejections are never retried.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use csmp_core::config::{AnnotateConfig, EncoderConfig};
use csmp_core::error::EncodeError;
use csmp_core::traits::SpectrumEncoder;
use csmp_core::types::{
    EmbeddingOutcome, EmbeddingResult, FailureReason, SpectrumBatch, EMBEDDING_DIM,
};

use crate::tensor::{build_batch_tensors, BatchTensors};

#[derive(Debug, Serialize)]
struct EncodeRequest<'a> {
    batch_id: Uuid,
    #[serde(flatten)]
    tensors: &'a BatchTensors,
}

#[derive(Debug, Deserialize)]
struct EncodeResponse {
    items: Vec<EncodeResponseItem>,
}

#[derive(Debug, Deserialize)]
struct EncodeResponseItem {
    #[serde(default)]
    vector: Option<Vec<f32>>,
    #[serde(default)]
    error: Option<String>,
}

pub struct RemoteSpectrumEncoder {
    client: reqwest::Client,
    encoder: EncoderConfig,
    max_retries: usize,
    retry_backoff: Duration,
}

impl RemoteSpectrumEncoder {
    /// The per-attempt deadline (`embedding_timeout`) is enforced by the
    /// underlying HTTP client.
    pub fn new(encoder: EncoderConfig, annotate: &AnnotateConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(annotate.embedding_timeout()).build()?;
        Ok(Self {
            client,
            encoder,
            max_retries: annotate.max_retries,
            retry_backoff: annotate.retry_backoff(),
        })
    }

    async fn call(&self, request: &EncodeRequest<'_>) -> Result<EncodeResponse, EncodeError> {
        let response = self
            .client
            .post(&self.encoder.url)
            .json(request)
            .send()
            .await
            .map_err(classify_transport)?;
        let status = response.status();
        if status.is_server_error() {
            return Err(EncodeError::Transport(format!("encoder returned {status}")));
        }
        if !status.is_success() {
            return Err(EncodeError::Rejected(format!("encoder returned {status}")));
        }
        response
            .json::<EncodeResponse>()
            .await
            .map_err(|e| EncodeError::Rejected(format!("malformed encoder response: {e}")))
    }
}

fn classify_transport(err: reqwest::Error) -> EncodeError {
    if err.is_timeout() {
        EncodeError::DeadlineExceeded
    } else {
        EncodeError::Transport(err.to_string())
    }
}

/// L2-normalize in place; all-zero vectors are left untouched.
fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

fn item_outcome(
    spectrum_index: usize,
    item: EncodeResponseItem,
    expected_dim: usize,
) -> Result<Vec<f32>, FailureReason> {
    match (item.vector, item.error) {
        (Some(mut v), None) => {
            if v.len() != expected_dim {
                tracing::warn!(
                    spectrum_index,
                    got = v.len(),
                    expected = expected_dim,
                    "encoder returned wrong embedding dimension"
                );
                return Err(FailureReason::EmbeddingFailed);
            }
            if v.iter().any(|x| !x.is_finite()) {
                tracing::warn!(spectrum_index, "encoder returned non-finite embedding");
                return Err(FailureReason::EmbeddingFailed);
            }
            l2_normalize(&mut v);
            Ok(v)
        }
        (_, error) => {
            tracing::debug!(spectrum_index, ?error, "encoder reported per-item failure");
            Err(FailureReason::EmbeddingFailed)
        }
    }
}

#[async_trait]
impl SpectrumEncoder for RemoteSpectrumEncoder {
    fn dim(&self) -> usize {
        EMBEDDING_DIM
    }

    async fn encode_batch(&self, batch: &SpectrumBatch) -> Result<EmbeddingResult, EncodeError> {
        let tensors = build_batch_tensors(&batch.records, self.encoder.max_peaks);
        let request = EncodeRequest { batch_id: batch.batch_id, tensors: &tensors };

        let mut attempt = 0usize;
        let response = loop {
            match self.call(&request).await {
                Ok(resp) => break resp,
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let backoff = self.retry_backoff * 2u32.saturating_pow(attempt as u32);
                    tracing::warn!(
                        batch_id = %batch.batch_id,
                        attempt,
                        error = %e,
                        backoff_ms = backoff.as_millis() as u64,
                        "encoder call failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        if response.items.len() != batch.records.len() {
            return Err(EncodeError::Rejected(format!(
                "encoder returned {} items for {} spectra",
                response.items.len(),
                batch.records.len()
            )));
        }
        let items = batch
            .records
            .iter()
            .zip(response.items)
            .map(|(record, item)| EmbeddingOutcome {
                spectrum_index: record.index,
                outcome: item_outcome(record.index, item, self.dim()),
            })
            .collect();
        Ok(EmbeddingResult { batch_id: batch.batch_id, items })
    }
}
