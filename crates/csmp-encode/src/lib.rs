//! Spectrum encoder clients: a remote HTTP encoder and a deterministic
//! fake used by tests and offline development.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

use std::sync::Arc;

use csmp_core::config::{AnnotateConfig, EncoderConfig};
use csmp_core::traits::SpectrumEncoder;
use csmp_core::types::EMBEDDING_DIM;

pub mod fake;
pub mod remote;
pub mod tensor;

pub use fake::FakeSpectrumEncoder;
pub use remote::RemoteSpectrumEncoder;

/// Build the configured encoder. `CSMP_USE_FAKE_ENCODER=1` switches to the
/// deterministic fake for fast, network-free runs.
pub fn default_encoder(
    encoder: &EncoderConfig,
    annotate: &AnnotateConfig,
) -> anyhow::Result<Arc<dyn SpectrumEncoder>> {
    let use_fake = std::env::var("CSMP_USE_FAKE_ENCODER")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        tracing::info!("using deterministic fake spectrum encoder");
        return Ok(Arc::new(FakeSpectrumEncoder::new(EMBEDDING_DIM, encoder.max_peaks)));
    }
    Ok(Arc::new(RemoteSpectrumEncoder::new(encoder.clone(), annotate)?))
}
