//! Typed configuration merged from defaults, `csmp.toml`, and `CSMP_*`
//! environment variables.
//!
//! Components receive their section explicitly at construction; nothing in
//! the pipeline reads ambient global state.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Error;

/// Pipeline tuning options: batch size, retries, deadlines, mass tolerance,
/// top-K.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotateConfig {
    pub max_batch_size: usize,
    pub max_retries: usize,
    pub retry_backoff_ms: u64,
    pub embedding_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub mass_tolerance_ppm: f64,
    pub mass_tolerance_floor: f64,
    pub top_k: usize,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 32,
            max_retries: 3,
            retry_backoff_ms: 200,
            embedding_timeout_ms: 30_000,
            request_timeout_ms: 120_000,
            mass_tolerance_ppm: 10.0,
            mass_tolerance_floor: 1e-3,
            top_k: 10,
        }
    }
}

impl AnnotateConfig {
    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_millis(self.embedding_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.max_batch_size == 0 {
            return Err(Error::InvalidConfig("max_batch_size must be positive".to_string()));
        }
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be positive".to_string()));
        }
        if !self.mass_tolerance_ppm.is_finite() || self.mass_tolerance_ppm < 0.0 {
            return Err(Error::InvalidConfig("mass_tolerance_ppm must be non-negative".to_string()));
        }
        if !self.mass_tolerance_floor.is_finite() || self.mass_tolerance_floor < 0.0 {
            return Err(Error::InvalidConfig(
                "mass_tolerance_floor must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the spectrum encoder service lives and how its input tensors are
/// shaped. `max_peaks` is the fixed tensor width defined by the external
/// model's contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    pub url: String,
    pub max_peaks: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self { url: "http://localhost:8001/encode".to_string(), max_peaks: 1024 }
    }
}

/// Location of the molecule corpus table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub uri: String,
    pub table: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self { uri: "./data/corpus.lancedb".to_string(), table: "molecules".to_string() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub annotate: AnnotateConfig,
    pub encoder: EncoderConfig,
    pub corpus: CorpusConfig,
}

impl Config {
    /// Merge built-in defaults, `csmp.toml`, and `CSMP_*` env vars
    /// (nested keys via `__`, e.g. `CSMP_ANNOTATE__TOP_K=5`).
    pub fn load() -> anyhow::Result<Self> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("csmp.toml"))
            .merge(Env::prefixed("CSMP_").split("__"));
        let config: Config = figment.extract()?;
        config.annotate.validate()?;
        Ok(config)
    }
}
