//! Offline model builder.
//!
//! Consumes a one-shot training corpus, fingerprints every record and packs
//! the resulting [`NearDupIndex`] into a [`VendorModel`]. The builder is
//! single threaded; the corpus iterator is read exactly once.

use std::convert::Infallible;
use std::error::Error as StdError;
use std::time::Instant;

use perceptual::{char_shingles, simhash, PerceptualConfig, PerceptualError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::artifact::{save_model, ArtifactError, CompressionConfig};
use crate::store::{ArtifactName, ArtifactStore};
use crate::{
    slice_layout, IndexEntry, IndexError, ModelMeta, NearDupIndex, TrainingRecord, VendorModel,
    MODEL_SCHEMA_VERSION,
};

/// Default Hamming tolerance of the index.
pub const DEFAULT_TOLERANCE: u32 = 3;

/// Default number of records between progress log lines.
pub const DEFAULT_PROGRESS_EVERY: u64 = 50_000;

/// Errors raised while building or storing a model.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("invalid builder config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Perceptual(#[from] PerceptualError),
    #[error("training corpus failed after {processed} records: {source}")]
    Corpus {
        processed: u64,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Parameters of a model build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub perceptual: PerceptualConfig,
    /// Maximum Hamming distance the index answers for.
    pub tolerance: u32,
    /// Log a progress line every this many records.
    pub progress_every: u64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            perceptual: PerceptualConfig::default(),
            tolerance: DEFAULT_TOLERANCE,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

impl BuilderConfig {
    pub fn with_perceptual(mut self, perceptual: PerceptualConfig) -> Self {
        self.perceptual = perceptual;
        self
    }

    pub fn with_tolerance(mut self, tolerance: u32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_progress_every(mut self, progress_every: u64) -> Self {
        self.progress_every = progress_every;
        self
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        self.perceptual.validate()?;
        slice_layout(self.perceptual.bits, self.tolerance)?;
        if self.progress_every == 0 {
            return Err(BuildError::InvalidConfig(
                "progress_every must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Builds [`VendorModel`]s from training corpora.
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    cfg: BuilderConfig,
}

impl ModelBuilder {
    pub fn new(cfg: BuilderConfig) -> Result<Self, BuildError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.cfg
    }

    /// Build a model from a fallible corpus.
    ///
    /// The first failing record aborts the build with [`BuildError::Corpus`]
    /// and no model is produced.
    pub fn build<I, E>(&self, corpus: I) -> Result<VendorModel, BuildError>
    where
        I: IntoIterator<Item = Result<TrainingRecord, E>>,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let started = Instant::now();
        let perceptual = &self.cfg.perceptual;
        let mut entries = Vec::new();
        let mut processed: u64 = 0;

        for record in corpus {
            let record = record.map_err(|e| BuildError::Corpus {
                processed,
                source: e.into(),
            })?;
            let shingles = char_shingles(&record.normalized_name, perceptual.shingle_len);
            entries.push(IndexEntry {
                id: record.id,
                fingerprint: simhash(&shingles, perceptual.bits, perceptual.seed),
            });
            processed += 1;
            if processed % self.cfg.progress_every == 0 {
                info!(processed, "fingerprinted training records");
            }
        }

        if entries.is_empty() {
            warn!("training corpus is empty; every lookup will miss");
        }

        let index = NearDupIndex::build(perceptual.bits, self.cfg.tolerance, entries)?;
        let stats = index.stats();
        let meta = ModelMeta {
            schema_version: MODEL_SCHEMA_VERSION,
            algorithm: perceptual::PERCEPTUAL_ALGORITHM.to_string(),
            normalizer_version: canonical::NORMALIZER_VERSION,
            perceptual: perceptual.clone(),
            tolerance: self.cfg.tolerance,
            entry_count: processed,
        };
        let model = VendorModel::new(meta, index)?;

        info!(
            entries = stats.entries,
            slices = stats.slices,
            buckets = stats.buckets,
            largest_bucket = stats.largest_bucket,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "model built"
        );
        Ok(model)
    }

    /// Build from records that cannot fail.
    pub fn build_from_records<I>(&self, records: I) -> Result<VendorModel, BuildError>
    where
        I: IntoIterator<Item = TrainingRecord>,
    {
        self.build(records.into_iter().map(Ok::<_, Infallible>))
    }
}

/// Build a model and, only when the build succeeds, write it to `store`.
pub fn build_and_store<I, E>(
    builder: &ModelBuilder,
    corpus: I,
    store: &dyn ArtifactStore,
    name: &ArtifactName,
    compression: &CompressionConfig,
) -> Result<VendorModel, BuildError>
where
    I: IntoIterator<Item = Result<TrainingRecord, E>>,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    let started = Instant::now();
    let model = builder.build(corpus)?;
    save_model(store, name, &model, compression)?;
    info!(
        artifact = %name,
        entries = model.len(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "model built and stored"
    );
    Ok(model)
}
