//! Process-level facade: configured store, shared cache, resolver.

use std::error::Error as StdError;
use std::sync::Arc;

use index::{
    build_and_store, load_model, ArtifactName, ArtifactStore, BuilderConfig, CompressionConfig,
    ModelBuilder, TrainingRecord, VendorModel,
};
use matcher::{ExtractMetrics, Extraction, MatchConfig, Resolver, VendorExtractor, VendorId};
use tracing::info;

use crate::batch::{extract_batch, BatchReport};
use crate::cache::ModelCache;
use crate::config::VendorIdConfig;
use crate::ServiceError;

/// Loads the model artifact at most once per [`ModelCache`] and serves
/// extractions against it.
///
/// A rebuild writes a fresh artifact to the store but leaves the cached
/// model alone; processes started afterwards pick up the new artifact.
pub struct VendorService {
    store: Box<dyn ArtifactStore>,
    artifact: ArtifactName,
    resolver: Arc<dyn Resolver>,
    cache: Arc<ModelCache>,
    matcher: MatchConfig,
    builder: BuilderConfig,
    compression: CompressionConfig,
    parallel: bool,
    metrics: Option<Arc<dyn ExtractMetrics>>,
}

impl VendorService {
    /// A service over `store` with default matching and build parameters.
    pub fn new(
        store: Box<dyn ArtifactStore>,
        artifact: ArtifactName,
        resolver: Arc<dyn Resolver>,
        cache: Arc<ModelCache>,
    ) -> Self {
        Self {
            store,
            artifact,
            resolver,
            cache,
            matcher: MatchConfig::default(),
            builder: BuilderConfig::default(),
            compression: CompressionConfig::default(),
            parallel: true,
            metrics: None,
        }
    }

    /// A service wired from a validated YAML configuration.
    pub fn from_config(
        cfg: &VendorIdConfig,
        resolver: Arc<dyn Resolver>,
        cache: Arc<ModelCache>,
    ) -> Result<Self, ServiceError> {
        cfg.validate()?;
        let store = cfg.store.backend.build()?;
        Ok(Self::new(store, cfg.store.artifact.clone(), resolver, cache)
            .with_match_config(cfg.matcher.clone())
            .with_builder_config(cfg.builder_config())
            .with_compression(cfg.index.compression.clone())
            .with_parallel(cfg.batch.parallel))
    }

    pub fn with_match_config(mut self, matcher: MatchConfig) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_builder_config(mut self, builder: BuilderConfig) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_compression(mut self, compression: CompressionConfig) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn ExtractMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn artifact(&self) -> &ArtifactName {
        &self.artifact
    }

    pub fn cache(&self) -> &Arc<ModelCache> {
        &self.cache
    }

    /// Load the model from the store unless the cache already holds one.
    pub fn load(&self) -> Result<Arc<VendorModel>, ServiceError> {
        let model = self
            .cache
            .get_or_load(|| load_model(self.store.as_ref(), &self.artifact))?;
        Ok(model)
    }

    /// An extractor over the cached model, loading it first if needed.
    pub fn extractor(&self) -> Result<VendorExtractor, ServiceError> {
        let model = self.load()?;
        self.extractor_for(model)
    }

    /// An extractor over the cached model; fails with
    /// [`ServiceError::ModelNotLoaded`] instead of touching the store.
    pub fn loaded_extractor(&self) -> Result<VendorExtractor, ServiceError> {
        let model = self.cache.loaded()?;
        self.extractor_for(model)
    }

    fn extractor_for(&self, model: Arc<VendorModel>) -> Result<VendorExtractor, ServiceError> {
        let extractor =
            VendorExtractor::with_resolver_arc(model, Arc::clone(&self.resolver), self.matcher.clone())?;
        Ok(match &self.metrics {
            Some(metrics) => extractor.with_metrics(Arc::clone(metrics)),
            None => extractor,
        })
    }

    /// Vendor of one raw description.
    pub fn extract_vendor(&self, raw: Option<&str>) -> Result<Option<VendorId>, ServiceError> {
        Ok(self.extractor()?.extract_vendor(raw)?)
    }

    /// Vendor of one raw description, with every intermediate result.
    pub fn explain(&self, raw: Option<&str>) -> Result<Extraction, ServiceError> {
        Ok(self.extractor()?.explain(raw)?)
    }

    /// Vendors of many raw descriptions; per-record failures are reported
    /// in the batch rather than aborting it.
    pub fn extract_batch<S>(&self, descriptions: &[Option<S>]) -> Result<BatchReport, ServiceError>
    where
        S: AsRef<str> + Sync,
    {
        let extractor = self.extractor()?;
        Ok(extract_batch(&extractor, descriptions, self.parallel))
    }

    /// Build a model from `corpus` and upload it under the configured
    /// artifact name.
    pub fn rebuild<I, E>(&self, corpus: I) -> Result<VendorModel, ServiceError>
    where
        I: IntoIterator<Item = Result<TrainingRecord, E>>,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let builder = ModelBuilder::new(self.builder.clone())?;
        let model = build_and_store(
            &builder,
            corpus,
            self.store.as_ref(),
            &self.artifact,
            &self.compression,
        )?;
        if self.cache.is_loaded() {
            info!(
                artifact = %self.artifact,
                "new model stored; the cached model stays in use until restart"
            );
        }
        Ok(model)
    }
}
