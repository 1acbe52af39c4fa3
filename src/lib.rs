//! Workspace umbrella crate for vendor identification.
//!
//! Maps free-text bank transaction descriptions (`"STARBUCKS #4521 SEATTLE
//! WA"`) to the vendor that issued them. The stages live in their own
//! crates and are re-exported here:
//!
//! - [`canonical`]: description and training-name normalization.
//! - [`perceptual`]: character shingles and SimHash fingerprints.
//! - [`index`]: the near-duplicate index, the serialized model and artifact
//!   stores.
//! - [`matcher`]: candidate scoring and vendor selection.
//!
//! [`VendorService`] ties them to a configured artifact store and a shared
//! [`ModelCache`] so a process loads the model once and serves any number
//! of concurrent extractions from it.
//!
//! ```
//! use std::sync::Arc;
//! use vendorid::{
//!     InMemoryResolver, InMemoryStore, ModelCache, ResolvedName, TrainingRecord, VendorService,
//! };
//!
//! let names = vec![ResolvedName::new(1, "starbucks", 42)];
//! let resolver: InMemoryResolver = names.into_iter().collect();
//! let service = VendorService::new(
//!     Box::new(InMemoryStore::new()),
//!     Default::default(),
//!     Arc::new(resolver),
//!     Arc::new(ModelCache::new()),
//! );
//!
//! let corpus = vec![Ok::<_, std::io::Error>(TrainingRecord::new(1, "starbucks"))];
//! service.rebuild(corpus).unwrap();
//! assert_eq!(service.extract_vendor(Some("STARBUCKS")).unwrap(), Some(42));
//! ```

pub mod batch;
mod cache;
pub mod config;
pub mod corpus;
pub mod eligibility;
mod service;

pub use canonical::{
    normalize_description, normalize_transaction_name, ABSENT_DESCRIPTION, NORMALIZER_VERSION,
};
pub use index::{
    load_model, save_model, ArtifactError, ArtifactName, ArtifactStore, BuildError,
    BuilderConfig, CompressionCodec, CompressionConfig, EntryId, InMemoryStore, LocalStore,
    ModelBuilder, ModelMeta, NearDuplicate, StoreConfig, TrainingRecord, VendorModel,
};
pub use matcher::{
    partial_ratio, Candidate, ExtractError, ExtractMetrics, Extraction, InMemoryResolver,
    MatchConfig, ResolveError, ResolvedName, Resolver, VendorExtractor, VendorId,
};
pub use perceptual::{Fingerprint, PerceptualConfig, PerceptualError};

pub use crate::batch::{extract_batch, BatchReport, RecordOutcome};
pub use crate::cache::ModelCache;
pub use crate::config::{ConfigLoadError, VendorIdConfig};
pub use crate::corpus::{CorpusError, CorpusReader, CorpusRow, NameColumn};
pub use crate::eligibility::EligibilityRules;
pub use crate::service::VendorService;

use thiserror::Error;

/// Errors surfaced by [`VendorService`] and [`ModelCache`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// An extraction was attempted before any model was loaded.
    #[error("vendor model has not been loaded")]
    ModelNotLoaded,

    #[error("failed to load vendor model: {0}")]
    Load(#[from] ArtifactError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("failed to build vendor model: {0}")]
    Build(#[from] BuildError),

    #[error(transparent)]
    Config(#[from] ConfigLoadError),
}
