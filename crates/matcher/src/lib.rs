//! # Vendor matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` is the serving-time entry point. Given a raw transaction
//! description it normalizes the text, fingerprints it with the parameters
//! stored in the [`index::VendorModel`], collects near duplicates from the
//! model's index, asks a [`Resolver`] for their names and vendors, scores
//! every candidate and accepts the best one when it clears the configured
//! threshold.
//!
//! ## Core Types
//!
//! - [`VendorExtractor`]: the pipeline; `Send + Sync`, shares the model
//!   through an `Arc` and never mutates it.
//! - [`Resolver`]: batched `id -> (name, vendor)` lookup supplied by the
//!   caller. [`InMemoryResolver`] covers tests and small deployments.
//! - [`MatchConfig`]: acceptance threshold (default `80`).
//! - [`Extraction`]: the full trace returned by [`VendorExtractor::explain`].
//!
//! ## Scoring
//!
//! A candidate whose name equals the normalized query scores `100` and wins
//! outright. Every other candidate is scored with [`partial_ratio`]. The
//! highest score wins, ties going to the lowest id.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use index::{BuilderConfig, ModelBuilder, TrainingRecord};
//! use matcher::{InMemoryResolver, MatchConfig, ResolvedName, VendorExtractor};
//!
//! let model = ModelBuilder::new(BuilderConfig::default())
//!     .unwrap()
//!     .build_from_records(vec![TrainingRecord::new(1, "starbucks")])
//!     .unwrap();
//! let resolver: InMemoryResolver = vec![ResolvedName::new(1, "starbucks", 42)]
//!     .into_iter()
//!     .collect();
//!
//! let extractor = VendorExtractor::new(Arc::new(model), resolver, MatchConfig::default()).unwrap();
//! assert_eq!(extractor.extract_vendor(Some("STARBUCKS")).unwrap(), Some(42));
//! ```
//!
//! ## Observability
//!
//! Attach an [`ExtractMetrics`] observer with
//! [`VendorExtractor::with_metrics`] to record per-call latency, hit counts
//! and decisions. Each call also emits a `debug` level `tracing` event with
//! the same data.

pub mod engine;
pub mod metrics;
pub mod resolver;
pub mod similarity;
pub mod types;

pub use crate::engine::VendorExtractor;
pub use crate::metrics::ExtractMetrics;
pub use crate::resolver::{InMemoryResolver, ResolveError, ResolvedName, Resolver, VendorId};
pub use crate::similarity::{partial_ratio, ratio};
pub use crate::types::{
    Candidate, ExtractError, Extraction, MatchConfig, DEFAULT_THRESHOLD, EXACT_MATCH_SCORE,
};
