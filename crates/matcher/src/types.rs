use std::time::Duration;

use index::{EntryId, NearDuplicate};
use perceptual::Fingerprint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resolver::{ResolveError, VendorId};

/// Default minimum score a winner needs to be accepted.
pub const DEFAULT_THRESHOLD: u8 = 80;

/// Score given to a candidate whose name equals the normalized query.
pub const EXACT_MATCH_SCORE: u8 = 100;

/// Decision policy of the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum winning score, `0..=100`, inclusive.
    pub threshold: u8,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl MatchConfig {
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.threshold > 100 {
            return Err(ExtractError::InvalidConfig(format!(
                "threshold must be within 0..=100 (got {})",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Whether a winner with `score` is accepted.
    pub fn accepts(&self, score: u8) -> bool {
        score >= self.threshold
    }
}

/// A resolved and scored near duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: EntryId,
    pub name: String,
    pub vendor_id: VendorId,
    /// Similarity to the normalized query, `0..=100`.
    pub score: u8,
    /// Set when `name` equals the normalized query.
    pub exact: bool,
}

/// Full trace of one extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub normalized: String,
    pub fingerprint: Fingerprint,
    pub near_duplicates: Vec<NearDuplicate>,
    /// Scored candidates, best first (`score` descending, then `id`).
    pub candidates: Vec<Candidate>,
    pub winner: Option<Candidate>,
    pub decision: Option<VendorId>,
    pub elapsed: Duration,
}

impl Extraction {
    pub fn is_match(&self) -> bool {
        self.decision.is_some()
    }
}

/// Errors surfaced by the extractor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Invalid extractor configuration.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// The resolver failed to name the index hits.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
