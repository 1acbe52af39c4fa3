//! The trained vendor model: index plus the parameters it was built with.

use perceptual::{char_shingles, simhash, Fingerprint, PerceptualConfig};
use serde::{Deserialize, Serialize};

use crate::query::NearDuplicate;
use crate::{EntryId, IndexError, NearDupIndex, MODEL_SCHEMA_VERSION};

/// One row of the training corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub id: EntryId,
    /// Name already passed through the `canonical` normalizer.
    pub normalized_name: String,
}

impl TrainingRecord {
    pub fn new(id: EntryId, normalized_name: impl Into<String>) -> Self {
        Self {
            id,
            normalized_name: normalized_name.into(),
        }
    }
}

/// Build metadata stored alongside the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub schema_version: u16,
    pub algorithm: String,
    pub normalizer_version: u32,
    pub perceptual: PerceptualConfig,
    pub tolerance: u32,
    pub entry_count: u64,
}

/// Immutable model shared by every extraction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorModel {
    meta: ModelMeta,
    index: NearDupIndex,
}

impl VendorModel {
    /// Package an index with its metadata, checking that the two agree.
    pub fn new(meta: ModelMeta, index: NearDupIndex) -> Result<Self, IndexError> {
        let model = Self { meta, index };
        model.validate()?;
        Ok(model)
    }

    /// Package without any checks, to forge broken artifacts in tests.
    #[cfg(test)]
    pub(crate) fn from_parts_unchecked(meta: ModelMeta, index: NearDupIndex) -> Self {
        Self { meta, index }
    }

    /// Check the internal consistency of a built or freshly decoded model.
    pub fn validate(&self) -> Result<(), IndexError> {
        self.meta
            .perceptual
            .validate()
            .map_err(|e| IndexError::InvalidConfig(e.to_string()))?;
        if self.meta.perceptual.bits != self.index.bits() {
            return Err(IndexError::InvalidConfig(format!(
                "model declares {} bits but index holds {}",
                self.meta.perceptual.bits,
                self.index.bits()
            )));
        }
        if self.meta.tolerance != self.index.tolerance() {
            return Err(IndexError::InvalidConfig(format!(
                "model declares tolerance {} but index uses {}",
                self.meta.tolerance,
                self.index.tolerance()
            )));
        }
        if self.meta.entry_count != self.index.len() as u64 {
            return Err(IndexError::InvalidConfig(format!(
                "model declares {} entries but index holds {}",
                self.meta.entry_count,
                self.index.len()
            )));
        }
        self.index.validate()
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn index(&self) -> &NearDupIndex {
        &self.index
    }

    pub fn perceptual(&self) -> &PerceptualConfig {
        &self.meta.perceptual
    }

    pub fn tolerance(&self) -> u32 {
        self.meta.tolerance
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn is_current_schema(&self) -> bool {
        self.meta.schema_version == MODEL_SCHEMA_VERSION
    }

    /// Fingerprint normalized text with the parameters this model was built with.
    pub fn fingerprint(&self, normalized: &str) -> Fingerprint {
        let cfg = &self.meta.perceptual;
        simhash(&char_shingles(normalized, cfg.shingle_len), cfg.bits, cfg.seed)
    }

    /// Near duplicates of normalized text, ordered by `(distance, id)`.
    pub fn lookup(&self, normalized: &str) -> Vec<NearDuplicate> {
        self.index.near_duplicates(self.fingerprint(normalized))
    }

    /// Near duplicates of a precomputed fingerprint.
    pub fn lookup_fingerprint(&self, fingerprint: Fingerprint) -> Vec<NearDuplicate> {
        self.index.near_duplicates(fingerprint)
    }
}
