//! # Vendor index
//!
//! Near-duplicate lookup over SimHash fingerprints, plus the trained
//! [`VendorModel`] artifact that wraps it.
//!
//! ## Core features
//!
//! - **Slice tables**: for a tolerance of `k` bits the fingerprint is cut into
//!   `k + 1` contiguous slices and every slice gets its own hash table from
//!   slice pattern to entries. Two fingerprints at most `k` bits apart must
//!   agree exactly on at least one slice (pigeonhole), so probing the `k + 1`
//!   buckets of a query finds every entry within tolerance without scanning
//!   the whole index.
//! - **Offline build**: [`ModelBuilder`] consumes a one-shot training corpus
//!   and produces an immutable [`VendorModel`]. There is no incremental
//!   update; a rebuild replaces the artifact.
//! - **Artifact persistence**: models are encoded with bincode, compressed
//!   with zstd and framed with a SHA-256 checksum. The [`ArtifactStore`]
//!   trait abstracts where the bytes live; [`StoreConfig`] selects a local
//!   directory, memory, or (with the `remote` feature) an HTTP object store.
//!   Writes replace the whole object, so readers never see a partial model.
//!
//! ## Example
//!
//! ```
//! use index::{ModelBuilder, BuilderConfig, TrainingRecord};
//!
//! let builder = ModelBuilder::new(BuilderConfig::default()).unwrap();
//! let model = builder
//!     .build_from_records(vec![
//!         TrainingRecord::new(1, "starbucks coffee"),
//!         TrainingRecord::new(2, "starbucks"),
//!     ])
//!     .unwrap();
//!
//! let hits = model.lookup("starbucks");
//! assert!(hits.iter().any(|hit| hit.id == 2 && hit.distance == 0));
//! ```

mod artifact;
pub mod builder;
mod model;
mod query;
pub mod store;

pub use crate::artifact::{
    decode_model, encode_model, load_model, save_model, ArtifactError, CompressionCodec,
    CompressionConfig, ARTIFACT_FORMAT_VERSION,
};
pub use crate::builder::{build_and_store, BuildError, BuilderConfig, ModelBuilder};
pub use crate::model::{ModelMeta, TrainingRecord, VendorModel};
pub use crate::query::NearDuplicate;
#[cfg(feature = "remote")]
pub use crate::store::HttpStore;
pub use crate::store::{ArtifactName, ArtifactStore, InMemoryStore, LocalStore, StoreConfig};

use hashbrown::HashMap;
use perceptual::Fingerprint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bump this value whenever the serialized model layout changes.
pub const MODEL_SCHEMA_VERSION: u16 = 1;

/// Identifier of a training record (the key the resolver understands).
pub type EntryId = u64;

/// Errors produced while building the near-duplicate index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("invalid index config: {0}")]
    InvalidConfig(String),
    #[error("fingerprint {fingerprint} of entry {id} is wider than {bits} bits")]
    FingerprintTooWide {
        id: EntryId,
        fingerprint: Fingerprint,
        bits: u32,
    },
}

/// A contiguous run of fingerprint bits used as a table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitSlice {
    pub offset: u32,
    pub width: u32,
}

/// Split `bits` into `tolerance + 1` contiguous slices of near-equal width.
///
/// The first `bits % (tolerance + 1)` slices are one bit wider. Every slice
/// must hold at least one bit, so `tolerance` must be below `bits`.
pub fn slice_layout(bits: u32, tolerance: u32) -> Result<Vec<BitSlice>, IndexError> {
    if bits == 0 || bits > perceptual::MAX_FINGERPRINT_BITS {
        return Err(IndexError::InvalidConfig(format!(
            "fingerprint width must be in 1..=64 (got {bits})"
        )));
    }
    if tolerance >= bits {
        return Err(IndexError::InvalidConfig(format!(
            "tolerance {tolerance} leaves no bits per slice for a {bits}-bit fingerprint"
        )));
    }

    let count = tolerance + 1;
    let base = bits / count;
    let wider = bits % count;
    let mut slices = Vec::with_capacity(count as usize);
    let mut offset = 0;
    for i in 0..count {
        let width = if i < wider { base + 1 } else { base };
        slices.push(BitSlice { offset, width });
        offset += width;
    }
    Ok(slices)
}

/// One indexed fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: EntryId,
    pub fingerprint: Fingerprint,
}

/// Read-only near-duplicate index over `(id, fingerprint)` pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearDupIndex {
    bits: u32,
    tolerance: u32,
    slices: Vec<BitSlice>,
    entries: Vec<IndexEntry>,
    /// One table per slice: slice pattern -> positions in `entries`.
    tables: Vec<HashMap<u64, Vec<u32>>>,
}

/// Size summary for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub entries: usize,
    pub slices: usize,
    pub buckets: usize,
    pub largest_bucket: usize,
}

impl NearDupIndex {
    /// Build the slice tables in one pass over `entries`.
    pub fn build<I>(bits: u32, tolerance: u32, entries: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = IndexEntry>,
    {
        let slices = slice_layout(bits, tolerance)?;
        let entries: Vec<IndexEntry> = entries.into_iter().collect();
        if entries.len() > u32::MAX as usize {
            return Err(IndexError::InvalidConfig(format!(
                "too many entries for one index: {}",
                entries.len()
            )));
        }

        let mut tables: Vec<HashMap<u64, Vec<u32>>> = vec![HashMap::new(); slices.len()];
        for (pos, entry) in entries.iter().enumerate() {
            if bits < 64 && entry.fingerprint.value() >> bits != 0 {
                return Err(IndexError::FingerprintTooWide {
                    id: entry.id,
                    fingerprint: entry.fingerprint,
                    bits,
                });
            }
            for (slice, table) in slices.iter().zip(tables.iter_mut()) {
                let key = entry.fingerprint.bit_slice(slice.offset, slice.width);
                table.entry(key).or_default().push(pos as u32);
            }
        }

        Ok(Self {
            bits,
            tolerance,
            slices,
            entries,
            tables,
        })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn tolerance(&self) -> u32 {
        self.tolerance
    }

    pub fn slices(&self) -> &[BitSlice] {
        &self.slices
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that the slice tables agree with the entries.
    ///
    /// A built index always passes; a decoded one may not. Every table must
    /// use the layout `slice_layout(bits, tolerance)` and file each entry
    /// exactly once, under the key of that entry's slice.
    pub fn validate(&self) -> Result<(), IndexError> {
        let expected = slice_layout(self.bits, self.tolerance)?;
        if self.slices != expected {
            return Err(IndexError::InvalidConfig(format!(
                "index has {} slices, {} bits at tolerance {} need {}",
                self.slices.len(),
                self.bits,
                self.tolerance,
                expected.len()
            )));
        }
        if self.tables.len() != self.slices.len() {
            return Err(IndexError::InvalidConfig(format!(
                "index has {} slice tables for {} slices",
                self.tables.len(),
                self.slices.len()
            )));
        }
        for entry in &self.entries {
            if self.bits < 64 && entry.fingerprint.value() >> self.bits != 0 {
                return Err(IndexError::FingerprintTooWide {
                    id: entry.id,
                    fingerprint: entry.fingerprint,
                    bits: self.bits,
                });
            }
        }

        let mut filed = vec![false; self.entries.len()];
        for (n, (slice, table)) in self.slices.iter().zip(&self.tables).enumerate() {
            filed.iter_mut().for_each(|f| *f = false);
            for (&key, positions) in table {
                for &pos in positions {
                    let entry = self.entries.get(pos as usize).ok_or_else(|| {
                        IndexError::InvalidConfig(format!(
                            "slice table {n} points at position {pos} of {} entries",
                            self.entries.len()
                        ))
                    })?;
                    if entry.fingerprint.bit_slice(slice.offset, slice.width) != key {
                        return Err(IndexError::InvalidConfig(format!(
                            "slice table {n} files entry {} under the wrong key",
                            entry.id
                        )));
                    }
                    if std::mem::replace(&mut filed[pos as usize], true) {
                        return Err(IndexError::InvalidConfig(format!(
                            "slice table {n} files entry {} twice",
                            entry.id
                        )));
                    }
                }
            }
            if let Some(pos) = filed.iter().position(|f| !f) {
                return Err(IndexError::InvalidConfig(format!(
                    "slice table {n} is missing entry {}",
                    self.entries[pos].id
                )));
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> IndexStats {
        let buckets = self.tables.iter().map(|t| t.len()).sum();
        let largest_bucket = self
            .tables
            .iter()
            .flat_map(|t| t.values().map(Vec::len))
            .max()
            .unwrap_or(0);
        IndexStats {
            entries: self.entries.len(),
            slices: self.slices.len(),
            buckets,
            largest_bucket,
        }
    }
}
