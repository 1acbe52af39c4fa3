//! Fingerprint value type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A SimHash fingerprint.
///
/// Only the low `bits` bits (as configured when it was produced) are
/// meaningful; the rest are always zero. Fingerprints are only comparable
/// when they were produced with the same [`crate::PerceptualConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    pub fn value(self) -> u64 {
        self.0
    }

    /// Number of differing bit positions (XOR + popcount).
    pub fn hamming_distance(self, other: Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Extract `width` bits starting at bit `offset`.
    pub fn bit_slice(self, offset: u32, width: u32) -> u64 {
        if width == 0 {
            return 0;
        }
        let shifted = self.0 >> offset;
        if width >= 64 {
            shifted
        } else {
            shifted & ((1u64 << width) - 1)
        }
    }
}

impl From<u64> for Fingerprint {
    fn from(value: u64) -> Self {
        Fingerprint(value)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
