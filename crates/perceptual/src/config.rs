//! Configuration and error types for shingling and fingerprinting.
//!
//! The perceptual layer is a pure function of `(normalized_text, config)`.
//! A model records the config it was trained with, and serving must use the
//! same values or fingerprints stop being comparable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Widest fingerprint this crate produces.
pub const MAX_FINGERPRINT_BITS: u32 = 64;

/// Configuration for shingling and SimHash fingerprinting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PerceptualConfig {
    /// Configuration schema version.
    ///
    /// Any algorithmic change that can affect the fingerprint must bump this
    /// version, so stale models are detectable.
    pub version: u32,
    /// Characters per shingle.
    pub shingle_len: usize,
    /// Fingerprint width in bits, `1..=64`.
    pub bits: u32,
    /// Seed for the per-shingle hash.
    ///
    /// Two configs with the same seed and parameters produce bit-identical
    /// fingerprints for the same text.
    pub seed: u64,
}

impl PerceptualConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shingle width in characters.
    pub fn with_shingle_len(mut self, shingle_len: usize) -> Self {
        self.shingle_len = shingle_len;
        self
    }

    /// Set the fingerprint width. Wider fingerprints separate unrelated names
    /// better but need a larger tolerance for the same recall.
    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.version < 1 {
            return Err(PerceptualError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if self.shingle_len < 1 {
            return Err(PerceptualError::InvalidConfigShingleLen {
                shingle_len: self.shingle_len,
            });
        }
        if self.bits < 1 || self.bits > MAX_FINGERPRINT_BITS {
            return Err(PerceptualError::InvalidConfigBits { bits: self.bits });
        }
        Ok(())
    }
}

impl Default for PerceptualConfig {
    fn default() -> Self {
        Self {
            version: 1,
            shingle_len: 3,
            bits: 32,
            seed: 0xF00D_BAAD_F00D_BAAD,
        }
    }
}

/// Errors returned by the perceptual layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerceptualError {
    #[error("invalid config: shingle_len must be >= 1 (got {shingle_len})")]
    InvalidConfigShingleLen { shingle_len: usize },

    #[error("invalid config: bits must be in 1..=64 (got {bits})")]
    InvalidConfigBits { bits: u32 },

    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = PerceptualConfig::default();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.shingle_len, 3);
        assert_eq!(cfg.bits, 32);
        assert_eq!(cfg.seed, 0xF00D_BAAD_F00D_BAAD);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_builder_chain() {
        let cfg = PerceptualConfig::new()
            .with_shingle_len(4)
            .with_bits(64)
            .with_seed(42);
        assert_eq!(cfg.shingle_len, 4);
        assert_eq!(cfg.bits, 64);
        assert_eq!(cfg.seed, 42);
    }

    #[test]
    fn config_validate_rejects_zero_shingle_len() {
        let cfg = PerceptualConfig::new().with_shingle_len(0);
        assert_eq!(
            cfg.validate(),
            Err(PerceptualError::InvalidConfigShingleLen { shingle_len: 0 })
        );
    }

    #[test]
    fn config_validate_rejects_bad_widths() {
        for bits in [0, 65, 128] {
            let cfg = PerceptualConfig::new().with_bits(bits);
            assert_eq!(cfg.validate(), Err(PerceptualError::InvalidConfigBits { bits }));
        }
    }

    #[test]
    fn config_validate_rejects_version_zero() {
        let cfg = PerceptualConfig {
            version: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(PerceptualError::InvalidConfigVersion { version: 0 })
        ));
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = PerceptualConfig::new().with_bits(48).with_seed(7);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: PerceptualConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn error_display_mentions_field() {
        let err = PerceptualError::InvalidConfigBits { bits: 65 };
        assert!(err.to_string().contains("bits must be in 1..=64"));
    }
}
