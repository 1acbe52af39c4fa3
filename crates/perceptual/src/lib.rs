//! # Perceptual fingerprinting for transaction names
//!
//! Maps a normalized transaction name to a fixed-width SimHash fingerprint
//! such that textual similarity shows up as a small Hamming distance.
//!
//! ## Contract
//!
//! - Input is the output of the `canonical` normalizer. This crate never
//!   normalizes.
//! - The API is a pure function of `(normalized_text, config)`: no I/O, no
//!   clocks, no global state.
//!
//! Invariant: for the same text and the same [`PerceptualConfig`], the
//! fingerprint is bit-identical across runs and machines.
//!
//! ## Pipeline
//!
//! 1.  **Shingling**: the text is cut into overlapping character windows of
//!     `shingle_len` characters. Text shorter than a window is used whole.
//! 2.  **SimHash**: every shingle is hashed with seeded xxh3 and votes on each
//!     fingerprint bit; the majority decides the bit.
//!
//! ```
//! use perceptual::{fingerprint_text, PerceptualConfig};
//!
//! let cfg = PerceptualConfig::default();
//! let a = fingerprint_text("starbucks coffee", &cfg).unwrap();
//! let b = fingerprint_text("starbucks coffee", &cfg).unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.value() >> cfg.bits, 0);
//! ```

pub mod config;
pub mod fingerprint;
mod shingles;
mod simhash;

pub use crate::config::{PerceptualConfig, PerceptualError, MAX_FINGERPRINT_BITS};
pub use crate::fingerprint::Fingerprint;
pub use crate::shingles::char_shingles;
pub use crate::simhash::simhash;

/// Current perceptual algorithm version for this crate.
pub const PERCEPTUAL_VERSION: u16 = 1;

/// Human-readable algorithm identifier.
pub const PERCEPTUAL_ALGORITHM: &str = "charshingle_xxh3_simhash_v1";

/// Fingerprint an already shingled feature list.
pub fn fingerprint_shingles<S>(
    shingles: &[S],
    cfg: &PerceptualConfig,
) -> Result<Fingerprint, PerceptualError>
where
    S: AsRef<str>,
{
    cfg.validate()?;
    Ok(simhash(shingles, cfg.bits, cfg.seed))
}

/// Shingle and fingerprint normalized text.
pub fn fingerprint_text(normalized: &str, cfg: &PerceptualConfig) -> Result<Fingerprint, PerceptualError> {
    cfg.validate()?;
    let shingles = char_shingles(normalized, cfg.shingle_len);
    Ok(simhash(&shingles, cfg.bits, cfg.seed))
}
