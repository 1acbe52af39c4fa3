//! SimHash over shingle features.
//!
//! Each shingle is hashed to 64 bits with seeded xxh3. Every fingerprint bit
//! keeps a signed vote: +1 when the shingle hash has that bit set, -1
//! otherwise. A bit of the fingerprint is set when its vote is strictly
//! positive. Repeated shingles vote repeatedly. Summation commutes, so the
//! fingerprint does not depend on shingle order.

use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::config::MAX_FINGERPRINT_BITS;
use crate::fingerprint::Fingerprint;

/// Compute a `bits`-wide SimHash of `shingles`.
///
/// `bits` is clamped to `1..=64`; callers go through
/// [`crate::PerceptualConfig::validate`] first.
pub fn simhash<S: AsRef<str>>(shingles: &[S], bits: u32, seed: u64) -> Fingerprint {
    let bits = bits.clamp(1, MAX_FINGERPRINT_BITS) as usize;
    let mut votes = [0i64; MAX_FINGERPRINT_BITS as usize];

    for shingle in shingles {
        let h = xxh3_64_with_seed(shingle.as_ref().as_bytes(), seed);
        for (i, vote) in votes.iter_mut().take(bits).enumerate() {
            if (h >> i) & 1 == 1 {
                *vote += 1;
            } else {
                *vote -= 1;
            }
        }
    }

    let mut out = 0u64;
    for (i, &vote) in votes.iter().take(bits).enumerate() {
        if vote > 0 {
            out |= 1u64 << i;
        }
    }
    Fingerprint(out)
}
