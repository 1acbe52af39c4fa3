//! Transaction description normalization.
//!
//! Turns free-text card and bank descriptions such as
//! `"STARBUCKS #4521 01/15 SEATTLE"` into a canonical token string
//! (`"starbucks 4521 seattle"`) that the fingerprinting and matching stages
//! can compare. Both the training corpus and serving-time queries go through
//! the same function, so any change to the rules requires a model rebuild;
//! [`NORMALIZER_VERSION`] is recorded in every model artifact for that reason.
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock, no locale. Normalization is total: every string input
//! yields a (possibly empty) output, and the output is a fixed point of the
//! normalizer.
//!
//! ```rust
//! use canonical::normalize_transaction_name;
//!
//! assert_eq!(
//!     normalize_transaction_name("POS XXXX XXXX1234 Wal-Mart 12/24"),
//!     "pos xxxx1234 walmart"
//! );
//! ```

mod normalize;
mod whitespace;

pub use crate::normalize::{normalize_description, normalize_transaction_name, ABSENT_DESCRIPTION};
pub use crate::whitespace::{collapse_whitespace, tokens};

/// Bumped whenever a rule change can alter normalized output.
pub const NORMALIZER_VERSION: u32 = 1;
