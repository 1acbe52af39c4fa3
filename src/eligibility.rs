//! Training-name eligibility rules.
//!
//! Generic banking phrases ("payment", "online transfer", "atm withdrawal")
//! name no vendor. Indexing them only produces confident wrong answers, so
//! a corpus can be read with these rules to drop them before training.
//! Rules match normalized names.

use serde::{Deserialize, Serialize};

const EXCLUDED_NAMES: &[&str] = &[
    "funds transfer", "check", "transfer from", "transfer to", "pension", "deposit", "loans",
    "payment", "dividend", "transfer to savings", "dirdep", "dir dep", "trnsfr",
    "fee service charge", "pr payment", "savings", "transfer", "direct dep", "reg salary",
    "salary", "teller deposit", "autopay payment", "ach electronic debit paypal inst xfer",
    "recurring transfer", "foreign fee", "online transfer", "online pmt",
    "online banking transfer", "epayment", "online transfer to", "online pmt to",
    "online banking transfer to", "dir dep dir dep",
    "payment check 2789 fpl payment ctr bill pymt", "recurring transfer to", "payment da",
    "interest payment", "ach electronic debit check pymt", "ach electronic debit on",
    "access check check check", "incoming wire transfer", "online transfer to savings",
    "ach electronic debit bp check pymt", "transfer to savings savings",
    "transfer from savings savings", "payment mobl", "withdrawal", "payment cbol",
    "ach electronic credit cash reward", "financial bill payment", "bill payment",
];

const EXCLUDED_PREFIXES: &[&str] = &[
    "home mtg", "mortgage", "foreign transaction fee", "mtg pmt", "nfcu ach",
    "ach electronic debit payment", "benefit payment",
];

const EXCLUDED_FRAGMENTS: &[&str] = &[
    "mortgage", "cash withdrawal", "payroll", "paypal", "atm withdrawal", "withdrawal atm",
];

/// Which normalized names may enter the index.
///
/// A name is ineligible when it is empty, equals one of `excluded_names`,
/// starts with one of `excluded_prefixes` or contains one of
/// `excluded_fragments`. Each list defaults to the built-in banking terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityRules {
    pub excluded_names: Vec<String>,
    pub excluded_prefixes: Vec<String>,
    pub excluded_fragments: Vec<String>,
}

impl Default for EligibilityRules {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            excluded_names: owned(EXCLUDED_NAMES),
            excluded_prefixes: owned(EXCLUDED_PREFIXES),
            excluded_fragments: owned(EXCLUDED_FRAGMENTS),
        }
    }
}

impl EligibilityRules {
    /// Rules that only reject empty names.
    pub fn empty() -> Self {
        Self {
            excluded_names: Vec::new(),
            excluded_prefixes: Vec::new(),
            excluded_fragments: Vec::new(),
        }
    }

    pub fn is_eligible(&self, normalized: &str) -> bool {
        if normalized.is_empty() {
            return false;
        }
        if self.excluded_names.iter().any(|n| n == normalized) {
            return false;
        }
        if self.excluded_prefixes.iter().any(|p| normalized.starts_with(p.as_str())) {
            return false;
        }
        !self
            .excluded_fragments
            .iter()
            .any(|f| normalized.contains(f.as_str()))
    }
}
