//! Batch extraction with per-record outcomes.
//!
//! A failing record is recorded in the report and never aborts the batch.

use std::time::{Duration, Instant};

use matcher::{ExtractError, VendorExtractor, VendorId};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, warn};

/// What happened to one input description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Matched(VendorId),
    NoMatch,
    Failed(ExtractError),
}

impl RecordOutcome {
    pub fn vendor_id(&self) -> Option<VendorId> {
        match self {
            RecordOutcome::Matched(vendor) => Some(*vendor),
            _ => None,
        }
    }
}

impl From<Result<Option<VendorId>, ExtractError>> for RecordOutcome {
    fn from(result: Result<Option<VendorId>, ExtractError>) -> Self {
        match result {
            Ok(Some(vendor)) => RecordOutcome::Matched(vendor),
            Ok(None) => RecordOutcome::NoMatch,
            Err(err) => RecordOutcome::Failed(err),
        }
    }
}

/// Outcomes of a batch, one per input and in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<RecordOutcome>,
    pub matched: usize,
    pub no_match: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl BatchReport {
    fn from_outcomes(outcomes: Vec<RecordOutcome>, elapsed: Duration) -> Self {
        let mut report = BatchReport {
            elapsed,
            ..Default::default()
        };
        for outcome in &outcomes {
            match outcome {
                RecordOutcome::Matched(_) => report.matched += 1,
                RecordOutcome::NoMatch => report.no_match += 1,
                RecordOutcome::Failed(_) => report.failed += 1,
            }
        }
        report.outcomes = outcomes;
        report
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Extract a vendor for every description.
///
/// With the `parallel` feature and `parallel == true` the records are spread
/// over the rayon pool; the report keeps input order either way.
pub fn extract_batch<S>(
    extractor: &VendorExtractor,
    descriptions: &[Option<S>],
    parallel: bool,
) -> BatchReport
where
    S: AsRef<str> + Sync,
{
    let started = Instant::now();
    let run = |(position, description): (usize, &Option<S>)| {
        let raw: Option<&str> = description.as_ref().map(|s| s.as_ref());
        let outcome = RecordOutcome::from(extractor.extract_vendor(raw));
        if let RecordOutcome::Failed(err) = &outcome {
            warn!(position, error = %err, "vendor extraction failed");
        }
        outcome
    };

    #[cfg(feature = "parallel")]
    let outcomes: Vec<RecordOutcome> = if parallel {
        descriptions.par_iter().enumerate().map(run).collect()
    } else {
        descriptions.iter().enumerate().map(run).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<RecordOutcome> = {
        let _ = parallel;
        descriptions.iter().enumerate().map(run).collect()
    };

    let report = BatchReport::from_outcomes(outcomes, started.elapsed());
    info!(
        records = report.len(),
        matched = report.matched,
        no_match = report.no_match,
        failed = report.failed,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "batch extraction finished"
    );
    report
}
