// Metrics hooks for vendor extraction.
//
// A `VendorExtractor` built with `with_metrics` reports latency, hit counts
// and the decision of every `extract_vendor` call to the installed
// observer. This keeps instrumentation decoupled from any metrics backend.
use std::time::Duration;

/// Metrics observer for extraction calls.
pub trait ExtractMetrics: Send + Sync {
    /// Record the outcome of one extraction.
    ///
    /// `near_duplicates` is the number of index hits, `candidates` the number
    /// of hits the resolver could name, and `matched` whether a vendor id was
    /// returned.
    fn record_extraction(
        &self,
        latency: Duration,
        near_duplicates: usize,
        candidates: usize,
        matched: bool,
    );
}
