use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use canonical::normalize_description;
use index::VendorModel;
use tracing::debug;

use crate::metrics::ExtractMetrics;
use crate::resolver::{ResolvedName, Resolver, VendorId};
use crate::similarity::partial_ratio;
use crate::types::{Candidate, ExtractError, Extraction, MatchConfig, EXACT_MATCH_SCORE};

#[cfg(test)]
mod tests;

/// Serving-time vendor extraction over a shared, read-only model.
///
/// Cheap to clone; clones share the model, resolver and metrics observer.
#[derive(Clone)]
pub struct VendorExtractor {
    model: Arc<VendorModel>,
    resolver: Arc<dyn Resolver>,
    cfg: MatchConfig,
    metrics: Option<Arc<dyn ExtractMetrics>>,
}

impl VendorExtractor {
    /// Construct an extractor from a shared model and a resolver.
    pub fn new<R>(model: Arc<VendorModel>, resolver: R, cfg: MatchConfig) -> Result<Self, ExtractError>
    where
        R: Resolver + 'static,
    {
        Self::with_resolver_arc(model, Arc::new(resolver), cfg)
    }

    /// Construct an extractor from a shared resolver handle.
    pub fn with_resolver_arc(
        model: Arc<VendorModel>,
        resolver: Arc<dyn Resolver>,
        cfg: MatchConfig,
    ) -> Result<Self, ExtractError> {
        cfg.validate()?;
        Ok(Self {
            model,
            resolver,
            cfg,
            metrics: None,
        })
    }

    /// Report every extraction to `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn ExtractMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn model(&self) -> &Arc<VendorModel> {
        &self.model
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Vendor of a raw transaction description, or `None` when nothing in
    /// the model is close enough.
    pub fn extract_vendor(&self, raw: Option<&str>) -> Result<Option<VendorId>, ExtractError> {
        Ok(self.explain(raw)?.decision)
    }

    /// Run an extraction and return every intermediate result.
    pub fn explain(&self, raw: Option<&str>) -> Result<Extraction, ExtractError> {
        let started = Instant::now();
        let normalized = normalize_description(raw);
        let fingerprint = self.model.fingerprint(&normalized);
        let near_duplicates = self.model.lookup_fingerprint(fingerprint);

        let mut candidates = Vec::new();
        if !near_duplicates.is_empty() {
            let ids: Vec<_> = near_duplicates.iter().map(|hit| hit.id).collect();
            let resolved = self.resolver.resolve(&ids)?;
            candidates = score_candidates(&normalized, resolved, &ids);
        }

        let winner = select_winner(&candidates);
        let decision = winner
            .as_ref()
            .filter(|w| self.cfg.accepts(w.score))
            .map(|w| w.vendor_id);
        let elapsed = started.elapsed();

        debug!(
            normalized = %normalized,
            fingerprint = %fingerprint,
            near_duplicates = near_duplicates.len(),
            candidates = candidates.len(),
            winner = ?winner.as_ref().map(|w| (w.id, w.score)),
            decision = ?decision,
            elapsed_us = elapsed.as_micros() as u64,
            "vendor extraction"
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_extraction(
                elapsed,
                near_duplicates.len(),
                candidates.len(),
                decision.is_some(),
            );
        }

        Ok(Extraction {
            normalized,
            fingerprint,
            near_duplicates,
            candidates,
            winner,
            decision,
            elapsed,
        })
    }
}

/// Score resolved names against the normalized query.
///
/// Names the resolver returns for ids that were not asked for, and repeated
/// ids, are ignored. The result is ordered best first.
fn score_candidates(normalized: &str, resolved: Vec<ResolvedName>, asked: &[u64]) -> Vec<Candidate> {
    let asked: HashSet<u64> = asked.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut out: Vec<Candidate> = resolved
        .into_iter()
        .filter(|r| asked.contains(&r.id) && seen.insert(r.id))
        .map(|r| {
            let exact = r.name == normalized;
            let score = if exact {
                EXACT_MATCH_SCORE
            } else {
                partial_ratio(&r.name, normalized)
            };
            Candidate {
                id: r.id,
                name: r.name,
                vendor_id: r.vendor_id,
                score,
                exact,
            }
        })
        .collect();
    out.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
    out
}

/// An exact name match wins outright; otherwise the highest score, ties to
/// the lowest id.
fn select_winner(ranked: &[Candidate]) -> Option<Candidate> {
    ranked
        .iter()
        .filter(|c| c.exact)
        .min_by_key(|c| c.id)
        .or_else(|| ranked.first())
        .cloned()
}
