use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use index::{
    BuilderConfig, EntryId, IndexEntry, ModelBuilder, ModelMeta, NearDupIndex, TrainingRecord,
    MODEL_SCHEMA_VERSION,
};
use perceptual::{fingerprint_text, PerceptualConfig};

use crate::resolver::{InMemoryResolver, ResolveError};

/// A model whose every entry carries the fingerprint of `normalized_query`,
/// so a lookup for that query returns all of `ids` regardless of hashing.
fn model_answering(normalized_query: &str, ids: &[EntryId]) -> Arc<VendorModel> {
    let cfg = PerceptualConfig::default();
    let fingerprint = fingerprint_text(normalized_query, &cfg).unwrap();
    let index = NearDupIndex::build(
        cfg.bits,
        3,
        ids.iter().map(|&id| IndexEntry { id, fingerprint }),
    )
    .unwrap();
    let meta = ModelMeta {
        schema_version: MODEL_SCHEMA_VERSION,
        algorithm: perceptual::PERCEPTUAL_ALGORITHM.to_string(),
        normalizer_version: canonical::NORMALIZER_VERSION,
        perceptual: cfg,
        tolerance: 3,
        entry_count: ids.len() as u64,
    };
    Arc::new(VendorModel::new(meta, index).unwrap())
}

fn resolver_of(names: &[(EntryId, &str, VendorId)]) -> InMemoryResolver {
    names
        .iter()
        .map(|&(id, name, vendor)| ResolvedName::new(id, name, vendor))
        .collect()
}

fn extractor(
    normalized_query: &str,
    names: &[(EntryId, &str, VendorId)],
) -> VendorExtractor {
    let ids: Vec<EntryId> = names.iter().map(|n| n.0).collect();
    VendorExtractor::new(
        model_answering(normalized_query, &ids),
        resolver_of(names),
        MatchConfig::default(),
    )
    .unwrap()
}

struct FailingResolver;

impl Resolver for FailingResolver {
    fn resolve(&self, _ids: &[EntryId]) -> Result<Vec<ResolvedName>, ResolveError> {
        Err(ResolveError::backend("connection reset"))
    }
}

#[derive(Default)]
struct CountingResolver {
    calls: AtomicUsize,
}

impl Resolver for CountingResolver {
    fn resolve(&self, _ids: &[EntryId]) -> Result<Vec<ResolvedName>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct RecordingMetrics {
    events: Mutex<Vec<(usize, usize, bool)>>,
}

impl ExtractMetrics for RecordingMetrics {
    fn record_extraction(
        &self,
        _latency: Duration,
        near_duplicates: usize,
        candidates: usize,
        matched: bool,
    ) {
        self.events
            .lock()
            .unwrap()
            .push((near_duplicates, candidates, matched));
    }
}

#[test]
fn extractor_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<VendorExtractor>();
}

#[test]
fn substring_match_outscores_longer_name_among_hits() {
    let ex = extractor(
        "starbucks 4521",
        &[(1, "starbucks", 7), (3, "starbucks coffee", 8), (2, "shell oil", 9)],
    );
    let trace = ex.explain(Some("STARBUCKS #4521")).unwrap();
    assert_eq!(trace.normalized, "starbucks 4521");
    assert_eq!(trace.decision, Some(7));

    let scores: Vec<(EntryId, u8)> = trace.candidates.iter().map(|c| (c.id, c.score)).collect();
    assert_eq!(scores[0], (1, 100));
    assert_eq!(scores[1], (3, 71));
    assert_eq!(ex.extract_vendor(Some("STARBUCKS #4521")).unwrap(), Some(7));
}

fn starbucks_model(tolerance: u32) -> Arc<VendorModel> {
    let builder = ModelBuilder::new(BuilderConfig::default().with_tolerance(tolerance)).unwrap();
    let model = builder
        .build_from_records(vec![
            TrainingRecord::new(1, "starbucks coffee"),
            TrainingRecord::new(2, "starbucks"),
        ])
        .unwrap();
    Arc::new(model)
}

fn starbucks_names() -> InMemoryResolver {
    resolver_of(&[(1, "starbucks coffee", 10), (2, "starbucks", 20)])
}

#[test]
fn store_number_sits_beyond_default_tolerance() {
    let model = starbucks_model(3);
    assert_eq!(model.perceptual().bits, 32);
    let query = model.fingerprint("starbucks 4521");
    let distances: Vec<u32> = model
        .index()
        .entries()
        .iter()
        .map(|e| e.fingerprint.hamming_distance(query))
        .collect();
    assert_eq!(distances, vec![6, 5]);

    let ex = VendorExtractor::new(model, starbucks_names(), MatchConfig::default()).unwrap();
    let trace = ex.explain(Some("STARBUCKS #4521")).unwrap();
    assert_eq!(trace.normalized, "starbucks 4521");
    assert!(trace.near_duplicates.is_empty());
    assert_eq!(trace.decision, None);
}

#[test]
fn store_number_maps_to_shorter_name_at_tolerance_6() {
    let ex = VendorExtractor::new(starbucks_model(6), starbucks_names(), MatchConfig::default())
        .unwrap();
    let trace = ex.explain(Some("STARBUCKS #4521")).unwrap();

    let hits: Vec<(EntryId, u32)> = trace.near_duplicates.iter().map(|h| (h.id, h.distance)).collect();
    assert_eq!(hits, vec![(2, 5), (1, 6)]);
    let scores: Vec<(EntryId, u8, bool)> = trace
        .candidates
        .iter()
        .map(|c| (c.id, c.score, c.exact))
        .collect();
    assert_eq!(scores, vec![(2, 100, false), (1, 71, false)]);
    assert_eq!(trace.decision, Some(20));
}

#[test]
fn distant_query_over_trained_model_never_resolves() {
    let builder = ModelBuilder::new(BuilderConfig::default()).unwrap();
    let model = builder
        .build_from_records(vec![
            TrainingRecord::new(1, "starbucks coffee"),
            TrainingRecord::new(2, "starbucks"),
            TrainingRecord::new(3, "shell oil"),
        ])
        .unwrap();
    let query = model.fingerprint("netflix com");
    for entry in model.index().entries() {
        assert!(entry.fingerprint.hamming_distance(query) > model.tolerance());
        for slice in model.index().slices() {
            assert_ne!(
                entry.fingerprint.bit_slice(slice.offset, slice.width),
                query.bit_slice(slice.offset, slice.width)
            );
        }
    }

    let resolver = Arc::new(CountingResolver::default());
    let ex = VendorExtractor::with_resolver_arc(Arc::new(model), resolver.clone(), MatchConfig::default())
        .unwrap();
    let trace = ex.explain(Some("NETFLIX.COM")).unwrap();
    assert!(trace.near_duplicates.is_empty());
    assert_eq!(trace.decision, None);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn score_of_80_is_accepted() {
    let ex = extractor("abcde", &[(1, "abcdx", 5)]);
    let trace = ex.explain(Some("abcde")).unwrap();
    assert_eq!(trace.winner.as_ref().map(|w| w.score), Some(80));
    assert_eq!(trace.decision, Some(5));
}

#[test]
fn score_of_79_is_rejected() {
    let query = "abcdefghijklmnopqrs";
    let ex = extractor(query, &[(1, "abcdefghijklmnoxyzw", 5)]);
    let trace = ex.explain(Some(query)).unwrap();
    assert_eq!(trace.winner.as_ref().map(|w| w.score), Some(79));
    assert_eq!(trace.decision, None);
    assert_eq!(ex.extract_vendor(Some(query)).unwrap(), None);
}

#[test]
fn exact_name_wins_over_lower_id_full_score() {
    let ex = extractor("starbucks", &[(2, "starbucks coffee", 20), (5, "starbucks", 50)]);
    let trace = ex.explain(Some("Starbucks")).unwrap();
    assert!(trace.candidates.iter().all(|c| c.score == 100));
    let winner = trace.winner.unwrap();
    assert!(winner.exact);
    assert_eq!(winner.id, 5);
    assert_eq!(trace.decision, Some(50));
}

#[test]
fn equal_scores_go_to_lowest_id() {
    let ex = extractor(
        "starbucks",
        &[(9, "starbucks coffee", 90), (4, "starbucks reserve", 40)],
    );
    assert_eq!(ex.extract_vendor(Some("starbucks")).unwrap(), Some(40));
}

#[test]
fn no_near_duplicates_means_no_match_without_resolving() {
    let cfg = PerceptualConfig::default();
    let index = NearDupIndex::build(cfg.bits, 0, Vec::new()).unwrap();
    let meta = ModelMeta {
        schema_version: MODEL_SCHEMA_VERSION,
        algorithm: perceptual::PERCEPTUAL_ALGORITHM.to_string(),
        normalizer_version: canonical::NORMALIZER_VERSION,
        perceptual: cfg,
        tolerance: 0,
        entry_count: 0,
    };
    let model = Arc::new(VendorModel::new(meta, index).unwrap());
    let resolver = Arc::new(CountingResolver::default());
    let ex = VendorExtractor::with_resolver_arc(model, resolver.clone(), MatchConfig::default())
        .unwrap();

    let trace = ex.explain(Some("unknown merchant 9999")).unwrap();
    assert!(trace.near_duplicates.is_empty());
    assert_eq!(trace.decision, None);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn unresolvable_hits_mean_no_match() {
    let resolver = Arc::new(CountingResolver::default());
    let ex = VendorExtractor::with_resolver_arc(
        model_answering("shell oil", &[1, 2]),
        resolver.clone(),
        MatchConfig::default(),
    )
    .unwrap();
    assert_eq!(ex.extract_vendor(Some("SHELL OIL")).unwrap(), None);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn resolver_failure_propagates() {
    let ex = VendorExtractor::new(
        model_answering("shell oil", &[1]),
        FailingResolver,
        MatchConfig::default(),
    )
    .unwrap();
    let err = ex.extract_vendor(Some("shell oil")).unwrap_err();
    assert!(matches!(err, ExtractError::Resolve(ResolveError::Backend(_))));
}

#[test]
fn names_for_ids_not_asked_for_are_ignored() {
    let mut resolver = resolver_of(&[(1, "abcdx", 5)]);
    resolver.insert(ResolvedName::new(77, "abcde", 77));
    let ex = VendorExtractor::new(
        model_answering("abcde", &[1]),
        resolver,
        MatchConfig::default(),
    )
    .unwrap();
    let trace = ex.explain(Some("abcde")).unwrap();
    assert_eq!(trace.candidates.len(), 1);
    assert_eq!(trace.decision, Some(5));
}

#[test]
fn absent_description_is_matched_as_none() {
    let ex = extractor("none", &[(1, "none", 3)]);
    let trace = ex.explain(None).unwrap();
    assert_eq!(trace.normalized, "none");
    assert_eq!(trace.decision, Some(3));
}

#[test]
fn custom_threshold_is_honoured() {
    let ids = [1];
    let ex = VendorExtractor::new(
        model_answering("abcde", &ids),
        resolver_of(&[(1, "abcdx", 5)]),
        MatchConfig::default().with_threshold(81),
    )
    .unwrap();
    assert_eq!(ex.extract_vendor(Some("abcde")).unwrap(), None);
}

#[test]
fn invalid_threshold_is_rejected_at_construction() {
    let result = VendorExtractor::new(
        model_answering("abcde", &[1]),
        InMemoryResolver::new(),
        MatchConfig::default().with_threshold(150),
    );
    assert!(matches!(result, Err(ExtractError::InvalidConfig(_))));
}

#[test]
fn metrics_observe_every_call() {
    let metrics = Arc::new(RecordingMetrics::default());
    let ex = extractor("starbucks", &[(1, "starbucks", 7)]).with_metrics(metrics.clone());
    ex.extract_vendor(Some("starbucks")).unwrap();
    ex.extract_vendor(Some("starbucks")).unwrap();
    let events = metrics.events.lock().unwrap();
    assert_eq!(events.as_slice(), &[(1, 1, true), (1, 1, true)]);
}

#[test]
fn trained_model_finds_identical_names() {
    let builder = ModelBuilder::new(BuilderConfig::default()).unwrap();
    let model = builder
        .build_from_records(vec![
            TrainingRecord::new(1, "starbucks"),
            TrainingRecord::new(2, "shell oil"),
            TrainingRecord::new(3, "amazon mktplace pmts"),
        ])
        .unwrap();
    let resolver = resolver_of(&[
        (1, "starbucks", 100),
        (2, "shell oil", 200),
        (3, "amazon mktplace pmts", 300),
    ]);
    let ex = VendorExtractor::new(Arc::new(model), resolver, MatchConfig::default()).unwrap();

    assert_eq!(ex.extract_vendor(Some("SHELL  OIL")).unwrap(), Some(200));
    assert_eq!(
        ex.extract_vendor(Some("Amazon Mktplace Pmts")).unwrap(),
        Some(300)
    );
}
