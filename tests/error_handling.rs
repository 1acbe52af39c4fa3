use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use vendorid::{
    ArtifactError, ArtifactName, BuildError, CorpusReader, InMemoryResolver, InMemoryStore,
    LocalStore, ModelCache, NameColumn, ServiceError, StoreConfig, TrainingRecord, VendorIdConfig,
    VendorService,
};

fn empty_resolver() -> Arc<InMemoryResolver> {
    Arc::new(InMemoryResolver::new())
}

fn local_service(dir: &TempDir) -> VendorService {
    VendorService::new(
        Box::new(LocalStore::open(dir.path()).unwrap()),
        ArtifactName::default(),
        empty_resolver(),
        Arc::new(ModelCache::new()),
    )
}

#[test]
fn missing_artifact_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = local_service(&dir).extract_vendor(Some("starbucks")).unwrap_err();
    assert!(matches!(err, ServiceError::Load(ArtifactError::Missing(_))));
}

#[test]
fn corrupt_artifact_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("vendor_model.bin"), b"not a model at all, just bytes").unwrap();
    let err = local_service(&dir).load().unwrap_err();
    assert!(matches!(err, ServiceError::Load(ArtifactError::Corrupt(_))));
}

#[test]
fn flipped_payload_byte_fails_the_checksum() {
    let dir = TempDir::new().unwrap();
    let service = local_service(&dir);
    service
        .rebuild(vec![Ok::<_, std::io::Error>(TrainingRecord::new(1, "starbucks"))])
        .unwrap();

    let path = dir.path().join("vendor_model.bin");
    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    fs::write(&path, bytes).unwrap();

    let err = local_service(&dir).load().unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Load(ArtifactError::ChecksumMismatch { .. })
    ));
}

#[test]
fn failed_load_can_be_retried() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(ModelCache::new());
    let service = VendorService::new(
        Box::new(LocalStore::open(dir.path()).unwrap()),
        ArtifactName::default(),
        empty_resolver(),
        Arc::clone(&cache),
    );
    assert!(service.load().is_err());
    assert!(!cache.is_loaded());

    service
        .rebuild(vec![Ok::<_, std::io::Error>(TrainingRecord::new(1, "starbucks"))])
        .unwrap();
    assert!(service.load().is_ok());
    assert!(cache.is_loaded());
}

#[test]
fn extract_before_load_is_model_not_loaded() {
    let service = VendorService::new(
        Box::new(InMemoryStore::new()),
        ArtifactName::default(),
        empty_resolver(),
        Arc::new(ModelCache::new()),
    );
    assert!(matches!(
        service.loaded_extractor(),
        Err(ServiceError::ModelNotLoaded)
    ));
}

#[test]
fn malformed_corpus_row_aborts_the_build() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("bad.csv");
    fs::write(&corpus, "id,normalized_name,vendor_id\n1,starbucks,10\nx,shell,20\n").unwrap();

    let service = local_service(&dir);
    let records = CorpusReader::open(&corpus, NameColumn::Normalized)
        .unwrap()
        .training_records();
    let err = service.rebuild(records).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Build(BuildError::Corpus { processed: 1, .. })
    ));
    assert!(!dir.path().join("vendor_model.bin").exists());
}

#[test]
fn invalid_config_is_rejected_before_wiring() {
    let mut cfg = VendorIdConfig::default();
    cfg.matcher.threshold = 150;
    cfg.store.backend = StoreConfig::in_memory();
    let err = VendorService::from_config(&cfg, empty_resolver(), Arc::new(ModelCache::new()))
        .err()
        .unwrap();
    assert!(matches!(err, ServiceError::Config(_)));
}
