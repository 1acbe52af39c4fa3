use crate::artifact::ArtifactError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tempfile::NamedTempFile;
use tracing::debug;

/// Default object name of the vendor model.
pub const VENDOR_MODEL_ARTIFACT: &str = "vendor_model.bin";

/// Whole-object storage for model artifacts.
///
/// `put` replaces the object in one step; a concurrent `get` sees either the
/// old bytes or the new ones, never a mix.
pub trait ArtifactStore: Send + Sync {
    /// Write (or overwrite) the object called `name`.
    fn put(&self, name: &ArtifactName, bytes: &[u8]) -> Result<(), ArtifactError>;
    /// Read the object called `name`, `None` when it does not exist.
    fn get(&self, name: &ArtifactName) -> Result<Option<Vec<u8>>, ArtifactError>;
}

/// Name of a stored artifact: a single path segment such as `vendor_model.bin`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactName(String);

impl ArtifactName {
    pub fn new(name: impl Into<String>) -> Result<Self, ArtifactError> {
        let name = name.into();
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && !name.chars().any(char::is_control);
        if valid {
            Ok(Self(name))
        } else {
            Err(ArtifactError::Store(format!(
                "invalid artifact name {name:?}"
            )))
        }
    }

    /// The vendor model under its default name.
    pub fn vendor_model() -> Self {
        Self(VENDOR_MODEL_ARTIFACT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ArtifactName {
    fn default() -> Self {
        Self::vendor_model()
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ArtifactName {
    type Error = ArtifactError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ArtifactName> for String {
    fn from(name: ArtifactName) -> Self {
        name.0
    }
}

/// Configuration for selecting and building an artifact store.
///
/// # Example
/// ```
/// use index::StoreConfig;
///
/// let config: StoreConfig = serde_yaml::from_str("kind: local\ndir: /var/lib/vendorid").unwrap();
/// assert_eq!(config, StoreConfig::local("/var/lib/vendorid"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Files in a local directory.
    Local { dir: PathBuf },
    /// Process memory, for tests and one-shot runs.
    #[default]
    InMemory,
    /// An HTTP object store addressed as `{base_url}/{name}`.
    ///
    /// Requires the `remote` feature at compile time.
    Remote { base_url: String },
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        StoreConfig::InMemory
    }

    pub fn local<P: Into<PathBuf>>(dir: P) -> Self {
        StoreConfig::Local { dir: dir.into() }
    }

    pub fn remote<S: Into<String>>(base_url: S) -> Self {
        StoreConfig::Remote {
            base_url: base_url.into(),
        }
    }

    /// Build the store described by this configuration.
    pub fn build(&self) -> Result<Box<dyn ArtifactStore>, ArtifactError> {
        match self {
            StoreConfig::InMemory => Ok(Box::new(InMemoryStore::new())),
            StoreConfig::Local { dir } => Ok(Box::new(LocalStore::open(dir)?)),
            StoreConfig::Remote { base_url } => {
                #[cfg(feature = "remote")]
                {
                    Ok(Box::new(HttpStore::new(base_url)?))
                }
                #[cfg(not(feature = "remote"))]
                {
                    let _ = base_url;
                    Err(ArtifactError::store("remote store disabled at compile time"))
                }
            }
        }
    }
}

/// An in-memory store using a `RwLock` around a `HashMap`.
#[derive(Default)]
pub struct InMemoryStore {
    objects: RwLock<std::collections::HashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactStore for InMemoryStore {
    fn put(&self, name: &ArtifactName, bytes: &[u8]) -> Result<(), ArtifactError> {
        self.objects
            .write()
            .map_err(|_| ArtifactError::store("poisoned lock"))?
            .insert(name.as_str().to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, name: &ArtifactName) -> Result<Option<Vec<u8>>, ArtifactError> {
        let guard = self
            .objects
            .read()
            .map_err(|_| ArtifactError::store("poisoned lock"))?;
        Ok(guard.get(name.as_str()).cloned())
    }
}

/// Artifacts stored as files in one directory.
///
/// Each write goes to its own uniquely named temporary sibling, is synced
/// to disk and then renamed over the artifact.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Use `dir`, creating it when missing.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            ArtifactError::Store(format!("cannot create {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &ArtifactName) -> PathBuf {
        self.dir.join(name.as_str())
    }
}

impl ArtifactStore for LocalStore {
    fn put(&self, name: &ArtifactName, bytes: &[u8]) -> Result<(), ArtifactError> {
        let target = self.path_of(name);
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| {
            ArtifactError::Store(format!("cannot create temp file in {}: {e}", self.dir.display()))
        })?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| ArtifactError::Store(format!("cannot write {}: {e}", tmp.path().display())))?;
        tmp.persist(&target).map_err(|e| {
            ArtifactError::Store(format!("cannot move artifact to {}: {}", target.display(), e.error))
        })?;
        debug!(path = %target.display(), bytes = bytes.len(), "artifact written");
        Ok(())
    }

    fn get(&self, name: &ArtifactName) -> Result<Option<Vec<u8>>, ArtifactError> {
        let path = self.path_of(name);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ArtifactError::Store(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(feature = "remote")]
mod http;

#[cfg(feature = "remote")]
pub use http::HttpStore;
