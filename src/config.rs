//! YAML configuration file support.
//!
//! One file describes every stage: fingerprinting parameters, index
//! tolerance, artifact compression, the acceptance threshold, build logging,
//! how the training corpus is read and where the model artifact lives.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "production"
//!
//! perceptual:
//!   version: 1
//!   shingle_len: 3
//!   bits: 32
//!   seed: 17297687000019483309
//!
//! index:
//!   tolerance: 3
//!   compression:
//!     codec: zstd
//!     level: 3
//!
//! matcher:
//!   threshold: 80
//!
//! builder:
//!   progress_every: 50000
//!
//! batch:
//!   parallel: true
//!
//! corpus:
//!   raw_names: false
//!   eligible_only: true
//!
//! store:
//!   artifact: vendor_model.bin
//!   backend:
//!     kind: local
//!     dir: /var/lib/vendorid
//! ```

use std::fs::{self, File};
use std::path::Path;

use index::{ArtifactName, BuilderConfig, CompressionConfig, StoreConfig};
use matcher::MatchConfig;
use perceptual::PerceptualConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::corpus::{CorpusError, CorpusReader, NameColumn};
use crate::eligibility::EligibilityRules;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VendorIdConfig {
    /// Configuration format version
    #[serde(default = "default_config_version")]
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub perceptual: PerceptualConfig,

    #[serde(default)]
    pub index: IndexYamlConfig,

    #[serde(default)]
    pub matcher: MatchConfig,

    #[serde(default)]
    pub builder: BuilderYamlConfig,

    #[serde(default)]
    pub batch: BatchYamlConfig,

    #[serde(default)]
    pub corpus: CorpusYamlConfig,

    #[serde(default)]
    pub store: StoreYamlConfig,
}

impl VendorIdConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: VendorIdConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.builder_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.matcher
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.index.validate()?;
        Ok(())
    }

    /// Parameters for [`index::ModelBuilder`].
    pub fn builder_config(&self) -> BuilderConfig {
        BuilderConfig::default()
            .with_perceptual(self.perceptual.clone())
            .with_tolerance(self.index.tolerance)
            .with_progress_every(self.builder.progress_every)
    }
}

impl Default for VendorIdConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            name: None,
            perceptual: PerceptualConfig::default(),
            index: IndexYamlConfig::default(),
            matcher: MatchConfig::default(),
            builder: BuilderYamlConfig::default(),
            batch: BatchYamlConfig::default(),
            corpus: CorpusYamlConfig::default(),
            store: StoreYamlConfig::default(),
        }
    }
}

/// Index YAML configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexYamlConfig {
    #[serde(default = "default_tolerance")]
    pub tolerance: u32,

    #[serde(default)]
    pub compression: CompressionConfig,
}

impl IndexYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        self.compression
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("index.compression: {e}")))
    }
}

impl Default for IndexYamlConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            compression: CompressionConfig::default(),
        }
    }
}

/// Builder YAML configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderYamlConfig {
    #[serde(default = "default_progress_every")]
    pub progress_every: u64,
}

impl Default for BuilderYamlConfig {
    fn default() -> Self {
        Self {
            progress_every: default_progress_every(),
        }
    }
}

/// Batch extraction YAML configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchYamlConfig {
    /// Spread batches over the rayon pool when the `parallel` feature is on.
    #[serde(default = "true_value")]
    pub parallel: bool,
}

impl Default for BatchYamlConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Training corpus YAML configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusYamlConfig {
    /// The name column holds raw descriptions that still need normalizing.
    pub raw_names: bool,

    /// Drop rows whose normalized name fails `eligibility`.
    pub eligible_only: bool,

    pub eligibility: EligibilityRules,
}

impl CorpusYamlConfig {
    pub fn name_column(&self) -> NameColumn {
        if self.raw_names {
            NameColumn::Raw
        } else {
            NameColumn::Normalized
        }
    }

    /// Open `path` with the configured name handling and filter.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<CorpusReader<File>, CorpusError> {
        let reader = CorpusReader::open(path, self.name_column())?;
        Ok(if self.eligible_only {
            reader.with_eligibility(self.eligibility.clone())
        } else {
            reader
        })
    }
}

/// Artifact store YAML configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreYamlConfig {
    #[serde(default)]
    pub artifact: ArtifactName,

    #[serde(default)]
    pub backend: StoreConfig,
}

impl Default for StoreYamlConfig {
    fn default() -> Self {
        Self {
            artifact: ArtifactName::default(),
            backend: StoreConfig::default(),
        }
    }
}

fn default_config_version() -> String {
    "1.0".to_string()
}
fn default_tolerance() -> u32 {
    index::builder::DEFAULT_TOLERANCE
}
fn default_progress_every() -> u64 {
    index::builder::DEFAULT_PROGRESS_EVERY
}
fn true_value() -> bool {
    true
}
