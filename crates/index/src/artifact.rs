//! Model artifact codec.
//!
//! Layout of an encoded artifact:
//!
//! | bytes | field                                   |
//! |-------|-----------------------------------------|
//! | 4     | magic `VIDM`                            |
//! | 2     | format version, little endian           |
//! | 1     | compression codec                       |
//! | 32    | SHA-256 of the payload                  |
//! | rest  | payload: bincode model, maybe zstd'd    |

use bincode::config::standard;
use bincode::error::{DecodeError, EncodeError};
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};
use zstd::{decode_all, encode_all};

use crate::store::{ArtifactName, ArtifactStore};
use crate::{IndexError, VendorModel, MODEL_SCHEMA_VERSION};

/// Bump this value whenever the frame layout changes.
pub const ARTIFACT_FORMAT_VERSION: u16 = 1;

const MAGIC: &[u8; 4] = b"VIDM";

/// Upper bound on the decoded model, so a forged length prefix cannot force
/// an oversized allocation.
const MAX_DECODED_BYTES: usize = 1 << 30;
const HEADER_LEN: usize = 4 + 2 + 1 + 32;

/// Errors raised while persisting or loading a model artifact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("artifact store error: {0}")]
    Store(String),
    #[error("artifact not found: {0}")]
    Missing(String),
    #[error("corrupt artifact: {0}")]
    Corrupt(String),
    #[error("artifact checksum mismatch: expected {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("artifact schema version {found} is not supported (expected {expected})")]
    SchemaMismatch { found: u16, expected: u16 },
    #[error("serialization encode error: {0}")]
    Encode(String),
    #[error("serialization decode error: {0}")]
    Decode(String),
    #[error("compression error: {0}")]
    Compression(String),
    #[error("invalid compression config: {0}")]
    InvalidCompression(String),
    #[error("invalid model: {0}")]
    InvalidModel(#[from] IndexError),
}

impl From<EncodeError> for ArtifactError {
    fn from(e: EncodeError) -> Self {
        ArtifactError::Encode(e.to_string())
    }
}

impl From<DecodeError> for ArtifactError {
    fn from(e: DecodeError) -> Self {
        ArtifactError::Decode(e.to_string())
    }
}

impl ArtifactError {
    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        Self::Store(err.to_string())
    }
}

/// Compression codec options for model artifacts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionCodec {
    /// Store the bincode payload as is.
    None,
    /// Compress the payload with zstd.
    #[default]
    Zstd,
}

impl CompressionCodec {
    fn tag(self) -> u8 {
        match self {
            CompressionCodec::None => 0,
            CompressionCodec::Zstd => 1,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, ArtifactError> {
        match tag {
            0 => Ok(CompressionCodec::None),
            1 => Ok(CompressionCodec::Zstd),
            other => Err(ArtifactError::Corrupt(format!(
                "unknown compression codec tag {other}"
            ))),
        }
    }
}

/// Compression behavior for encoded models.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub codec: CompressionCodec,
    /// zstd level: negative levels trade ratio for speed, `0` picks zstd's
    /// default, higher is smaller but slower. Ignored without compression.
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::default(),
            level: 3,
        }
    }
}

impl CompressionConfig {
    pub fn new(codec: CompressionCodec, level: i32) -> Self {
        Self { codec, level }
    }

    pub fn with_codec(mut self, codec: CompressionCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    /// Reject a zstd level outside the range the linked zstd supports.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.codec == CompressionCodec::Zstd {
            let range = zstd::compression_level_range();
            if !range.contains(&self.level) {
                return Err(ArtifactError::InvalidCompression(format!(
                    "zstd level must be within {}..={} (got {})",
                    range.start(),
                    range.end(),
                    self.level
                )));
            }
        }
        Ok(())
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, ArtifactError> {
        match self.codec {
            CompressionCodec::None => Ok(data.to_vec()),
            CompressionCodec::Zstd => {
                encode_all(data, self.level).map_err(|e| ArtifactError::Compression(e.to_string()))
            }
        }
    }
}

fn decompress(codec: CompressionCodec, data: &[u8]) -> Result<Vec<u8>, ArtifactError> {
    match codec {
        CompressionCodec::None => Ok(data.to_vec()),
        CompressionCodec::Zstd => {
            decode_all(data).map_err(|e| ArtifactError::Compression(e.to_string()))
        }
    }
}

/// Serialize, compress and frame a model.
pub fn encode_model(
    model: &VendorModel,
    compression: &CompressionConfig,
) -> Result<Vec<u8>, ArtifactError> {
    compression.validate()?;
    let encoded = encode_to_vec(model, standard())?;
    let payload = compression.compress(&encoded)?;
    let digest = Sha256::digest(&payload);

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&ARTIFACT_FORMAT_VERSION.to_le_bytes());
    out.push(compression.codec.tag());
    out.extend_from_slice(&digest);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Verify the frame, then decompress and deserialize the model.
pub fn decode_model(bytes: &[u8]) -> Result<VendorModel, ArtifactError> {
    if bytes.len() < HEADER_LEN {
        return Err(ArtifactError::Corrupt(format!(
            "artifact is {} bytes, shorter than its {HEADER_LEN}-byte header",
            bytes.len()
        )));
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);
    if &header[..4] != MAGIC {
        return Err(ArtifactError::Corrupt("bad magic".to_string()));
    }
    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != ARTIFACT_FORMAT_VERSION {
        return Err(ArtifactError::SchemaMismatch {
            found: version,
            expected: ARTIFACT_FORMAT_VERSION,
        });
    }
    let codec = CompressionCodec::from_tag(header[6])?;

    let expected = &header[7..HEADER_LEN];
    let actual = Sha256::digest(payload);
    if expected != actual.as_slice() {
        return Err(ArtifactError::ChecksumMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(actual),
        });
    }

    let decompressed = decompress(codec, payload)?;
    let (model, _): (VendorModel, usize) =
        decode_from_slice(&decompressed, standard().with_limit::<MAX_DECODED_BYTES>())?;
    if !model.is_current_schema() {
        return Err(ArtifactError::SchemaMismatch {
            found: model.meta().schema_version,
            expected: MODEL_SCHEMA_VERSION,
        });
    }
    model.validate()?;
    Ok(model)
}

/// Encode `model` and write it to `store` as one whole object.
pub fn save_model(
    store: &dyn ArtifactStore,
    name: &ArtifactName,
    model: &VendorModel,
    compression: &CompressionConfig,
) -> Result<(), ArtifactError> {
    let bytes = encode_model(model, compression)?;
    info!(
        artifact = %name,
        bytes = bytes.len(),
        entries = model.len(),
        "uploading model artifact"
    );
    store.put(name, &bytes)
}

/// Read and decode a model from `store`.
pub fn load_model(store: &dyn ArtifactStore, name: &ArtifactName) -> Result<VendorModel, ArtifactError> {
    info!(artifact = %name, "downloading model artifact");
    let bytes = store
        .get(name)?
        .ok_or_else(|| ArtifactError::Missing(name.to_string()))?;
    let model = decode_model(&bytes)?;
    debug!(
        artifact = %name,
        bytes = bytes.len(),
        entries = model.len(),
        bits = model.perceptual().bits,
        tolerance = model.tolerance(),
        "model artifact decoded"
    );
    Ok(model)
}
