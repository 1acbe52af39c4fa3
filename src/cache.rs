//! Lazily loaded, shared model handle.

use std::sync::Arc;

use index::{ArtifactError, VendorModel};
use once_cell::sync::OnceCell;

use crate::ServiceError;

/// One-time initialization gate around a shared [`VendorModel`].
///
/// Owned by the caller and injected into whatever needs the model. The first
/// successful load wins; concurrent first callers block until it finishes
/// and no load runs twice. Once set, reads are lock-free. A failed load
/// leaves the cache empty so a later call can retry.
#[derive(Debug, Default)]
pub struct ModelCache {
    cell: OnceCell<Arc<VendorModel>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache that already holds `model`.
    pub fn with_model(model: Arc<VendorModel>) -> Self {
        Self {
            cell: OnceCell::with_value(model),
        }
    }

    /// Return the cached model, running `load` if nothing is cached yet.
    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<VendorModel>, ArtifactError>
    where
        F: FnOnce() -> Result<VendorModel, ArtifactError>,
    {
        self.cell
            .get_or_try_init(|| load().map(Arc::new))
            .map(Arc::clone)
    }

    /// Return the cached model without loading it.
    pub fn loaded(&self) -> Result<Arc<VendorModel>, ServiceError> {
        self.cell.get().cloned().ok_or(ServiceError::ModelNotLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}
