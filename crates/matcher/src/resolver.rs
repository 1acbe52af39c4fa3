//! Candidate resolution: index ids to vendor names.

use std::collections::HashMap;
use std::sync::Arc;

use index::EntryId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a canonical vendor.
pub type VendorId = u64;

/// Name and vendor of one indexed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedName {
    pub id: EntryId,
    /// Normalized name the entry was trained on.
    pub name: String,
    pub vendor_id: VendorId,
}

impl ResolvedName {
    pub fn new(id: EntryId, name: impl Into<String>, vendor_id: VendorId) -> Self {
        Self {
            id,
            name: name.into(),
            vendor_id,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("resolver backend error: {0}")]
    Backend(String),
}

impl ResolveError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Batched lookup of entry ids.
///
/// Ids the backend does not know may be left out of the answer, and the
/// answer may come back in any order.
pub trait Resolver: Send + Sync {
    fn resolve(&self, ids: &[EntryId]) -> Result<Vec<ResolvedName>, ResolveError>;
}

impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    fn resolve(&self, ids: &[EntryId]) -> Result<Vec<ResolvedName>, ResolveError> {
        (**self).resolve(ids)
    }
}

/// A resolver backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResolver {
    names: HashMap<EntryId, ResolvedName>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the name of `entry.id`.
    pub fn insert(&mut self, entry: ResolvedName) {
        self.names.insert(entry.id, entry);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<ResolvedName> for InMemoryResolver {
    fn from_iter<I: IntoIterator<Item = ResolvedName>>(iter: I) -> Self {
        let mut resolver = Self::new();
        for entry in iter {
            resolver.insert(entry);
        }
        resolver
    }
}

impl Resolver for InMemoryResolver {
    fn resolve(&self, ids: &[EntryId]) -> Result<Vec<ResolvedName>, ResolveError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.names.get(id).cloned())
            .collect())
    }
}
