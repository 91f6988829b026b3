//! Thread-safe handle around an index.
//!
//! One index-wide reader-writer lock: queries run in parallel, and a mutation
//! waits for in-flight queries and blocks new ones, so a query never sees a
//! label stored but only partly registered in the bucket tables.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ann::{IndexStats, InsertOutcome, NeighborIndex};
use crate::batch::{apply_batch, BatchSummary, UpdateBatch};
use crate::error::Result;
use crate::hash::SearchParams;

/// Cloneable, `Send + Sync` handle to a [`NeighborIndex`].
///
/// ```rust
/// use gaussian_lsh::{GaussianLsh, LshParams, SearchParams, SharedIndex};
///
/// let index: GaussianLsh<u32> = GaussianLsh::new(3, LshParams::default().with_seed(5)).unwrap();
/// let shared = SharedIndex::new(index);
///
/// let writer = shared.clone();
/// std::thread::spawn(move || writer.upsert(7, vec![1.0, 2.0, 3.0]).unwrap())
///     .join()
///     .unwrap();
///
/// let hits = shared.query_label(&7, &SearchParams::limit(1), false).unwrap();
/// assert_eq!(hits[0].0, 7);
/// ```
#[derive(Debug)]
pub struct SharedIndex<I> {
    inner: Arc<RwLock<I>>,
}

impl<I> Clone for SharedIndex<I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I: NeighborIndex> SharedIndex<I> {
    pub fn new(index: I) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    /// Shared access for several reads under one lock.
    pub fn read(&self) -> RwLockReadGuard<'_, I> {
        self.inner.read()
    }

    /// Exclusive access for several mutations under one lock.
    pub fn write(&self) -> RwLockWriteGuard<'_, I> {
        self.inner.write()
    }

    pub fn upsert(&self, label: I::Label, vector: Vec<I::Scalar>) -> Result<InsertOutcome> {
        self.inner.write().upsert(label, vector)
    }

    pub fn remove(&self, label: &I::Label) -> bool {
        self.inner.write().remove(label)
    }

    /// Apply a whole batch under a single write lock.
    pub fn apply(&self, batch: UpdateBatch<I::Label, I::Scalar>) -> Result<BatchSummary> {
        apply_batch(&mut *self.inner.write(), batch)
    }

    pub fn query_vector(
        &self,
        vector: &[I::Scalar],
        params: &SearchParams,
        drop_labels: &[I::Label],
    ) -> Result<Vec<(I::Label, I::Scalar)>> {
        self.inner.read().query_vector(vector, params, drop_labels)
    }

    pub fn query_label(
        &self,
        label: &I::Label,
        params: &SearchParams,
        drop_self: bool,
    ) -> Result<Vec<(I::Label, I::Scalar)>> {
        self.inner.read().query_label(label, params, drop_self)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        self.inner.read().stats()
    }

    /// Unwrap the index if this is the last handle.
    pub fn try_into_inner(self) -> std::result::Result<I, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}
