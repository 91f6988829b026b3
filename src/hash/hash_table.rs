//! Bucket keys and per-table bucket storage.

use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Quantized projection code identifying one bucket in one table.
///
/// Holds `k` small signed integers inline (no allocation for `k <= 32`).
/// Equality and hashing are by exact content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey(SmallVec<[i8; 32]>);

impl BucketKey {
    pub fn from_codes(codes: &[i8]) -> Self {
        Self(SmallVec::from_slice(codes))
    }

    #[inline]
    pub fn as_slice(&self) -> &[i8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<i8> for BucketKey {
    fn from_iter<I: IntoIterator<Item = i8>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One hash table: bucket key -> set of labels.
///
/// A bucket is dropped as soon as its last label is removed, so every stored
/// bucket is non-empty.
#[derive(Debug, Clone)]
pub struct BucketTable<L> {
    buckets: FxHashMap<BucketKey, FxHashSet<L>>,
}

impl<L> Default for BucketTable<L> {
    fn default() -> Self {
        Self {
            buckets: FxHashMap::default(),
        }
    }
}

impl<L: Hash + Eq> BucketTable<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `label` to the bucket at `key`, creating the bucket if needed.
    ///
    /// Returns `false` if the label was already there.
    pub fn insert(&mut self, key: BucketKey, label: L) -> bool {
        self.buckets.entry(key).or_default().insert(label)
    }

    /// Remove `label` from the bucket at `key`.
    ///
    /// Returns `false` if it was not there.
    pub fn remove(&mut self, key: &BucketKey, label: &L) -> bool {
        let Some(labels) = self.buckets.get_mut(key) else {
            return false;
        };
        let removed = labels.remove(label);
        if labels.is_empty() {
            self.buckets.remove(key);
        }
        removed
    }

    #[inline]
    pub fn get(&self, key: &BucketKey) -> Option<&FxHashSet<L>> {
        self.buckets.get(key)
    }

    pub fn contains(&self, key: &BucketKey, label: &L) -> bool {
        self.buckets.get(key).is_some_and(|labels| labels.contains(label))
    }

    /// Number of non-empty buckets.
    #[inline]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total label memberships across all buckets.
    pub fn num_entries(&self) -> usize {
        self.buckets.values().map(FxHashSet::len).sum()
    }

    /// Size of the largest bucket (0 for an empty table).
    pub fn largest_bucket(&self) -> usize {
        self.buckets.values().map(FxHashSet::len).max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BucketKey, &FxHashSet<L>)> + '_ {
        self.buckets.iter()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
