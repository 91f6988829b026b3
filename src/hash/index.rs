//! Multi-table Gaussian LSH index: storage and mutation.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use super::hash_table::{BucketKey, BucketTable};
use super::params::{LshParams, SearchParams};
use super::random_projection::GaussianProjection;
use crate::ann::{IndexStats, InsertOutcome, InsertSummary, Label, NeighborIndex};
use crate::error::{LshError, Result};
use crate::sampling::RandomSamplingMap;
use crate::vector::{normalize, Scalar};

/// Approximate nearest-neighbor index over `L` Gaussian LSH tables.
///
/// Vectors live in a [`RandomSamplingMap`], which is the authoritative
/// store; each table maps bucket keys to the labels hashed there. For every
/// stored label, each table's bucket for its vector contains that label.
///
/// Mutations take `&mut self`. Queries take `&self`; the sampling RNG sits
/// behind a mutex so shared references can be used across threads (see
/// [`SharedIndex`](crate::SharedIndex) for a lock around the whole index).
///
/// ```rust
/// use gaussian_lsh::{GaussianLsh, LshParams, SearchParams};
///
/// let params = LshParams::default().with_normalize_inputs(true).with_seed(1);
/// let mut index: GaussianLsh<u32> = GaussianLsh::new(4, params).unwrap();
///
/// index.insert(1, vec![1.0, 0.0, 0.0, 0.0]).unwrap();
/// index.insert(2, vec![0.9, 0.1, 0.0, 0.0]).unwrap();
/// index.insert(3, vec![0.0, 0.0, 0.0, 1.0]).unwrap();
///
/// let hits = index.query_label(&1, &SearchParams::limit(2), true).unwrap();
/// assert!(hits.len() <= 2);
/// ```
#[derive(Debug)]
pub struct GaussianLsh<L, T = f32> {
    rank: usize,
    params: LshParams,
    projection: GaussianProjection<T>,
    pub(super) tables: Vec<BucketTable<L>>,
    pub(super) vectors: RandomSamplingMap<L, Vec<T>>,
    /// Query-time sampling source.
    pub(super) rng: Mutex<StdRng>,
}

impl<L: Label, T: Scalar> GaussianLsh<L, T> {
    /// Create an index for vectors of dimension `rank`.
    ///
    /// Seeds from `params.seed` when set, otherwise from the thread RNG.
    pub fn new(rank: usize, params: LshParams) -> Result<Self> {
        let seed = params.seed.unwrap_or_else(|| rand::rng().random());
        Self::with_rng(rank, params, StdRng::seed_from_u64(seed))
    }

    /// Create an index drawing projections and samples from `rng`.
    pub fn with_rng(rank: usize, params: LshParams, mut rng: StdRng) -> Result<Self> {
        params.validate(rank)?;

        let projection = GaussianProjection::new(
            rank,
            params.num_tables,
            params.num_projections,
            params.window,
            &mut rng,
        );
        let tables = (0..params.num_tables).map(|_| BucketTable::new()).collect();

        debug!(
            rank,
            num_tables = params.num_tables,
            num_projections = params.num_projections,
            window = params.window,
            normalize_inputs = params.normalize_inputs,
            "created gaussian lsh index"
        );

        Ok(Self {
            rank,
            params,
            projection,
            tables,
            vectors: RandomSamplingMap::new(),
            rng: Mutex::new(rng),
        })
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    pub fn params(&self) -> &LshParams {
        &self.params
    }

    #[inline]
    pub fn num_tables(&self) -> usize {
        self.tables.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    #[inline]
    pub fn contains(&self, label: &L) -> bool {
        self.vectors.contains_key(label)
    }

    /// Stored (possibly normalized) vector of `label`.
    pub fn get(&self, label: &L) -> Option<&[T]> {
        self.vectors.get(label).map(Vec::as_slice)
    }

    /// Like [`get`](Self::get), but an absent label is `KeyNotFound`.
    pub fn vector(&self, label: &L) -> Result<&[T]> {
        self.vectors.get_or_err(label).map(Vec::as_slice)
    }

    /// The vector store.
    pub fn vectors(&self) -> &RandomSamplingMap<L, Vec<T>> {
        &self.vectors
    }

    /// Bucket table `i`.
    pub fn table(&self, i: usize) -> Option<&BucketTable<L>> {
        self.tables.get(i)
    }

    pub fn projection(&self) -> &GaussianProjection<T> {
        &self.projection
    }

    /// Bucket keys of `vector` in every table.
    ///
    /// The vector is hashed as given, without normalization.
    pub fn hash(&self, vector: &[T]) -> Result<Vec<BucketKey>> {
        self.check_dimension(vector)?;
        Ok(self.projection.hash(vector))
    }

    pub(super) fn check_dimension(&self, vector: &[T]) -> Result<()> {
        if vector.len() != self.rank {
            return Err(LshError::DimensionMismatch {
                expected: self.rank,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Insert `vector` under `label`.
    ///
    /// Rejects a wrong dimension before touching anything. With
    /// `normalize_inputs`, a vector that cannot be normalized is skipped:
    /// the index is left unchanged and `Skipped` is returned.
    ///
    /// If `label` is already stored, its old bucket memberships are dropped
    /// before the new vector is indexed, so the call behaves like
    /// [`upsert`](Self::upsert). There is no "append only" mode: callers
    /// that used to pass an `update = false` flag get the replacing
    /// behavior, and a label never sits in buckets for two vectors at once.
    pub fn insert(&mut self, label: L, vector: Vec<T>) -> Result<InsertOutcome> {
        self.check_dimension(&vector)?;

        let vector = if self.params.normalize_inputs {
            match normalize(&vector) {
                Some(v) => v,
                None => {
                    warn!(?label, "skipping insert: vector cannot be normalized");
                    return Ok(InsertOutcome::Skipped);
                }
            }
        } else {
            vector
        };

        self.unindex(&label);

        for (table, key) in self.tables.iter_mut().zip(self.projection.keys(&vector)) {
            table.insert(key, label.clone());
        }
        self.vectors.insert(label, vector);
        Ok(InsertOutcome::Inserted)
    }

    /// Insert or replace `label`. Re-upserting an identical vector is a no-op.
    pub fn upsert(&mut self, label: L, vector: Vec<T>) -> Result<InsertOutcome> {
        self.insert(label, vector)
    }

    /// Insert every pair, aggregating how many were skipped.
    pub fn insert_many<I>(&mut self, items: I) -> Result<InsertSummary>
    where
        I: IntoIterator<Item = (L, Vec<T>)>,
    {
        let mut summary = InsertSummary::default();
        for (label, vector) in items {
            summary.record(self.insert(label, vector)?);
        }
        if summary.skipped > 0 {
            warn!(skipped = summary.skipped, "items skipped during bulk insert");
        }
        Ok(summary)
    }

    /// Remove `label` and its vector. Returns `false` if it was absent.
    ///
    /// Bucket memberships and the stored vector always go together. There
    /// is no `indices_only` variant that unhooks a label from the tables
    /// while keeping its vector; re-inserting covers that use.
    pub fn remove(&mut self, label: &L) -> bool {
        if !self.unindex(label) {
            return false;
        }
        self.vectors.remove(label);
        true
    }

    /// Drop `label` from every bucket, keeping its stored vector.
    ///
    /// Keys are recomputed from the stored vector, which is exactly what was
    /// hashed at insert time.
    fn unindex(&mut self, label: &L) -> bool {
        let Some(vector) = self.vectors.get(label) else {
            return false;
        };
        for (table, key) in self.tables.iter_mut().zip(self.projection.keys(vector)) {
            table.remove(&key, label);
        }
        true
    }

    /// Number of tables whose buckets contain `label`.
    pub fn memberships(&self, label: &L) -> usize {
        self.tables
            .iter()
            .map(|table| table.iter().filter(|(_, labels)| labels.contains(label)).count())
            .sum()
    }

    /// Remove all items. Projection parameters are kept.
    pub fn clear(&mut self) {
        for table in &mut self.tables {
            table.clear();
        }
        self.vectors.clear();
    }

    pub fn stats(&self) -> IndexStats {
        let num_buckets: usize = self.tables.iter().map(BucketTable::len).sum();
        let num_entries: usize = self.tables.iter().map(BucketTable::num_entries).sum();
        IndexStats {
            num_vectors: self.len(),
            dimension: self.rank,
            algorithm: "GaussianLSH".to_string(),
            num_buckets,
            largest_bucket: self
                .tables
                .iter()
                .map(BucketTable::largest_bucket)
                .max()
                .unwrap_or(0),
            mean_bucket_size: if num_buckets == 0 {
                0.0
            } else {
                num_entries as f64 / num_buckets as f64
            },
        }
    }
}

impl<L: Label, T: Scalar> NeighborIndex for GaussianLsh<L, T> {
    type Label = L;
    type Scalar = T;

    fn upsert(&mut self, label: L, vector: Vec<T>) -> Result<InsertOutcome> {
        GaussianLsh::upsert(self, label, vector)
    }

    fn remove(&mut self, label: &L) -> bool {
        GaussianLsh::remove(self, label)
    }

    fn query_vector(
        &self,
        vector: &[T],
        params: &SearchParams,
        drop_labels: &[L],
    ) -> Result<Vec<(L, T)>> {
        GaussianLsh::query_vector(self, vector, params, drop_labels)
    }

    fn query_label(
        &self,
        label: &L,
        params: &SearchParams,
        drop_self: bool,
    ) -> Result<Vec<(L, T)>> {
        GaussianLsh::query_label(self, label, params, drop_self)
    }

    fn vector(&self, label: &L) -> Option<&[T]> {
        self.get(label)
    }

    fn labels(&self) -> impl Iterator<Item = &L> + '_ {
        self.vectors.keys()
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn stats(&self) -> IndexStats {
        GaussianLsh::stats(self)
    }

    fn clear(&mut self) {
        GaussianLsh::clear(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(normalize: bool) -> GaussianLsh<u32> {
        let params = LshParams::default()
            .with_tables(6)
            .with_projections(4)
            .with_normalize_inputs(normalize)
            .with_seed(9);
        GaussianLsh::new(8, params).unwrap()
    }

    fn vec8(seed: u32) -> Vec<f32> {
        (0..8).map(|i| ((seed * 8 + i) as f32 * 0.37).sin()).collect()
    }

    /// Every stored label sits in its own bucket in every table, and no
    /// table holds a label that is not stored or an empty bucket.
    fn assert_consistent(index: &GaussianLsh<u32>) {
        for (label, vector) in index.vectors().iter() {
            for (t, key) in index.hash(vector).unwrap().iter().enumerate() {
                assert!(index.table(t).unwrap().contains(key, label));
            }
        }
        for t in 0..index.num_tables() {
            for (_, labels) in index.table(t).unwrap().iter() {
                assert!(!labels.is_empty());
                assert!(labels.iter().all(|l| index.contains(l)));
            }
        }
    }

    #[test]
    fn test_insert_registers_in_every_table() {
        let mut idx = index(false);
        assert_eq!(idx.insert(1, vec8(1)).unwrap(), InsertOutcome::Inserted);
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.memberships(&1), 6);
        assert_consistent(&idx);
    }

    #[test]
    fn test_dimension_mismatch_leaves_index_untouched() {
        let mut idx = index(false);
        idx.insert(1, vec8(1)).unwrap();
        let err = idx.insert(2, vec![1.0; 3]).unwrap_err();
        assert_eq!(
            err,
            LshError::DimensionMismatch {
                expected: 8,
                actual: 3
            }
        );
        // An existing label is not unindexed by a rejected update either.
        assert!(idx.upsert(1, vec![0.0; 9]).is_err());
        assert_eq!(idx.memberships(&1), 6);
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_zero_vector_is_skipped_when_normalizing() {
        let mut idx = index(true);
        idx.insert(1, vec8(1)).unwrap();
        assert_eq!(idx.insert(2, vec![0.0; 8]).unwrap(), InsertOutcome::Skipped);
        assert!(!idx.contains(&2));
        // Skipping an update keeps the old vector fully indexed.
        assert_eq!(idx.upsert(1, vec![0.0; 8]).unwrap(), InsertOutcome::Skipped);
        assert_eq!(idx.memberships(&1), 6);
        assert_consistent(&idx);
    }

    #[test]
    fn test_zero_vector_is_stored_without_normalization() {
        let mut idx = index(false);
        assert!(idx.insert(1, vec![0.0; 8]).unwrap().is_inserted());
        assert_eq!(idx.get(&1), Some(&[0.0f32; 8][..]));
    }

    #[test]
    fn test_stored_vectors_are_normalized() {
        let mut idx = index(true);
        idx.insert(1, vec![3.0, 4.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let v = idx.get(&1).unwrap();
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_upsert_moves_buckets() {
        let mut idx = index(false);
        idx.insert(1, vec8(1)).unwrap();
        idx.insert(2, vec8(2)).unwrap();
        idx.upsert(1, vec8(3)).unwrap();
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.memberships(&1), 6);
        assert_consistent(&idx);
    }

    #[test]
    fn test_insert_existing_label_replaces() {
        let mut idx = index(false);
        idx.insert(1, vec8(1)).unwrap();
        let old_keys = idx.hash(&vec8(1)).unwrap();
        idx.insert(1, vec8(4)).unwrap();

        assert_eq!(idx.len(), 1);
        assert_eq!(idx.get(&1).unwrap(), vec8(4).as_slice());
        assert_eq!(idx.memberships(&1), idx.num_tables());
        let new_keys = idx.hash(&vec8(4)).unwrap();
        for (t, (old, new)) in old_keys.iter().zip(&new_keys).enumerate() {
            if old != new {
                assert!(!idx.table(t).unwrap().contains(old, &1));
            }
        }
        assert_consistent(&idx);

        assert!(idx.remove(&1));
        assert_eq!(idx.memberships(&1), 0);
        assert!(idx.get(&1).is_none());
    }

    #[test]
    fn test_remove() {
        let mut idx = index(false);
        idx.insert(1, vec8(1)).unwrap();
        idx.insert(2, vec8(2)).unwrap();
        assert!(idx.remove(&1));
        assert!(!idx.remove(&1));
        assert_eq!(idx.memberships(&1), 0);
        assert_eq!(idx.len(), 1);
        assert_consistent(&idx);

        assert!(idx.remove(&2));
        assert_eq!(idx.stats().num_buckets, 0);
    }

    #[test]
    fn test_vector_lookup_errors() {
        let idx = index(false);
        assert_eq!(
            idx.vector(&5).unwrap_err(),
            LshError::KeyNotFound("5".to_string())
        );
    }

    #[test]
    fn test_insert_many_counts_skips() {
        let mut idx = index(true);
        let items = vec![(1, vec8(1)), (2, vec![0.0; 8]), (3, vec8(3))];
        let summary = idx.insert_many(items).unwrap();
        assert_eq!(summary, InsertSummary { inserted: 2, skipped: 1 });
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn test_stats_and_clear() {
        let mut idx = index(false);
        for i in 0..10 {
            idx.insert(i, vec8(i)).unwrap();
        }
        let stats = idx.stats();
        assert_eq!(stats.num_vectors, 10);
        assert_eq!(stats.dimension, 8);
        assert!(stats.num_buckets >= 6);
        assert!(stats.largest_bucket >= 1);
        assert!(stats.mean_bucket_size >= 1.0);

        idx.clear();
        assert!(idx.is_empty());
        assert_eq!(idx.stats().num_buckets, 0);
    }

    #[test]
    fn test_invalid_params() {
        let err = GaussianLsh::<u32>::new(0, LshParams::default()).unwrap_err();
        assert!(matches!(err, LshError::InvalidParameter(_)));
    }

    #[test]
    fn test_f64_index() {
        let params = LshParams::default().with_tables(3).with_projections(2).with_seed(1);
        let mut idx: GaussianLsh<&str, f64> = GaussianLsh::new(2, params).unwrap();
        idx.insert("a", vec![0.5, 0.5]).unwrap();
        assert_eq!(idx.memberships(&"a"), 3);
    }
}
