//! Unified traits for all neighbor indexes.

use std::fmt::Debug;
use std::hash::Hash;

use tracing::warn;

use crate::error::Result;
use crate::hash::SearchParams;
use crate::vector::Scalar;

/// Identifier of an indexed item.
///
/// `Ord` gives rankings a deterministic tie-break: equal vote counts and equal
/// similarities are ordered by ascending label.
pub trait Label: Hash + Eq + Ord + Clone + Debug {}

impl<T: Hash + Eq + Ord + Clone + Debug> Label for T {}

/// Result of inserting a single vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The vector is stored and indexed.
    Inserted,
    /// Normalization was undefined (e.g. zero vector); nothing changed.
    Skipped,
}

impl InsertOutcome {
    #[inline]
    pub fn is_inserted(self) -> bool {
        matches!(self, InsertOutcome::Inserted)
    }
}

/// Counts from a bulk insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: usize,
    pub skipped: usize,
}

impl InsertSummary {
    pub fn record(&mut self, outcome: InsertOutcome) {
        match outcome {
            InsertOutcome::Inserted => self.inserted += 1,
            InsertOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Statistics about an index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexStats {
    pub num_vectors: usize,
    pub dimension: usize,
    pub algorithm: String,
    /// Non-empty buckets summed over all tables (0 for exact indexes).
    pub num_buckets: usize,
    /// Largest bucket in any table.
    pub largest_bucket: usize,
    /// Mean labels per bucket.
    pub mean_bucket_size: f64,
}

/// Contract shared by the approximate and exact indexes.
///
/// Results are `(label, similarity)` pairs sorted by descending inner
/// product, ties by ascending label.
pub trait NeighborIndex {
    type Label: Label;
    type Scalar: Scalar;

    /// Store `vector` under `label`, replacing any previous vector.
    fn upsert(&mut self, label: Self::Label, vector: Vec<Self::Scalar>) -> Result<InsertOutcome>;

    /// Remove `label`. Returns `false` if it was not present.
    fn remove(&mut self, label: &Self::Label) -> bool;

    /// Neighbors of an arbitrary vector.
    fn query_vector(
        &self,
        vector: &[Self::Scalar],
        params: &SearchParams,
        drop_labels: &[Self::Label],
    ) -> Result<Vec<(Self::Label, Self::Scalar)>>;

    /// Neighbors of a stored item.
    fn query_label(
        &self,
        label: &Self::Label,
        params: &SearchParams,
        drop_self: bool,
    ) -> Result<Vec<(Self::Label, Self::Scalar)>>;

    /// Stored vector of `label`.
    fn vector(&self, label: &Self::Label) -> Option<&[Self::Scalar]>;

    /// All stored labels, in no particular order.
    fn labels(&self) -> impl Iterator<Item = &Self::Label> + '_;

    /// Vector dimension.
    fn rank(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stats(&self) -> IndexStats;

    /// Remove everything.
    fn clear(&mut self);

    /// Upsert every pair, counting skipped vectors.
    fn upsert_many<I>(&mut self, items: I) -> Result<InsertSummary>
    where
        I: IntoIterator<Item = (Self::Label, Vec<Self::Scalar>)>,
    {
        let mut summary = InsertSummary::default();
        for (label, vector) in items {
            summary.record(self.upsert(label, vector)?);
        }
        if summary.skipped > 0 {
            warn!(skipped = summary.skipped, "items skipped during bulk insert");
        }
        Ok(summary)
    }

    /// Remove every label, returning how many were present.
    fn remove_many<'a, I>(&mut self, labels: I) -> usize
    where
        I: IntoIterator<Item = &'a Self::Label>,
        Self::Label: 'a,
    {
        labels
            .into_iter()
            .filter(|label| self.remove(label))
            .count()
    }
}
