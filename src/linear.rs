//! Exact brute-force neighbor search.
//!
//! Scans every stored vector on each query. O(n · rank) per query, but exact,
//! so it serves as ground truth when measuring the recall of
//! [`GaussianLsh`](crate::GaussianLsh), and it is often the faster choice
//! below a few thousand items anyway.
//!
//! Vectors are always normalized, so the inner product ranking is a cosine
//! ranking. Inputs that cannot be normalized are skipped like in the LSH
//! index.

use tracing::warn;

use crate::ann::{IndexStats, InsertOutcome, Label, NeighborIndex};
use crate::error::{LshError, Result};
use crate::hash::{rank_by_similarity, SearchParams};
use crate::sampling::RandomSamplingMap;
use crate::vector::{dot, normalize, Scalar};

/// Exact inner-product index over unit vectors.
#[derive(Debug, Clone)]
pub struct LinearIndex<L, T = f32> {
    rank: usize,
    vectors: RandomSamplingMap<L, Vec<T>>,
}

impl<L: Label, T: Scalar> LinearIndex<L, T> {
    pub fn new(rank: usize) -> Self {
        Self {
            rank,
            vectors: RandomSamplingMap::new(),
        }
    }

    pub fn with_capacity(rank: usize, capacity: usize) -> Self {
        Self {
            rank,
            vectors: RandomSamplingMap::with_capacity(capacity),
        }
    }

    fn check_dimension(&self, vector: &[T]) -> Result<()> {
        if vector.len() != self.rank {
            return Err(LshError::DimensionMismatch {
                expected: self.rank,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    fn scan(&self, query: &[T], params: &SearchParams, drop_labels: &[L]) -> Vec<(L, T)> {
        if params.limit == Some(0) {
            return Vec::new();
        }
        let mut hits: Vec<(L, T)> = self
            .vectors
            .iter()
            .filter(|(label, _)| !drop_labels.contains(label))
            .map(|(label, stored)| (label.clone(), dot(query, stored)))
            .collect();
        rank_by_similarity(&mut hits);
        if let Some(limit) = params.limit {
            hits.truncate(limit);
        }
        hits
    }
}

impl<L: Label, T: Scalar> NeighborIndex for LinearIndex<L, T> {
    type Label = L;
    type Scalar = T;

    fn upsert(&mut self, label: L, vector: Vec<T>) -> Result<InsertOutcome> {
        self.check_dimension(&vector)?;
        let Some(unit) = normalize(&vector) else {
            warn!(?label, "skipping insert: vector cannot be normalized");
            return Ok(InsertOutcome::Skipped);
        };
        self.vectors.insert(label, unit);
        Ok(InsertOutcome::Inserted)
    }

    fn remove(&mut self, label: &L) -> bool {
        self.vectors.remove(label).is_some()
    }

    /// Every stored item is a candidate, so `ensure_limit` and `search_k`
    /// have no effect.
    fn query_vector(
        &self,
        vector: &[T],
        params: &SearchParams,
        drop_labels: &[L],
    ) -> Result<Vec<(L, T)>> {
        self.check_dimension(vector)?;
        let Some(query) = normalize(vector) else {
            warn!("query vector cannot be normalized, returning no results");
            return Ok(Vec::new());
        };
        Ok(self.scan(&query, params, drop_labels))
    }

    fn query_label(
        &self,
        label: &L,
        params: &SearchParams,
        drop_self: bool,
    ) -> Result<Vec<(L, T)>> {
        let query = self.vectors.get_or_err(label)?;
        let drop: &[L] = if drop_self {
            std::slice::from_ref(label)
        } else {
            &[]
        };
        Ok(self.scan(query, params, drop))
    }

    fn vector(&self, label: &L) -> Option<&[T]> {
        self.vectors.get(label).map(Vec::as_slice)
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
        IndexStats {
            num_vectors: self.vectors.len(),
            dimension: self.rank,
            algorithm: "Linear".to_string(),
            num_buckets: 0,
            largest_bucket: 0,
            mean_bucket_size: 0.0,
        }
    }

    fn clear(&mut self) {
        self.vectors.clear();
    }
}
