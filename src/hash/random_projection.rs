//! Gaussian random projections with windowed quantization.
//!
//! Each of the `L` tables owns `k` random unit directions `a_j` and `k`
//! shifts `b_j ~ U[0, w)`. A vector `v` lands in the bucket
//!
//! ```text
//! h_j(v) = floor((a_j · v + b_j) / w),   j = 0..k
//! ```
//!
//! Two vectors share a bucket in a table only when all `k` codes agree. The
//! window `w` sets how coarse the buckets are: larger windows raise recall and
//! candidate volume at the cost of precision.
//!
//! Directions draw each component from a standard normal and are then
//! L2-normalized, which makes them uniformly distributed on the unit sphere.

use rand::Rng;
use rand_distr::StandardNormal;

use super::hash_table::BucketKey;
use crate::vector::{dot, Scalar};

/// Frozen projection parameters for all tables.
///
/// Immutable after construction, so concurrent readers can hash freely.
#[derive(Debug, Clone)]
pub struct GaussianProjection<T> {
    rank: usize,
    num_tables: usize,
    num_projections: usize,
    window: T,
    /// Unit directions, `[table][projection][rank]` flattened row-major.
    directions: Vec<T>,
    /// Shifts in `[0, window)`, `[table][projection]` flattened.
    shifts: Vec<T>,
}

impl<T: Scalar> GaussianProjection<T> {
    /// Draw fresh projection parameters.
    ///
    /// Callers validate that all sizes are positive and `window` is a
    /// positive finite number.
    pub fn new<R: Rng + ?Sized>(
        rank: usize,
        num_tables: usize,
        num_projections: usize,
        window: f64,
        rng: &mut R,
    ) -> Self {
        let count = num_tables * num_projections;

        let mut directions = Vec::with_capacity(count * rank);
        let mut row = vec![0.0f64; rank];
        for _ in 0..count {
            loop {
                for x in row.iter_mut() {
                    *x = rng.sample(StandardNormal);
                }
                let n = row.iter().map(|x| x * x).sum::<f64>().sqrt();
                // An all-zero draw has probability zero, but it cannot be normalized.
                if n > 0.0 && n.is_finite() {
                    directions.extend(row.iter().map(|x| T::from_f64(x / n)));
                    break;
                }
            }
        }

        let shifts = (0..count)
            .map(|_| T::from_f64(rng.random::<f64>() * window))
            .collect();

        Self {
            rank,
            num_tables,
            num_projections,
            window: T::from_f64(window),
            directions,
            shifts,
        }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    pub fn num_tables(&self) -> usize {
        self.num_tables
    }

    #[inline]
    pub fn num_projections(&self) -> usize {
        self.num_projections
    }

    /// Unit direction `j` of table `table`.
    pub fn direction(&self, table: usize, j: usize) -> &[T] {
        let start = (table * self.num_projections + j) * self.rank;
        &self.directions[start..start + self.rank]
    }

    /// Shifts of table `table`.
    pub fn shifts(&self, table: usize) -> &[T] {
        let start = table * self.num_projections;
        &self.shifts[start..start + self.num_projections]
    }

    /// Raw projections `a_j · v` for table `table`.
    pub fn project(&self, vector: &[T], table: usize) -> Vec<T> {
        (0..self.num_projections)
            .map(|j| dot(self.direction(table, j), vector))
            .collect()
    }

    /// Bucket key of `vector` in table `table`.
    pub fn bucket_key(&self, vector: &[T], table: usize) -> BucketKey {
        self.shifts(table)
            .iter()
            .enumerate()
            .map(|(j, &shift)| {
                let projection = dot(self.direction(table, j), vector);
                ((projection + shift) / self.window).floor_to_i8()
            })
            .collect()
    }

    /// Bucket keys of `vector` for every table, in table order.
    pub fn keys<'a>(&'a self, vector: &'a [T]) -> impl Iterator<Item = BucketKey> + 'a {
        (0..self.num_tables).map(move |table| self.bucket_key(vector, table))
    }

    /// All `L` bucket keys of `vector`.
    pub fn hash(&self, vector: &[T]) -> Vec<BucketKey> {
        self.keys(vector).collect()
    }
}
