//! Ordered batches of index mutations.

use tracing::debug;

use crate::ann::{InsertOutcome, NeighborIndex};
use crate::error::Result;

/// A single mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp<L, T> {
    /// Insert or replace a vector.
    Upsert { label: L, vector: Vec<T> },
    /// Remove a label; absent labels are ignored.
    Delete { label: L },
}

impl<L, T> UpdateOp<L, T> {
    /// Label affected by this operation.
    pub fn label(&self) -> &L {
        match self {
            UpdateOp::Upsert { label, .. } | UpdateOp::Delete { label } => label,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, UpdateOp::Delete { .. })
    }
}

/// Operations applied in push order.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBatch<L, T> {
    ops: Vec<UpdateOp<L, T>>,
}

impl<L, T> Default for UpdateBatch<L, T> {
    fn default() -> Self {
        Self { ops: Vec::new() }
    }
}

impl<L, T> UpdateBatch<L, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ops: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, op: UpdateOp<L, T>) {
        self.ops.push(op);
    }

    pub fn upsert(&mut self, label: L, vector: Vec<T>) -> &mut Self {
        self.ops.push(UpdateOp::Upsert { label, vector });
        self
    }

    pub fn delete(&mut self, label: L) -> &mut Self {
        self.ops.push(UpdateOp::Delete { label });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpdateOp<L, T>> {
        self.ops.iter()
    }

    pub fn delete_count(&self) -> usize {
        self.ops.iter().filter(|op| op.is_delete()).count()
    }
}

impl<L, T> IntoIterator for UpdateBatch<L, T> {
    type Item = UpdateOp<L, T>;
    type IntoIter = std::vec::IntoIter<UpdateOp<L, T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<L, T> FromIterator<UpdateOp<L, T>> for UpdateBatch<L, T> {
    fn from_iter<I: IntoIterator<Item = UpdateOp<L, T>>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

/// What a batch did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub upserted: usize,
    /// Upserts whose vector could not be normalized.
    pub skipped: usize,
    /// Deletes that found their label.
    pub removed: usize,
}

impl BatchSummary {
    pub fn merge(&mut self, other: &BatchSummary) {
        self.upserted += other.upserted;
        self.skipped += other.skipped;
        self.removed += other.removed;
    }
}

/// Apply `batch` to `index` in order.
///
/// Stops at the first error (a dimension mismatch); operations before it
/// stay applied.
pub fn apply_batch<I: NeighborIndex>(
    index: &mut I,
    batch: UpdateBatch<I::Label, I::Scalar>,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    for op in batch {
        match op {
            UpdateOp::Upsert { label, vector } => match index.upsert(label, vector)? {
                InsertOutcome::Inserted => summary.upserted += 1,
                InsertOutcome::Skipped => summary.skipped += 1,
            },
            UpdateOp::Delete { label } => {
                if index.remove(&label) {
                    summary.removed += 1;
                }
            }
        }
    }
    debug!(
        upserted = summary.upserted,
        skipped = summary.skipped,
        removed = summary.removed,
        "applied update batch"
    );
    Ok(summary)
}
