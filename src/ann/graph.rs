//! Neighbor-graph export and recall measurement.

use std::fmt::Display;
use std::hash::Hash;
use std::io::Write;

use rustc_hash::FxHashSet;
use tracing::debug;

use super::traits::NeighborIndex;
use crate::error::Result;
use crate::hash::SearchParams;
use crate::vector::Scalar;

/// Write the `limit`-nearest-neighbor graph of every stored item.
///
/// Emits one `label,neighbor,similarity` line per edge. Items are visited in
/// ascending label order and each item's own label is dropped from its
/// neighbor list. Returns the number of edges written.
pub fn write_neighbor_graph<I, W>(index: &I, out: &mut W, params: &SearchParams) -> Result<usize>
where
    I: NeighborIndex,
    I::Label: Display,
    W: Write,
{
    let mut labels: Vec<&I::Label> = index.labels().collect();
    labels.sort_unstable();

    let mut edges = 0;
    for label in labels {
        for (neighbor, similarity) in index.query_label(label, params, true)? {
            writeln!(out, "{label},{neighbor},{}", similarity.to_f64())?;
            edges += 1;
        }
    }
    out.flush()?;
    debug!(items = index.len(), edges, "wrote neighbor graph");
    Ok(edges)
}

/// Fraction of the top `n` exact neighbors present in the top `n` of `found`.
///
/// Both lists are `(label, similarity)` pairs, best first. Returns 1.0 when
/// there is nothing to find.
pub fn recall_at<L: Hash + Eq, T>(exact: &[(L, T)], found: &[(L, T)], n: usize) -> f64 {
    let truth: FxHashSet<&L> = exact.iter().take(n).map(|(label, _)| label).collect();
    if truth.is_empty() {
        return 1.0;
    }
    let hits = found
        .iter()
        .take(n)
        .filter(|(label, _)| truth.contains(label))
        .count();
    hits as f64 / truth.len() as f64
}

/// Mean [`recall_at`] of `approx` against `exact` over the given queries.
pub fn mean_recall<A, E>(
    approx: &A,
    exact: &E,
    queries: &[Vec<A::Scalar>],
    n: usize,
) -> Result<f64>
where
    A: NeighborIndex,
    E: NeighborIndex<Label = A::Label, Scalar = A::Scalar>,
{
    if queries.is_empty() {
        return Ok(0.0);
    }
    let params = SearchParams::limit(n);
    let mut total = 0.0;
    for query in queries {
        let truth = exact.query_vector(query, &params, &[])?;
        let found = approx.query_vector(query, &params, &[])?;
        total += recall_at(&truth, &found, n);
    }
    Ok(total / queries.len() as f64)
}
