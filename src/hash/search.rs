//! Query path: vote across tables, pad, re-rank exactly.

use std::borrow::Cow;
use std::cmp::{Ordering, Reverse};

use rand::seq::IndexedRandom;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{trace, warn};

use super::index::GaussianLsh;
use super::params::SearchParams;
use crate::ann::Label;
use crate::error::Result;
use crate::vector::{dot, normalize, Scalar};

/// Sort `(label, similarity)` pairs by descending similarity, ties by label.
///
/// NaN similarities (from stored vectors with NaN components) sort after
/// every number. `-0.0` and `0.0` compare equal.
pub(crate) fn rank_by_similarity<L: Ord, T: Scalar>(hits: &mut [(L, T)]) {
    fn score<T: Scalar>(s: T) -> (bool, f64) {
        let x = s.to_f64();
        (x.is_nan(), x + 0.0)
    }
    hits.sort_by(|(la, sa), (lb, sb)| {
        let (nan_a, a) = score(*sa);
        let (nan_b, b) = score(*sb);
        nan_a
            .cmp(&nan_b)
            .then_with(|| if nan_a { Ordering::Equal } else { b.total_cmp(&a) })
            .then_with(|| la.cmp(lb))
    });
}

impl<L: Label, T: Scalar> GaussianLsh<L, T> {
    /// Approximate neighbors of `vector`.
    ///
    /// Every label sharing a bucket with `vector` gets one vote per table.
    /// The `search_k` most-voted labels (ties by ascending label) are scored
    /// by inner product with `vector` and returned best first, at most
    /// `limit` of them. Labels in `drop_labels` never appear.
    ///
    /// With `ensure_limit`, a short candidate list is padded with distinct
    /// labels drawn uniformly from the store. Padding stops quietly once the
    /// store runs out.
    ///
    /// With `normalize_inputs`, a vector that cannot be normalized yields an
    /// empty result rather than an error.
    pub fn query_vector(
        &self,
        vector: &[T],
        params: &SearchParams,
        drop_labels: &[L],
    ) -> Result<Vec<(L, T)>> {
        self.check_dimension(vector)?;

        let query: Cow<'_, [T]> = if self.params().normalize_inputs {
            match normalize(vector) {
                Some(v) => Cow::Owned(v),
                None => {
                    warn!("query vector cannot be normalized, returning no results");
                    return Ok(Vec::new());
                }
            }
        } else {
            Cow::Borrowed(vector)
        };

        Ok(self.search_normalized(&query, params, drop_labels))
    }

    /// Approximate neighbors of a stored item.
    ///
    /// Uses the stored vector as is (already normalized when the index
    /// normalizes). `drop_self` keeps `label` out of the result.
    ///
    /// # Errors
    ///
    /// [`LshError::KeyNotFound`](crate::LshError::KeyNotFound) if `label` is
    /// not stored.
    pub fn query_label(
        &self,
        label: &L,
        params: &SearchParams,
        drop_self: bool,
    ) -> Result<Vec<(L, T)>> {
        let vector = self.vector(label)?;
        let drop: &[L] = if drop_self {
            std::slice::from_ref(label)
        } else {
            &[]
        };
        Ok(self.search_normalized(vector, params, drop))
    }

    /// Top `limit` neighbors of `vector` with default options.
    pub fn search(&self, vector: &[T], limit: usize) -> Result<Vec<(L, T)>> {
        self.query_vector(vector, &SearchParams::limit(limit), &[])
    }

    fn search_normalized(
        &self,
        query: &[T],
        params: &SearchParams,
        drop_labels: &[L],
    ) -> Vec<(L, T)> {
        if params.limit == Some(0) {
            return Vec::new();
        }

        let dropped: FxHashSet<&L> = drop_labels.iter().collect();
        let mut candidates = self.candidates(query, &dropped, params);
        trace!(candidates = candidates.len(), "lsh candidates after voting");

        if params.ensure_limit {
            if let Some(limit) = params.limit {
                if candidates.len() < limit {
                    self.pad(&mut candidates, &dropped, limit);
                }
            }
        }

        let mut hits: Vec<(L, T)> = candidates
            .into_iter()
            .filter_map(|label| {
                self.vectors
                    .get(label)
                    .map(|stored| (label.clone(), dot(query, stored)))
            })
            .collect();
        rank_by_similarity(&mut hits);
        if let Some(limit) = params.limit {
            hits.truncate(limit);
        }
        hits
    }

    /// Vote-ranked candidate labels, capped at `search_k`.
    fn candidates<'a>(
        &'a self,
        query: &[T],
        dropped: &FxHashSet<&L>,
        params: &SearchParams,
    ) -> Vec<&'a L> {
        let mut votes: FxHashMap<&'a L, u32> = FxHashMap::default();
        for (table, key) in self.tables.iter().zip(self.projection().keys(query)) {
            if let Some(bucket) = table.get(&key) {
                for label in bucket {
                    *votes.entry(label).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(&L, u32)> = votes
            .into_iter()
            .filter(|(label, _)| !dropped.contains(*label))
            .collect();
        ranked.sort_unstable_by_key(|&(label, hits)| (Reverse(hits), label));
        if let Some(search_k) = params.effective_search_k(self.num_tables()) {
            ranked.truncate(search_k);
        }

        ranked
            .into_iter()
            .map(|(label, _)| label)
            .filter(|label| self.vectors.contains_key(label))
            .collect()
    }

    /// Top up `candidates` to `limit` with uniformly drawn stored labels.
    fn pad<'a>(&'a self, candidates: &mut Vec<&'a L>, dropped: &FxHashSet<&L>, limit: usize) {
        let mut excluded: FxHashSet<&L> = candidates.iter().copied().collect();
        excluded.extend(dropped.iter().copied());

        let total = self.vectors.len();
        let blocked = excluded
            .iter()
            .filter(|label| self.vectors.contains_key(label))
            .count();
        let available = total - blocked;
        let wanted = (limit - candidates.len()).min(available);
        if wanted == 0 {
            return;
        }

        let mut rng = self.rng.lock();
        if available * 2 >= total {
            // Mostly free: rejection sampling finishes in O(wanted) expected draws.
            let mut drawn = 0;
            while drawn < wanted {
                let Ok(label) = self.vectors.random_key(&mut *rng) else {
                    break;
                };
                if excluded.insert(label) {
                    candidates.push(label);
                    drawn += 1;
                }
            }
        } else {
            let pool: Vec<&L> = self
                .vectors
                .keys()
                .filter(|label| !excluded.contains(*label))
                .collect();
            candidates.extend(pool.choose_multiple(&mut *rng, wanted).copied());
        }
        trace!(padded = wanted, "padded lsh candidates");
    }
}
