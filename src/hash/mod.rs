//! Gaussian locality sensitive hashing.
//!
//! The core idea: **design hash functions where similar items collide more
//! often than dissimilar ones**. Ordinary hashes try to minimize collisions;
//! LSH wants
//!
//! - P[h(a) = h(b)] high when a and b are close
//! - P[h(a) = h(b)] low when a and b are far apart
//!
//! so a query only needs to look at the items that share its buckets instead
//! of scanning the whole dataset.
//!
//! ## p-stable projections
//!
//! For a direction `a` drawn from a Gaussian and a shift `b ~ U[0, w)`,
//!
//! ```text
//! h(v) = floor((a · v + b) / w)
//! ```
//!
//! puts nearby vectors in the same integer cell with probability that
//! decays with their distance (Datar et al. 2004). One code is weak, so each
//! table concatenates `k` of them: a collision in a table then requires all
//! `k` to agree, which cuts false positives. `L` independent tables restore
//! recall, and the number of tables in which a stored item collides with the
//! query is its *vote*.
//!
//! ## Query
//!
//! 1. Hash the query into one bucket per table and tally votes.
//! 2. Keep the `search_k` most-voted labels.
//! 3. Optionally pad a short list with uniformly sampled labels.
//! 4. Re-rank by exact inner product and truncate to `limit`.
//!
//! With unit vectors (`normalize_inputs`) the inner product is the cosine
//! similarity.
//!
//! ## Tuning
//!
//! | Knob | Raise it to | Cost |
//! |------|-------------|------|
//! | `num_tables` (L) | find more true neighbors | memory, insert time |
//! | `num_projections` (k) | shrink buckets | recall |
//! | `window` (w) | widen buckets | candidate volume |
//!
//! ## References
//!
//! - Indyk & Motwani (1998). "Approximate nearest neighbors: towards removing
//!   the curse of dimensionality."
//! - Datar, Immorlica, Indyk & Mirrokni (2004). "Locality-sensitive hashing
//!   scheme based on p-stable distributions."

mod hash_table;
mod index;
mod params;
pub mod random_projection;
mod search;

pub use hash_table::{BucketKey, BucketTable};
pub use index::GaussianLsh;
pub use params::{LshParams, SearchParams};
pub use random_projection::GaussianProjection;

pub(crate) use search::rank_by_similarity;
