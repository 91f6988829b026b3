//! gaussian-lsh: approximate nearest neighbor search with Gaussian LSH.
//!
//! Two pieces do the work:
//!
//! - [`RandomSamplingMap`]: a hash map that also keeps its keys in a dense
//!   id range, giving O(1) uniform sampling next to O(1) insert, remove, and
//!   lookup.
//! - [`GaussianLsh`]: `L` hash tables keyed by quantized Gaussian random
//!   projections. Queries tally bucket collisions across tables, optionally
//!   pad short candidate lists by sampling the store, and re-rank the
//!   survivors by exact inner product.
//!
//! [`LinearIndex`] is an exact brute-force index behind the same
//! [`NeighborIndex`] trait, used as ground truth for recall.
//!
//! # Quick start
//!
//! ```rust
//! use gaussian_lsh::{GaussianLsh, LshParams, SearchParams};
//!
//! let params = LshParams::default()
//!     .with_tables(10)
//!     .with_projections(8)
//!     .with_normalize_inputs(true)
//!     .with_seed(42);
//! let mut index: GaussianLsh<&str> = GaussianLsh::new(3, params)?;
//!
//! index.insert("a", vec![1.0, 0.0, 0.0])?;
//! index.insert("b", vec![0.9, 0.1, 0.0])?;
//! index.insert("c", vec![0.0, 0.0, 1.0])?;
//!
//! let search = SearchParams::limit(2).with_ensure_limit(true);
//! let hits = index.query_vector(&[1.0, 0.05, 0.0], &search, &[])?;
//! assert_eq!(hits.len(), 2);
//! assert!(hits.windows(2).all(|w| w[0].1 >= w[1].1));
//! # Ok::<(), gaussian_lsh::LshError>(())
//! ```
//!
//! # Notes
//!
//! ## Votes are not similarities
//!
//! The vote count only decides *which* candidates are scored. Results are
//! always ordered by exact inner product, so a label found in a single table
//! can outrank one found in all of them.
//!
//! ## Padding
//!
//! `ensure_limit` fills a short candidate list with uniformly random stored
//! items. Those are real items with real scores, but they are not neighbors
//! in any meaningful sense; recall measurements should leave it off.
//!
//! ## Normalization
//!
//! With `normalize_inputs`, inner product equals cosine similarity. Vectors
//! that cannot be normalized (all zeros, overflow) are skipped on insert and
//! give an empty answer on query, with a `tracing` warning in both cases.
//!
//! ## When exact search wins
//!
//! - Small datasets (a few thousand vectors): a linear scan is fast enough
//! - Very high recall requirements: the candidate budget grows toward `n`

pub mod ann;
pub mod batch;
pub mod error;
pub mod hash;
pub mod linear;
pub mod sampling;
pub mod shared;
pub mod vector;

pub use ann::{IndexStats, InsertOutcome, InsertSummary, Label, NeighborIndex};
pub use batch::{apply_batch, BatchSummary, UpdateBatch, UpdateOp};
pub use error::{LshError, Result};
pub use hash::{BucketKey, GaussianLsh, LshParams, SearchParams};
pub use linear::LinearIndex;
pub use sampling::RandomSamplingMap;
pub use shared::SharedIndex;
