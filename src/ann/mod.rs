//! Index-independent interfaces and tools.
//!
//! - [`NeighborIndex`]: the contract shared by [`GaussianLsh`](crate::GaussianLsh)
//!   and [`LinearIndex`](crate::LinearIndex)
//! - [`graph`]: k-NN graph export and recall against an exact index
//!
//! Code written against the trait can swap the approximate index for the
//! exact one, which is how recall is measured:
//!
//! ```rust
//! use gaussian_lsh::ann::{graph, NeighborIndex};
//! use gaussian_lsh::{GaussianLsh, LinearIndex, LshParams, SearchParams};
//!
//! fn fill<I: NeighborIndex<Label = u32, Scalar = f32>>(index: &mut I) {
//!     for i in 0..50u32 {
//!         let v: Vec<f32> = (0..8).map(|j| ((i * 8 + j) as f32).sin()).collect();
//!         index.upsert(i, v).unwrap();
//!     }
//! }
//!
//! let params = LshParams::default().with_normalize_inputs(true).with_seed(3);
//! let mut approx: GaussianLsh<u32> = GaussianLsh::new(8, params).unwrap();
//! let mut exact: LinearIndex<u32> = LinearIndex::new(8);
//! fill(&mut approx);
//! fill(&mut exact);
//!
//! let q = SearchParams::limit(5).with_ensure_limit(true);
//! let found = approx.query_label(&0, &q, true).unwrap();
//! let truth = exact.query_label(&0, &q, true).unwrap();
//! let r = graph::recall_at(&truth, &found, 5);
//! assert!((0.0..=1.0).contains(&r));
//! ```

pub mod graph;
pub mod traits;

pub use traits::{IndexStats, InsertOutcome, InsertSummary, Label, NeighborIndex};
