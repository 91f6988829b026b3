//! Index construction and query parameters.

use serde::{Deserialize, Serialize};

use crate::error::{LshError, Result};

/// Construction parameters for [`GaussianLsh`](super::GaussianLsh).
///
/// All fields are frozen once the index exists. Serializable, so a config
/// can live next to whatever else the caller loads from disk:
///
/// ```rust
/// use gaussian_lsh::LshParams;
///
/// let params = LshParams::default().with_tables(8).with_window(1.0).with_seed(42);
/// assert_eq!(params.num_tables, 8);
/// assert_eq!(params.num_projections, 32);
/// params.validate(128).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LshParams {
    /// Number of independent hash tables (`L`). More tables raise recall.
    pub num_tables: usize,
    /// Quantized components per table (`k`). More components shrink buckets.
    pub num_projections: usize,
    /// Quantization window (`w`).
    pub window: f64,
    /// Rescale vectors to unit L2 norm on insert and query.
    pub normalize_inputs: bool,
    /// Seed for projection generation and sampling; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for LshParams {
    fn default() -> Self {
        Self {
            num_tables: 15,
            num_projections: 32,
            window: 0.5,
            normalize_inputs: false,
            seed: None,
        }
    }
}

impl LshParams {
    pub fn with_tables(mut self, num_tables: usize) -> Self {
        self.num_tables = num_tables;
        self
    }

    pub fn with_projections(mut self, num_projections: usize) -> Self {
        self.num_projections = num_projections;
        self
    }

    pub fn with_window(mut self, window: f64) -> Self {
        self.window = window;
        self
    }

    pub fn with_normalize_inputs(mut self, normalize_inputs: bool) -> Self {
        self.normalize_inputs = normalize_inputs;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the parameters against a vector rank.
    pub fn validate(&self, rank: usize) -> Result<()> {
        if rank == 0 {
            return Err(LshError::InvalidParameter("rank must be positive".into()));
        }
        if self.num_tables == 0 {
            return Err(LshError::InvalidParameter(
                "num_tables must be positive".into(),
            ));
        }
        if self.num_projections == 0 {
            return Err(LshError::InvalidParameter(
                "num_projections must be positive".into(),
            ));
        }
        if !(self.window.is_finite() && self.window > 0.0) {
            return Err(LshError::InvalidParameter(format!(
                "window must be a positive finite number, got {}",
                self.window
            )));
        }
        Ok(())
    }
}

/// Options for a single query.
///
/// `search_k` bounds how many vote-ranked candidates are re-ranked exactly;
/// it defaults to `limit * num_tables` when a limit is set and is unbounded
/// otherwise. `ensure_limit` pads short candidate lists with uniformly
/// sampled items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub limit: Option<usize>,
    pub ensure_limit: bool,
    pub search_k: Option<usize>,
}

impl SearchParams {
    /// Return at most `limit` neighbors.
    pub fn limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn with_ensure_limit(mut self, ensure_limit: bool) -> Self {
        self.ensure_limit = ensure_limit;
        self
    }

    pub fn with_search_k(mut self, search_k: usize) -> Self {
        self.search_k = Some(search_k);
        self
    }

    /// Candidate budget given the number of tables.
    pub fn effective_search_k(&self, num_tables: usize) -> Option<usize> {
        self.search_k
            .or_else(|| self.limit.map(|limit| limit.saturating_mul(num_tables)))
    }
}
