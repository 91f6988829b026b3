//! Error types for gaussian-lsh.

use thiserror::Error;

/// Errors that can occur during indexing, sampling, or search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LshError {
    /// Random sampling was requested from an empty container.
    #[error("cannot sample from an empty container")]
    EmptyContainer,

    /// Direct lookup of a label that is not stored.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Vector rank differs from the rank the index was built with.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Sample without replacement larger than the population.
    #[error("cannot draw {requested} distinct samples from {available} items")]
    InvalidSampleSize { requested: usize, available: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// I/O error while exporting results.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for LshError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl LshError {
    pub(crate) fn key_not_found<K: std::fmt::Debug>(key: &K) -> Self {
        Self::KeyNotFound(format!("{key:?}"))
    }
}

pub type Result<T> = std::result::Result<T, LshError>;
