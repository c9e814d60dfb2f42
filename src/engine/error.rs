// src/engine/error.rs

use thiserror::Error;

/// Configuration errors. All of them are raised before any ledger mutation;
/// per-instrument skips during a run are policy outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("'{name}' must be a 2D array, got {ndim} dimension(s)")]
    NotTwoDimensional { name: &'static str, ndim: usize },

    #[error("prices shape {prices:?} != signals shape {signals:?}")]
    ShapeMismatch {
        prices:  (usize, usize),
        signals: (usize, usize),
    },

    #[error("initial cash must be finite and positive, got {0}")]
    InvalidInitialCash(f64),

    #[error("invalid cost model: {0}")]
    InvalidCostModel(String),

    #[error("invalid account: {0}")]
    InvalidAccount(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
