// src/engine/batch.rs

use ndarray::{Array1, ArrayView2};
use rayon::prelude::*;
use tracing::debug;

use crate::engine::{costs::EngineConfig, error::EngineResult, simulate};

/// One independent price/signal pair.
#[derive(Clone, Copy, Debug)]
pub struct Scenario<'a> {
    pub prices:  ArrayView2<'a, f64>,
    pub signals: ArrayView2<'a, f64>,
}

impl<'a> Scenario<'a> {
    pub fn new(prices: ArrayView2<'a, f64>, signals: ArrayView2<'a, f64>) -> Self {
        Self { prices, signals }
    }
}

/// Run every scenario on its own fresh engine, in parallel.
///
/// Days inside a run stay sequential; only whole runs are spread over the
/// rayon pool. Results come back in input order, one per scenario.
pub fn run_batch(
    initial_cash: f64,
    config: EngineConfig,
    scenarios: &[Scenario<'_>],
) -> Vec<EngineResult<Array1<f64>>> {
    debug!(n_scenarios = scenarios.len(), "batch started");
    scenarios
        .par_iter()
        .map(|sc| simulate(initial_cash, config, sc.prices, sc.signals))
        .collect()
}
