// src/bindings.rs

use numpy::{IntoPyArray, PyArray1, PyReadonlyArrayDyn};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::engine::{
    batch::{self, Scenario},
    costs::{BuySizing, CostModel, EngineConfig, DEFAULT_COMMISSION_RATE, DEFAULT_SLIPPAGE_RATE},
    error::EngineError,
    prepare_inputs::prepare_inputs,
    ChronoEngine,
};

impl From<EngineError> for PyErr {
    fn from(err: EngineError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

fn config_from(commission_rate: f64, slippage_rate: f64, net_of_costs: bool) -> EngineConfig {
    let sizing = if net_of_costs { BuySizing::NetOfCosts } else { BuySizing::GrossOfCosts };
    EngineConfig::default()
        .with_costs(CostModel::new(commission_rate, slippage_rate))
        .with_sizing(sizing)
}

/// Core execution engine with T+1 handling.
#[pyclass(name = "ChronoEngine")]
pub struct PyChronoEngine {
    inner: ChronoEngine,
}

#[pymethods]
impl PyChronoEngine {
    #[new]
    #[pyo3(signature = (
        initial_cash,
        commission_rate = DEFAULT_COMMISSION_RATE,
        slippage_rate = DEFAULT_SLIPPAGE_RATE,
        net_of_costs = true
    ))]
    fn new(
        initial_cash: f64,
        commission_rate: f64,
        slippage_rate: f64,
        net_of_costs: bool,
    ) -> PyResult<Self> {
        let config = config_from(commission_rate, slippage_rate, net_of_costs);
        Ok(Self { inner: ChronoEngine::new(initial_cash, config)? })
    }

    /// Run backtest and return equity curve as numpy array.
    fn run<'py>(
        &mut self,
        py: Python<'py>,
        prices: PyReadonlyArrayDyn<'py, f64>,
        signals: PyReadonlyArrayDyn<'py, f64>,
    ) -> PyResult<&'py PyArray1<f64>> {
        let (p, s) = prepare_inputs(prices.as_array(), signals.as_array())?;
        let equity = self.inner.run(p, s)?;
        Ok(equity.into_pyarray(py))
    }

    #[getter]
    fn cash(&self) -> f64 {
        self.inner.account().cash
    }
}

/// Independent runs on fresh engines, in parallel with the GIL released.
#[pyfunction]
#[pyo3(signature = (
    initial_cash, prices, signals,
    commission_rate = DEFAULT_COMMISSION_RATE,
    slippage_rate = DEFAULT_SLIPPAGE_RATE,
    net_of_costs = true
))]
pub fn run_batch<'py>(
    py:              Python<'py>,
    initial_cash:    f64,
    prices:          Vec<PyReadonlyArrayDyn<'py, f64>>,
    signals:         Vec<PyReadonlyArrayDyn<'py, f64>>,
    commission_rate: f64,
    slippage_rate:   f64,
    net_of_costs:    bool,
) -> PyResult<Vec<&'py PyArray1<f64>>> {
    if prices.len() != signals.len() {
        return Err(PyValueError::new_err(format!(
            "got {} price matrices but {} signal matrices",
            prices.len(),
            signals.len()
        )));
    }
    let config = config_from(commission_rate, slippage_rate, net_of_costs);

    // 1) Validate and copy out of numpy while we still hold the GIL
    let mut owned = Vec::with_capacity(prices.len());
    for (p, s) in prices.iter().zip(signals.iter()) {
        let (p, s) = prepare_inputs(p.as_array(), s.as_array())?;
        owned.push((p.to_owned(), s.to_owned()));
    }

    // 2) Simulate on the rayon pool
    let results = py.allow_threads(|| {
        let scenarios: Vec<Scenario<'_>> = owned
            .iter()
            .map(|(p, s)| Scenario::new(p.view(), s.view()))
            .collect();
        batch::run_batch(initial_cash, config, &scenarios)
    });

    // 3) Marshal back
    results
        .into_iter()
        .map(|r| -> PyResult<&'py PyArray1<f64>> { Ok(r?.into_pyarray(py)) })
        .collect()
}
