// src/lib.rs

//! Daily settlement kernel: a single cash account trading a universe of
//! instruments from a `[day][instrument]` price matrix and a matching
//! signal matrix under T+1 settlement, producing the day-end equity curve.

pub mod engine;

#[cfg(feature = "python")]
mod bindings;

pub use engine::{
    account::{is_tradeable, Account},
    batch::{run_batch, Scenario},
    costs::{BuySizing, CostModel, EngineConfig, DEFAULT_COMMISSION_RATE, DEFAULT_SLIPPAGE_RATE},
    error::{EngineError, EngineResult},
    position::Position,
    prepare_inputs::prepare_inputs,
    replay::{AccountSnapshot, Replay},
    settle::{resolve_intent, settle_day, DayReport, Decision, SkipReason},
    simulate, ChronoEngine,
};

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn chrono_engine(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<bindings::PyChronoEngine>()?;
    m.add_function(wrap_pyfunction!(bindings::run_batch, m)?)?;
    Ok(())
}
