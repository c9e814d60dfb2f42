// src/engine/prepare_inputs.rs

use ndarray::{ArrayView2, ArrayViewD, Ix2};

use crate::engine::error::{EngineError, EngineResult};

fn as_matrix<'a>(arr: ArrayViewD<'a, f64>, name: &'static str) -> EngineResult<ArrayView2<'a, f64>> {
    let ndim = arr.ndim();
    arr.into_dimensionality::<Ix2>()
        .map_err(|_| EngineError::NotTwoDimensional { name, ndim })
}

/// Both matrices must be `[day][instrument]` with identical shape.
pub fn check_shapes(prices: &ArrayView2<'_, f64>, signals: &ArrayView2<'_, f64>) -> EngineResult<()> {
    if prices.dim() != signals.dim() {
        return Err(EngineError::ShapeMismatch {
            prices:  prices.dim(),
            signals: signals.dim(),
        });
    }
    Ok(())
}

pub fn check_initial_cash(initial_cash: f64) -> EngineResult<()> {
    if !(initial_cash.is_finite() && initial_cash > 0.0) {
        return Err(EngineError::InvalidInitialCash(initial_cash));
    }
    Ok(())
}

/// Dynamic-rank inputs (as they arrive from numpy) to checked 2D views.
pub fn prepare_inputs<'a>(
    prices: ArrayViewD<'a, f64>,
    signals: ArrayViewD<'a, f64>,
) -> EngineResult<(ArrayView2<'a, f64>, ArrayView2<'a, f64>)> {
    let p = as_matrix(prices, "prices")?;
    let s = as_matrix(signals, "signals")?;
    check_shapes(&p, &s)?;
    Ok((p, s))
}
