// src/engine/costs.rs

use crate::engine::error::{EngineError, EngineResult};

pub const DEFAULT_COMMISSION_RATE: f64 = 0.0003;
pub const DEFAULT_SLIPPAGE_RATE: f64 = 0.0003;

/// Proportional transaction costs, charged symmetrically on both legs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostModel {
    pub commission_rate: f64, // fraction of notional
    pub slippage_rate:   f64, // fraction of notional
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            commission_rate: DEFAULT_COMMISSION_RATE,
            slippage_rate:   DEFAULT_SLIPPAGE_RATE,
        }
    }
}

impl CostModel {
    pub fn new(commission_rate: f64, slippage_rate: f64) -> Self {
        Self { commission_rate, slippage_rate }
    }

    /// Frictionless model, mostly useful in tests.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn total_rate(&self) -> f64 {
        self.commission_rate + self.slippage_rate
    }

    /// Cash debited for buying `notional` worth of shares.
    pub fn buy_cost(&self, notional: f64) -> f64 {
        notional * (1.0 + self.total_rate())
    }

    /// Cash credited for selling `notional` worth of shares.
    pub fn sell_proceeds(&self, notional: f64) -> f64 {
        notional * (1.0 - self.total_rate())
    }

    pub fn validate(&self) -> EngineResult<()> {
        for (name, rate) in [
            ("commission_rate", self.commission_rate),
            ("slippage_rate", self.slippage_rate),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(EngineError::InvalidCostModel(format!(
                    "{} must be finite and >= 0, got {}",
                    name, rate
                )));
            }
        }
        if self.total_rate() >= 1.0 {
            return Err(EngineError::InvalidCostModel(format!(
                "commission_rate + slippage_rate must be < 1, got {}",
                self.total_rate()
            )));
        }
        Ok(())
    }
}

/// How a buy signal's committed cash is turned into a share count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BuySizing {
    /// Committed cash is the all-in budget: costs are carved out of it.
    #[default]
    NetOfCosts,
    /// Committed cash is the notional and costs come on top, so a
    /// full-cash signal never fits and is skipped.
    GrossOfCosts,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineConfig {
    pub costs:  CostModel,
    pub sizing: BuySizing,
}

impl EngineConfig {
    pub fn with_costs(mut self, costs: CostModel) -> Self {
        self.costs = costs;
        self
    }

    pub fn with_sizing(mut self, sizing: BuySizing) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.costs.validate()
    }

    /// `(shares, all-in cost)` of a buy that commits `committed` cash at
    /// `price`. Net-of-costs sizing charges exactly `committed`, so a
    /// full-cash buy leaves the balance at exactly zero.
    pub fn size_buy(&self, committed: f64, price: f64) -> (f64, f64) {
        match self.sizing {
            BuySizing::NetOfCosts => {
                (committed / (price * (1.0 + self.costs.total_rate())), committed)
            }
            BuySizing::GrossOfCosts => {
                let shares = committed / price;
                (shares, self.costs.buy_cost(shares * price))
            }
        }
    }
}
