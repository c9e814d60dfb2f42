// src/engine/account.rs

use std::collections::BTreeMap;

use ndarray::ArrayView1;

use crate::engine::costs::CostModel;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::position::Position;

/// A price that can be traded and valued today.
#[inline]
pub fn is_tradeable(price: f64) -> bool {
    price > 0.0 && price.is_finite()
}

/// The single ledger: cash plus holdings keyed by instrument index.
///
/// The ledger never rejects a trade; callers only request trades whose
/// preconditions (enough cash, enough sellable shares) already hold.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Account {
    pub cash:      f64,
    pub positions: BTreeMap<usize, Position>,
}

impl Account {
    pub fn new(initial_cash: f64) -> Self {
        Self { cash: initial_cash, positions: BTreeMap::new() }
    }

    pub fn position(&self, instrument: usize) -> Option<&Position> {
        self.positions.get(&instrument)
    }

    /// T+1 settlement: everything held is sellable from today on.
    pub fn rollover(&mut self) {
        for pos in self.positions.values_mut() {
            pos.unlock();
        }
    }

    /// Bought shares stay locked until the next rollover.
    pub fn apply_buy(&mut self, instrument: usize, shares: f64, price: f64, costs: &CostModel) {
        self.apply_buy_at_cost(instrument, shares, price, costs.buy_cost(shares * price));
    }

    /// Same as [`Account::apply_buy`] with the all-in cost already known.
    /// Requires `cost <= cash`.
    pub fn apply_buy_at_cost(&mut self, instrument: usize, shares: f64, price: f64, cost: f64) {
        self.positions.entry(instrument).or_default().add(shares, price);
        self.cash -= cost;
    }

    /// Requires `shares <= sellable_shares`.
    pub fn apply_sell(&mut self, instrument: usize, shares: f64, price: f64, costs: &CostModel) {
        self.apply_sell_for(instrument, shares, costs.sell_proceeds(shares * price));
    }

    /// Same as [`Account::apply_sell`] with the net proceeds already known.
    pub fn apply_sell_for(&mut self, instrument: usize, shares: f64, proceeds: f64) {
        if let Some(pos) = self.positions.get_mut(&instrument) {
            pos.remove(shares);
            self.cash += proceeds;
        }
    }

    /// Checks the ledger invariants, for accounts built outside the engine.
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.cash.is_finite() && self.cash >= 0.0) {
            return Err(EngineError::InvalidAccount(format!(
                "cash must be finite and >= 0, got {}",
                self.cash
            )));
        }
        for (&i, pos) in &self.positions {
            let finite = pos.total_shares.is_finite()
                && pos.sellable_shares.is_finite()
                && pos.avg_cost.is_finite();
            if !finite
                || pos.sellable_shares < 0.0
                || pos.sellable_shares > pos.total_shares
                || pos.avg_cost < 0.0
                || (pos.total_shares == 0.0 && pos.avg_cost != 0.0)
            {
                return Err(EngineError::InvalidAccount(format!(
                    "instrument {} holds an inconsistent position {:?}",
                    i, pos
                )));
            }
        }
        Ok(())
    }

    /// Value of holdings at `prices`; unpriceable instruments count as 0.
    pub fn holdings_value(&self, prices: ArrayView1<'_, f64>) -> f64 {
        self.positions
            .iter()
            .filter_map(|(&i, pos)| {
                prices
                    .get(i)
                    .copied()
                    .filter(|&px| is_tradeable(px))
                    .map(|px| pos.market_value(px))
            })
            .sum()
    }

    /// Mark-to-market equity: cash plus priceable holdings.
    pub fn equity(&self, prices: ArrayView1<'_, f64>) -> f64 {
        self.cash + self.holdings_value(prices)
    }
}
