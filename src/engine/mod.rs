// src/engine/mod.rs

pub mod account;
pub mod batch;
pub mod costs;
pub mod error;
pub mod position;
pub mod prepare_inputs;
pub mod replay;
pub mod settle;

use ndarray::{Array1, ArrayView2};
use tracing::{debug, trace};

use crate::engine::{
    account::Account,
    costs::EngineConfig,
    error::EngineResult,
    prepare_inputs::{check_initial_cash, check_shapes},
    settle::settle_day,
};

/// Daily settlement engine with T+1 handling.
///
/// Owns one [`Account`] for its whole lifetime. The account is set up at
/// construction only, so consecutive [`ChronoEngine::run`] calls continue
/// from where the previous one left the ledger.
#[derive(Clone, Debug)]
pub struct ChronoEngine {
    account: Account,
    config:  EngineConfig,
}

impl ChronoEngine {
    pub fn new(initial_cash: f64, config: EngineConfig) -> EngineResult<Self> {
        check_initial_cash(initial_cash)?;
        config.validate()?;
        Ok(Self { account: Account::new(initial_cash), config })
    }

    /// Resume from an existing ledger, e.g. a replay snapshot.
    pub fn from_account(account: Account, config: EngineConfig) -> EngineResult<Self> {
        account.validate()?;
        config.validate()?;
        Ok(Self { account, config })
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn into_account(self) -> Account {
        self.account
    }

    /// Settle every day of `prices`/`signals` (`[day][instrument]`) in order
    /// and return day-end equity per day.
    pub fn run(
        &mut self,
        prices: ArrayView2<'_, f64>,
        signals: ArrayView2<'_, f64>,
    ) -> EngineResult<Array1<f64>> {
        check_shapes(&prices, &signals)?;
        let (n_days, n_instruments) = prices.dim();
        debug!(n_days, n_instruments, cash = self.account.cash, "settlement run started");

        let mut equity = Vec::with_capacity(n_days);
        for (day, (p, s)) in prices.outer_iter().zip(signals.outer_iter()).enumerate() {
            let report = settle_day(&mut self.account, p, s, &self.config);
            trace!(
                day,
                equity = report.equity,
                buys = report.buys,
                sells = report.sells,
                skipped = report.skipped,
                "day settled"
            );
            equity.push(report.equity);
        }

        debug!(
            n_days,
            final_equity = equity.last().copied().unwrap_or(self.account.cash),
            "settlement run finished"
        );
        Ok(Array1::from_vec(equity))
    }
}

/// One run on a fresh engine.
pub fn simulate(
    initial_cash: f64,
    config: EngineConfig,
    prices: ArrayView2<'_, f64>,
    signals: ArrayView2<'_, f64>,
) -> EngineResult<Array1<f64>> {
    ChronoEngine::new(initial_cash, config)?.run(prices, signals)
}
