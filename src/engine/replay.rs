// src/engine/replay.rs

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};

use crate::engine::{
    account::Account,
    costs::EngineConfig,
    error::EngineResult,
    position::Position,
    prepare_inputs::{check_initial_cash, check_shapes},
    settle::settle_day,
};

/// Ledger state at the end of a settled day.
#[derive(Clone, Debug, PartialEq)]
pub struct AccountSnapshot {
    pub day:       usize,
    pub cash:      f64,
    pub positions: BTreeMap<usize, Position>,
    pub equity:    f64,
}

/// Day-by-day stepping over a fixed scenario, with the ability to undo days.
///
/// Keeps one ledger per settled day; `back` drops the latest one.
#[derive(Clone, Debug)]
pub struct Replay {
    prices:    Array2<f64>,
    signals:   Array2<f64>,
    config:    EngineConfig,
    states:    Vec<Account>, // states[0] is the opening ledger
    snapshots: Vec<AccountSnapshot>,
}

impl Replay {
    pub fn new(
        initial_cash: f64,
        config: EngineConfig,
        prices: Array2<f64>,
        signals: Array2<f64>,
    ) -> EngineResult<Self> {
        check_initial_cash(initial_cash)?;
        config.validate()?;
        check_shapes(&prices.view(), &signals.view())?;
        Ok(Self {
            prices,
            signals,
            config,
            states: vec![Account::new(initial_cash)],
            snapshots: Vec::new(),
        })
    }

    pub fn n_days(&self) -> usize {
        self.prices.nrows()
    }

    /// Number of days settled so far (the index of the next day to settle).
    pub fn current_day(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_finished(&self) -> bool {
        self.current_day() >= self.n_days()
    }

    pub fn account(&self) -> &Account {
        // states is never empty
        &self.states[self.states.len() - 1]
    }

    pub fn snapshots(&self) -> &[AccountSnapshot] {
        &self.snapshots
    }

    pub fn equity_curve(&self) -> Array1<f64> {
        self.snapshots.iter().map(|s| s.equity).collect()
    }

    /// Settle the next day. `None` once every day has been settled.
    pub fn step(&mut self) -> Option<&AccountSnapshot> {
        if self.is_finished() {
            return None;
        }
        let day = self.current_day();
        let mut account = self.account().clone();
        let report = settle_day(
            &mut account,
            self.prices.row(day),
            self.signals.row(day),
            &self.config,
        );

        self.snapshots.push(AccountSnapshot {
            day,
            cash: account.cash,
            positions: account.positions.clone(),
            equity: report.equity,
        });
        self.states.push(account);
        self.snapshots.last()
    }

    /// Undo the most recent day and return the snapshot that is current
    /// again. `None` means the replay is back at the opening ledger.
    pub fn back(&mut self) -> Option<&AccountSnapshot> {
        self.snapshots.pop()?;
        self.states.pop();
        self.snapshots.last()
    }

    pub fn run_to_end(&mut self) -> Array1<f64> {
        while self.step().is_some() {}
        self.equity_curve()
    }
}
