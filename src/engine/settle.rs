// src/engine/settle.rs

use ndarray::ArrayView1;

use crate::engine::account::{is_tradeable, Account};
use crate::engine::costs::EngineConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Untradeable,         // price <= 0 or non-finite
    NoSignal,            // signal == 0 or NaN
    NonPositiveQuantity, // nothing to buy / nothing sellable
    InsufficientCash,    // all-in cost exceeds cash; no partial fills
    NoPosition,          // sell intent on an instrument never held
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decision {
    Buy  { shares: f64, cost: f64 },
    Sell { shares: f64, proceeds: f64 },
    Skip(SkipReason),
}

/// Signal sign is direction, magnitude (capped at 1) is the fraction of
/// cash to commit (buy) or of the holding to close (sell).
pub fn resolve_intent(
    account: &Account,
    instrument: usize,
    price: f64,
    signal: f64,
    config: &EngineConfig,
) -> Decision {
    if !is_tradeable(price) {
        return Decision::Skip(SkipReason::Untradeable);
    }

    if signal > 0.0 {
        let committed      = account.cash * signal.min(1.0);
        let (shares, cost) = config.size_buy(committed, price);
        if !(shares > 0.0) {
            return Decision::Skip(SkipReason::NonPositiveQuantity);
        }
        // no partial fills: an order that does not fit is dropped whole
        if cost > account.cash {
            return Decision::Skip(SkipReason::InsufficientCash);
        }
        Decision::Buy { shares, cost }
    } else if signal < 0.0 {
        let Some(pos) = account.position(instrument) else {
            return Decision::Skip(SkipReason::NoPosition);
        };
        let shares = pos.sellable_shares.min(pos.total_shares * (-signal).min(1.0));
        if !(shares > 0.0) {
            return Decision::Skip(SkipReason::NonPositiveQuantity);
        }
        Decision::Sell { shares, proceeds: config.costs.sell_proceeds(shares * price) }
    } else {
        Decision::Skip(SkipReason::NoSignal)
    }
}

/// What happened on one settled day.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DayReport {
    pub equity:  f64,
    pub buys:    usize,
    pub sells:   usize,
    pub skipped: usize, // instruments with a signal that produced no trade
}

/// One trading day: rollover, intents in ascending instrument order
/// (earlier instruments get first call on cash), then mark-to-market.
pub fn settle_day(
    account: &mut Account,
    prices: ArrayView1<'_, f64>,
    signals: ArrayView1<'_, f64>,
    config: &EngineConfig,
) -> DayReport {
    let mut report = DayReport::default();

    // 1) Pre-market: unlock yesterday's purchases
    account.rollover();

    // 2) Intents
    for (instrument, (&price, &signal)) in prices.iter().zip(signals.iter()).enumerate() {
        match resolve_intent(account, instrument, price, signal, config) {
            Decision::Buy { shares, cost } => {
                account.apply_buy_at_cost(instrument, shares, price, cost);
                report.buys += 1;
            }
            Decision::Sell { shares, proceeds } => {
                account.apply_sell_for(instrument, shares, proceeds);
                report.sells += 1;
            }
            Decision::Skip(SkipReason::NoSignal) => {}
            Decision::Skip(_) => report.skipped += 1,
        }
    }

    // 3) Mark-to-market
    report.equity = account.equity(prices);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::costs::{BuySizing, CostModel};
    use approx::assert_relative_eq;
    use ndarray::array;

    fn cfg() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn untradeable_price_skips_before_looking_at_signal() {
        let acct = Account::new(1_000.0);
        for px in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert_eq!(
                resolve_intent(&acct, 0, px, 1.0, &cfg()),
                Decision::Skip(SkipReason::Untradeable)
            );
        }
    }

    #[test]
    fn zero_and_nan_signals_do_nothing() {
        let acct = Account::new(1_000.0);
        assert_eq!(resolve_intent(&acct, 0, 10.0, 0.0, &cfg()), Decision::Skip(SkipReason::NoSignal));
        assert_eq!(resolve_intent(&acct, 0, 10.0, f64::NAN, &cfg()), Decision::Skip(SkipReason::NoSignal));
    }

    #[test]
    fn buy_fraction_is_capped_at_one() {
        let acct = Account::new(1_000.0);
        let capped = resolve_intent(&acct, 0, 10.0, 5.0, &cfg());
        let full   = resolve_intent(&acct, 0, 10.0, 1.0, &cfg());
        assert_eq!(capped, full);
    }

    #[test]
    fn half_signal_commits_half_the_cash() {
        let acct = Account::new(1_000.0);
        let Decision::Buy { cost, .. } = resolve_intent(&acct, 0, 10.0, 0.5, &cfg()) else {
            panic!("expected a buy");
        };
        assert_relative_eq!(cost, 500.0, max_relative = 1e-12);
    }

    #[test]
    fn gross_sizing_rejects_full_cash_buys() {
        let acct = Account::new(1_000.0);
        let gross = cfg().with_sizing(BuySizing::GrossOfCosts);
        assert_eq!(
            resolve_intent(&acct, 0, 10.0, 1.0, &gross),
            Decision::Skip(SkipReason::InsufficientCash)
        );
        // fits once the costs are covered by the uncommitted part
        assert!(matches!(resolve_intent(&acct, 0, 10.0, 0.99, &gross), Decision::Buy { .. }));
    }

    #[test]
    fn order_one_ulp_over_cash_is_dropped_whole() {
        let gross = cfg().with_sizing(BuySizing::GrossOfCosts);
        let cash  = 100_000.0;
        let price = 10.0;
        let mut acct = Account::new(cash);

        let cost_at = |signal: f64| gross.size_buy(cash * signal, price).1;

        // find the first signal whose all-in cost exceeds cash by one ulp step
        let mut prev = 1.0 / 1.0006;
        for _ in 0..10_000 {
            if cost_at(prev) <= cash {
                break;
            }
            prev = f64::from_bits(prev.to_bits() - 1);
        }
        let mut signal = prev;
        for _ in 0..10_000 {
            if cost_at(signal) > cash {
                break;
            }
            prev = signal;
            signal = f64::from_bits(signal.to_bits() + 1);
        }
        assert!(cost_at(prev) <= cash);
        assert!(cost_at(signal) > cash);

        assert_eq!(
            resolve_intent(&acct, 0, price, signal, &gross),
            Decision::Skip(SkipReason::InsufficientCash)
        );
        let report = settle_day(&mut acct, array![price].view(), array![signal].view(), &gross);
        assert_eq!(report.buys, 0);
        assert_eq!(acct, Account::new(cash));

        // the largest order that still fits goes through without overdraw
        let Decision::Buy { cost, .. } = resolve_intent(&acct, 0, price, prev, &gross) else {
            panic!("expected a buy");
        };
        assert!(cost <= acct.cash);
        settle_day(&mut acct, array![price].view(), array![prev].view(), &gross);
        assert!(acct.cash >= 0.0);
    }

    #[test]
    fn full_cash_buy_leaves_nothing_for_the_next_instrument() {
        for cash in [100_000.0, 12_345.67, 1.0, 999_999.99, 3.3, 77_777.7] {
            let mut acct = Account::new(cash);
            let report = settle_day(&mut acct, array![10.0, 7.0].view(), array![1.0, 1.0].view(), &cfg());

            assert_eq!(acct.cash, 0.0);
            assert_eq!(report.buys, 1);
            assert!(acct.position(1).is_none(), "cash {}", cash);
        }
    }

    #[test]
    fn settle_day_debits_the_resolved_cost() {
        let mut acct = Account::new(1_000.0);
        let Decision::Buy { cost, .. } = resolve_intent(&acct, 0, 3.0, 0.37, &cfg()) else {
            panic!("expected a buy");
        };
        settle_day(&mut acct, array![3.0].view(), array![0.37].view(), &cfg());
        assert_eq!(acct.cash, 1_000.0 - cost);
    }

    #[test]
    fn buy_with_no_cash_is_non_positive() {
        let acct = Account::new(0.0);
        assert_eq!(
            resolve_intent(&acct, 0, 10.0, 1.0, &cfg()),
            Decision::Skip(SkipReason::NonPositiveQuantity)
        );
    }

    #[test]
    fn sell_is_capped_by_sellable_shares() {
        let mut acct = Account::new(10_000.0);
        acct.apply_buy(0, 100.0, 10.0, &CostModel::zero());
        acct.rollover();
        acct.apply_buy(0, 100.0, 10.0, &CostModel::zero());

        let Decision::Sell { shares, .. } = resolve_intent(&acct, 0, 10.0, -1.0, &cfg()) else {
            panic!("expected a sell");
        };
        assert_relative_eq!(shares, 100.0);

        let Decision::Sell { shares, .. } = resolve_intent(&acct, 0, 10.0, -0.25, &cfg()) else {
            panic!("expected a sell");
        };
        assert_relative_eq!(shares, 50.0);
    }

    #[test]
    fn sell_on_locked_or_missing_position_skips() {
        let mut acct = Account::new(10_000.0);
        assert_eq!(resolve_intent(&acct, 0, 10.0, -1.0, &cfg()), Decision::Skip(SkipReason::NoPosition));

        acct.apply_buy(0, 100.0, 10.0, &CostModel::zero());
        assert_eq!(
            resolve_intent(&acct, 0, 10.0, -1.0, &cfg()),
            Decision::Skip(SkipReason::NonPositiveQuantity)
        );
    }

    #[test]
    fn settle_day_counts_outcomes() {
        let mut acct = Account::new(1_000.0);
        let prices  = array![10.0, f64::NAN, 5.0, 2.0];
        let signals = array![0.5, 1.0, 0.0, -1.0];
        let report = settle_day(&mut acct, prices.view(), signals.view(), &cfg());

        assert_eq!(report.buys, 1);
        assert_eq!(report.sells, 0);
        assert_eq!(report.skipped, 2);
        assert_relative_eq!(report.equity, acct.equity(prices.view()));
    }
}
