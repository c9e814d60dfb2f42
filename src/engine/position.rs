// src/engine/position.rs

/// Per-instrument holding. `0 <= sellable_shares <= total_shares` always.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub total_shares:    f64, // shares owned
    pub sellable_shares: f64, // shares settled and eligible for sale today
    pub avg_cost:        f64, // volume-weighted purchase price, 0 when flat
}

impl Position {
    pub fn is_flat(&self) -> bool {
        self.total_shares <= 0.0
    }

    /// Shares bought today, still waiting for the next rollover.
    pub fn locked_shares(&self) -> f64 {
        self.total_shares - self.sellable_shares
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.total_shares * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.avg_cost) * self.total_shares
    }

    pub(crate) fn add(&mut self, shares: f64, price: f64) {
        let new_total = self.total_shares + shares;
        let new_cost  = self.avg_cost * self.total_shares + shares * price;
        self.total_shares = new_total;
        self.avg_cost = if new_total > 0.0 { new_cost / new_total } else { 0.0 };
    }

    pub(crate) fn remove(&mut self, shares: f64) {
        self.total_shares    -= shares;
        self.sellable_shares -= shares;
        if self.total_shares <= 0.0 {
            *self = Position::default();
        } else if self.sellable_shares < 0.0 {
            self.sellable_shares = 0.0;
        }
    }

    pub(crate) fn unlock(&mut self) {
        self.sellable_shares = self.total_shares;
    }
}
