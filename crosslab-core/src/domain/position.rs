use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An open long position. The engine holds at most one at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub entry_index: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    /// Units held: `initial_balance / entry_price`, fixed at open.
    pub quantity: f64,
}

impl Position {
    pub fn market_value(&self, current_price: f64) -> f64 {
        self.quantity * current_price
    }

    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        self.quantity * (current_price - self.entry_price)
    }
}
