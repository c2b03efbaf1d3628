//! Backtest output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Position, Trade};

/// Equity at one bar's close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

/// Result of a complete backtest run, built once at the end of the pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub initial_balance: f64,
    /// Cash after the last bar. May be negative: sizing is fixed to the
    /// initial balance, not to the cash on hand.
    pub final_balance: f64,
    /// `final_balance`, plus the open position marked at the last close.
    pub final_equity: f64,
    pub total_return_pct: f64,
    /// Closed trades in chronological order.
    pub trades: Vec<Trade>,
    /// Position still open at the last bar (marked to market, not a trade).
    pub open_position: Option<Position>,
    pub equity_curve: Vec<EquityPoint>,
    pub bar_count: usize,
    pub warmup_bars: usize,
    /// EnterBullish events seen, whether or not they opened a position.
    pub bullish_crossovers: usize,
    /// EnterBearish events seen, whether or not they closed a position.
    pub bearish_crossovers: usize,
}

impl BacktestResult {
    pub fn realized_pnl(&self) -> f64 {
        self.trades.iter().map(|t| t.pnl).sum()
    }

    /// Mark-to-market PnL of the open position, 0.0 when flat.
    pub fn unrealized_pnl(&self) -> f64 {
        // final_equity - final_balance is the position's value at the last close.
        self.open_position.as_ref().map_or(0.0, |pos| {
            (self.final_equity - self.final_balance) - pos.market_value(pos.entry_price)
        })
    }

    pub fn is_long_at_end(&self) -> bool {
        self.open_position.is_some()
    }
}
