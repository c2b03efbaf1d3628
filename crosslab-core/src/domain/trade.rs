//! Trade: a completed round trip, immutable once recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::position::Position;

/// A closed long trade: entry → exit.
///
/// Trades are appended to the ledger in chronological order and never
/// mutated or removed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Entry ──
    pub entry_index: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_index: usize,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,

    // ── Size / PnL ──
    pub quantity: f64,
    /// `(exit_price - entry_price) * quantity`, in the unit of the initial balance.
    pub pnl: f64,
}

impl Trade {
    /// Close `position` at `exit_price`.
    pub fn close(
        position: &Position,
        exit_index: usize,
        exit_time: DateTime<Utc>,
        exit_price: f64,
    ) -> Self {
        Self {
            entry_index: position.entry_index,
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            exit_index,
            exit_time,
            exit_price,
            quantity: position.quantity,
            pnl: position.unrealized_pnl(exit_price),
        }
    }

    pub fn bars_held(&self) -> usize {
        self.exit_index - self.entry_index
    }

    /// Return on the trade as a percentage of the entry price.
    pub fn return_pct(&self) -> f64 {
        (self.exit_price - self.entry_price) / self.entry_price * 100.0
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn open_position() -> Position {
        Position {
            entry_index: 4,
            entry_time: DateTime::from_timestamp(1_704_067_200, 0).unwrap(),
            entry_price: 100.0,
            quantity: 100.0,
        }
    }

    #[test]
    fn close_computes_pnl_from_quantity() {
        let pos = open_position();
        let trade = Trade::close(&pos, 8, pos.entry_time + Duration::hours(4), 110.0);
        assert_eq!(trade.pnl, 1_000.0);
        assert_eq!(trade.bars_held(), 4);
        assert!((trade.return_pct() - 10.0).abs() < 1e-12);
        assert!(trade.is_winner());
    }

    #[test]
    fn losing_trade() {
        let pos = open_position();
        let trade = Trade::close(&pos, 5, pos.entry_time + Duration::hours(1), 95.0);
        assert_eq!(trade.pnl, -500.0);
        assert!(!trade.is_winner());
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let pos = open_position();
        let trade = Trade::close(&pos, 6, pos.entry_time + Duration::hours(2), 104.0);
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deser);
    }
}
