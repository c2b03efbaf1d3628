//! Report summary: pure functions that turn a backtest result into statistics.
//!
//! Every statistic is a pure function: trade list and/or equity curve in,
//! scalar out. No I/O and no dependency on how the result was produced.

use std::fmt;

use crosslab_core::domain::Trade;
use crosslab_core::engine::{BacktestResult, EquityPoint};
use serde::{Deserialize, Serialize};

/// Trades shown in a summary when the caller does not say otherwise.
pub const DEFAULT_RECENT_TRADES: usize = 10;

/// Human-facing digest of a [`BacktestResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub initial_balance: f64,
    pub final_equity: f64,
    pub total_return_pct: f64,

    pub trade_count: usize,
    pub winners: usize,
    pub losers: usize,
    /// Winners as a percentage of closed trades (0.0 with no trades).
    pub win_rate_pct: f64,
    pub gross_profit: f64,
    /// Sum of losing trades' PnL as a positive magnitude.
    pub gross_loss: f64,
    pub net_pnl: f64,
    pub profit_factor: f64,
    pub avg_pnl: f64,
    pub best_trade: Option<f64>,
    pub worst_trade: Option<f64>,
    /// Deepest peak-to-trough equity decline, as a non-positive percentage.
    pub max_drawdown_pct: f64,

    pub open_position: bool,
    pub unrealized_pnl: f64,
    /// The last N closed trades, oldest first.
    pub recent_trades: Vec<Trade>,
}

impl ReportSummary {
    /// Summarize `result`, keeping the `recent` most recent trades.
    pub fn from_result(result: &BacktestResult, recent: usize) -> Self {
        let trades = &result.trades;
        let skip = trades.len().saturating_sub(recent);

        Self {
            initial_balance: result.initial_balance,
            final_equity: result.final_equity,
            total_return_pct: result.total_return_pct,
            trade_count: trades.len(),
            winners: trades.iter().filter(|t| t.is_winner()).count(),
            losers: trades.iter().filter(|t| t.pnl < 0.0).count(),
            win_rate_pct: win_rate(trades) * 100.0,
            gross_profit: gross_profit(trades),
            gross_loss: gross_loss(trades),
            net_pnl: result.realized_pnl(),
            profit_factor: profit_factor(trades),
            avg_pnl: avg_pnl(trades),
            best_trade: trades.iter().map(|t| t.pnl).reduce(f64::max),
            worst_trade: trades.iter().map(|t| t.pnl).reduce(f64::min),
            max_drawdown_pct: max_drawdown(&result.equity_curve) * 100.0,
            open_position: result.is_long_at_end(),
            unrealized_pnl: result.unrealized_pnl(),
            recent_trades: trades[skip..].to_vec(),
        }
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== BACKTEST RESULTS ===")?;
        writeln!(f, "Initial Balance: {:>14.2}", self.initial_balance)?;
        writeln!(f, "Final Equity:    {:>14.2}", self.final_equity)?;
        writeln!(f, "Total Return:    {:>13.2}%", self.total_return_pct)?;
        writeln!(f, "Max Drawdown:    {:>13.2}%", self.max_drawdown_pct)?;
        writeln!(f)?;
        writeln!(
            f,
            "Trades: {}  (won {}, lost {}, win rate {:.1}%)",
            self.trade_count, self.winners, self.losers, self.win_rate_pct
        )?;
        writeln!(f, "Net PnL:         {:>14.2}", self.net_pnl)?;
        writeln!(f, "Gross Profit:    {:>14.2}", self.gross_profit)?;
        writeln!(f, "Gross Loss:      {:>14.2}", self.gross_loss)?;
        writeln!(f, "Profit Factor:   {:>14.2}", self.profit_factor)?;
        writeln!(f, "Avg Trade:       {:>14.2}", self.avg_pnl)?;
        if let (Some(best), Some(worst)) = (self.best_trade, self.worst_trade) {
            writeln!(f, "Best / Worst:    {best:.2} / {worst:.2}")?;
        }
        if self.open_position {
            writeln!(f, "Open position, unrealized PnL {:.2}", self.unrealized_pnl)?;
        }

        if !self.recent_trades.is_empty() {
            writeln!(f)?;
            writeln!(f, "=== LAST {} TRADES ===", self.recent_trades.len())?;
            for t in &self.recent_trades {
                writeln!(
                    f,
                    "  BUY @ {:.2} | {}  ->  SELL @ {:.2} | {}  PnL {:.2}",
                    t.entry_price,
                    t.entry_time.format("%Y-%m-%d %H:%M"),
                    t.exit_price,
                    t.exit_time.format("%Y-%m-%d %H:%M"),
                    t.pnl
                )?;
            }
        }
        Ok(())
    }
}

// ─── Individual statistics ──────────────────────────────────────────

/// Fraction of trades that were winners.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

pub fn gross_profit(trades: &[Trade]) -> f64 {
    trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum()
}

pub fn gross_loss(trades: &[Trade]) -> f64 {
    trades.iter().filter(|t| t.pnl < 0.0).map(|t| t.pnl.abs()).sum()
}

/// Profit factor: gross profits / gross losses.
///
/// Capped at 100.0 for edge cases (all winners, zero losses).
pub fn profit_factor(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let profit = gross_profit(trades);
    let loss = gross_loss(trades);

    if loss < 1e-10 {
        return if profit > 0.0 { 100.0 } else { 0.0 };
    }
    (profit / loss).min(100.0)
}

pub fn avg_pnl(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.pnl).sum::<f64>() / trades.len() as f64
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// Returns 0.0 if equity is constant or monotonically increasing.
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };
    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        if peak > 0.0 {
            let dd = (point.equity - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}
