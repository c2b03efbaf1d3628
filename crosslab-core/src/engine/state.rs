//! Engine state: the FLAT / LONG state machine and its accounting.

use tracing::debug;

use super::config::validate_initial_balance;
use super::result::{BacktestResult, EquityPoint};
use crate::domain::{Bar, Position, Trade};
use crate::error::BacktestError;
use crate::signal::CrossoverEvent;

/// Mutable state that evolves bar by bar.
///
/// Owned by a single run and never shared. Only [`EngineState::step`]
/// mutates it, and only on EnterBullish / EnterBearish events.
#[derive(Debug, Clone)]
pub struct EngineState {
    initial_balance: f64,
    balance: f64,
    position: Option<Position>,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
    bullish_crossovers: usize,
    bearish_crossovers: usize,
}

impl EngineState {
    pub fn new(initial_balance: f64) -> Result<Self, BacktestError> {
        validate_initial_balance(initial_balance)?;
        Ok(Self {
            initial_balance,
            balance: initial_balance,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            bullish_crossovers: 0,
            bearish_crossovers: 0,
        })
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn is_long(&self) -> bool {
        self.position.is_some()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Equity with the open position (if any) marked at `price`.
    pub fn equity_at(&self, price: f64) -> f64 {
        self.balance + self.position.as_ref().map_or(0.0, |p| p.market_value(price))
    }

    /// Apply one bar's event, then record equity at the bar's close.
    pub fn step(
        &mut self,
        index: usize,
        bar: &Bar,
        event: CrossoverEvent,
    ) -> Result<(), BacktestError> {
        match event {
            CrossoverEvent::EnterBullish => {
                self.bullish_crossovers += 1;
                if self.position.is_none() {
                    self.open(index, bar)?;
                }
            }
            CrossoverEvent::EnterBearish => {
                self.bearish_crossovers += 1;
                if let Some(position) = self.position.take() {
                    self.close(position, index, bar)?;
                }
            }
            CrossoverEvent::NoChange => {}
        }

        let equity = finite("equity", self.equity_at(bar.close), index, bar)?;
        self.equity_curve.push(EquityPoint {
            timestamp: bar.timestamp,
            equity,
        });
        Ok(())
    }

    /// FLAT → LONG at the bar's close.
    fn open(&mut self, index: usize, bar: &Bar) -> Result<(), BacktestError> {
        if bar.close <= 0.0 || bar.close.is_nan() {
            return Err(BacktestError::ZeroEntryPrice {
                index,
                timestamp: bar.timestamp,
            });
        }

        let quantity = finite("position size", self.initial_balance / bar.close, index, bar)?;
        self.balance -= bar.close * quantity;
        debug!(
            index,
            timestamp = %bar.timestamp,
            price = bar.close,
            quantity,
            "position opened"
        );
        self.position = Some(Position {
            entry_index: index,
            entry_time: bar.timestamp,
            entry_price: bar.close,
            quantity,
        });
        Ok(())
    }

    /// LONG → FLAT at the bar's close.
    fn close(
        &mut self,
        position: Position,
        index: usize,
        bar: &Bar,
    ) -> Result<(), BacktestError> {
        let trade = Trade::close(&position, index, bar.timestamp, bar.close);
        finite("trade pnl", trade.pnl, index, bar)?;
        self.balance += finite("exit proceeds", bar.close * position.quantity, index, bar)?;
        debug!(
            index,
            timestamp = %bar.timestamp,
            price = bar.close,
            pnl = trade.pnl,
            "position closed"
        );
        self.trades.push(trade);
        Ok(())
    }

    /// Fold the state into the final result.
    ///
    /// A still-open position is marked at `last_close` but not realized:
    /// it is reported as `open_position`, never as a trade.
    pub fn finish(self, last_close: f64, warmup_bars: usize) -> BacktestResult {
        let final_equity = self.equity_at(last_close);
        let total_return_pct = (final_equity - self.initial_balance) / self.initial_balance * 100.0;

        BacktestResult {
            initial_balance: self.initial_balance,
            final_balance: self.balance,
            final_equity,
            total_return_pct,
            trades: self.trades,
            open_position: self.position,
            bar_count: self.equity_curve.len(),
            equity_curve: self.equity_curve,
            warmup_bars,
            bullish_crossovers: self.bullish_crossovers,
            bearish_crossovers: self.bearish_crossovers,
        }
    }
}

/// Pass `value` through, or abort the run if it overflowed.
fn finite(
    what: &'static str,
    value: f64,
    index: usize,
    bar: &Bar,
) -> Result<f64, BacktestError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(BacktestError::NonFiniteAmount {
            what,
            index,
            timestamp: bar.timestamp,
            price: bar.close,
        })
    }
}
