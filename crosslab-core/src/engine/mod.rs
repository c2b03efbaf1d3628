//! BacktestEngine: the FLAT / LONG state machine over a price series.
//!
//! The engine consumes a validated [`PriceSeries`](crate::domain::PriceSeries)
//! and one crossover event per bar, then folds them in order:
//!
//! 1. FLAT + EnterBullish → LONG at the bar's close
//! 2. LONG + EnterBearish → FLAT, appending a trade
//! 3. Every bar: record equity at the close
//!
//! At the end a still-open position is marked to market, never realized.

pub mod config;
pub mod loop_runner;
pub mod result;
pub mod state;

pub use config::EngineConfig;
pub use loop_runner::{replay, run_backtest, run_with_signal};
pub use result::{BacktestResult, EquityPoint};
pub use state::EngineState;
