//! CrossLab Core: price series, moving averages, crossover signals, and the
//! single-position backtest engine.
//!
//! This crate does no I/O:
//! - Domain types (bars, price series, positions, trades)
//! - Indicators (SMA, EMA) with explicit warm-up
//! - Crossover detection over fast/slow averages
//! - The FLAT / LONG engine that folds events into a [`engine::BacktestResult`]

pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod signal;

pub use error::{BacktestError, ErrorKind};
