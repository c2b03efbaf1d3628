//! SignalGenerator: turns a price series into per-bar crossover events.
//!
//! A generator sees only the price series. It has no access to the engine's
//! position or balance, so signals can never depend on trading state.

pub mod ma_crossover;
pub mod state;

pub use ma_crossover::MaCrossover;
pub use state::{detect_crossovers, CrossoverEvent, SignalState};

use crate::domain::PriceSeries;
use crate::error::BacktestError;

/// Trait for strategies that drive the backtest engine.
///
/// `generate` must return exactly one event per bar, and the event at bar t
/// may depend only on bars `0..=t`.
pub trait SignalGenerator: Send + Sync {
    /// Stable identifier (e.g., "ma_crossover").
    fn name(&self) -> &str;

    /// Bars before the first one that can carry a non-`NoChange` event.
    fn warmup_bars(&self) -> usize;

    fn generate(&self, series: &PriceSeries) -> Result<Vec<CrossoverEvent>, BacktestError>;
}
