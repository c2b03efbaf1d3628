//! Bar-by-bar fold: the heart of the backtesting engine.
//!
//! One forward pass: for each bar, apply that bar's crossover event to the
//! engine state, then record equity at the close. Nothing looks ahead and
//! nothing is reordered.

use tracing::debug_span;

use super::config::EngineConfig;
use super::result::BacktestResult;
use super::state::EngineState;
use crate::domain::PriceSeries;
use crate::error::BacktestError;
use crate::signal::{CrossoverEvent, SignalGenerator};

/// Run the dual moving-average crossover backtest described by `config`.
///
/// The configuration is validated before any indicator is computed.
pub fn run_backtest(
    series: &PriceSeries,
    config: &EngineConfig,
) -> Result<BacktestResult, BacktestError> {
    config.validate()?;
    let signal = config.signal()?;
    run_with_signal(series, &signal, config.initial_balance)
}

/// Run any [`SignalGenerator`] through the engine.
pub fn run_with_signal(
    series: &PriceSeries,
    signal: &dyn SignalGenerator,
    initial_balance: f64,
) -> Result<BacktestResult, BacktestError> {
    let _span = debug_span!("backtest", signal = signal.name(), bars = series.len()).entered();

    let state = EngineState::new(initial_balance)?;
    let events = signal.generate(series)?;
    fold(state, series, &events, signal.warmup_bars())
}

/// Replay a precomputed event sequence against `series`.
///
/// `events` must hold exactly one event per bar.
pub fn replay(
    series: &PriceSeries,
    events: &[CrossoverEvent],
    initial_balance: f64,
) -> Result<BacktestResult, BacktestError> {
    let state = EngineState::new(initial_balance)?;
    fold(state, series, events, 0)
}

fn fold(
    mut state: EngineState,
    series: &PriceSeries,
    events: &[CrossoverEvent],
    warmup_bars: usize,
) -> Result<BacktestResult, BacktestError> {
    if events.len() != series.len() {
        return Err(BacktestError::LengthMismatch {
            what: "crossover events",
            expected: series.len(),
            actual: events.len(),
        });
    }

    for (index, (bar, &event)) in series.bars().iter().zip(events).enumerate() {
        state.step(index, bar, event)?;
    }

    Ok(state.finish(series.last().close, warmup_bars))
}
