//! Parameter sweep over fast/slow window pairs.
//!
//! Each combination runs on its own engine instance against the same shared,
//! immutable series, so combinations are evaluated in parallel with rayon.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crosslab_core::domain::PriceSeries;
use crosslab_core::engine::{run_backtest, EngineConfig};
use crosslab_core::indicators::MaKind;
use crosslab_core::BacktestError;

use crate::summary::max_drawdown;

/// Parameter grid specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub fast_windows: Vec<usize>,
    pub slow_windows: Vec<usize>,
}

impl ParamGrid {
    pub fn new(fast_windows: Vec<usize>, slow_windows: Vec<usize>) -> Self {
        Self {
            fast_windows,
            slow_windows,
        }
    }

    /// A small grid for MA crossover exploration.
    ///
    /// Fast windows: 10, 20, 30, 50
    /// Slow windows: 50, 100, 200
    pub fn ma_crossover_default() -> Self {
        Self::new(vec![10, 20, 30, 50], vec![50, 100, 200])
    }

    /// All `(fast, slow)` pairs with `fast < slow`, in grid order.
    pub fn combinations(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for &fast in &self.fast_windows {
            for &slow in &self.slow_windows {
                // Skip invalid combinations (fast >= slow)
                if fast >= slow {
                    continue;
                }
                pairs.push((fast, slow));
            }
        }
        pairs
    }

    /// Number of combinations that will actually run.
    pub fn size(&self) -> usize {
        self.combinations().len()
    }
}

/// Outcome of one grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub fast_window: usize,
    pub slow_window: usize,
    pub total_return_pct: f64,
    pub final_equity: f64,
    pub trade_count: usize,
    pub win_rate_pct: f64,
    pub max_drawdown_pct: f64,
    pub open_at_end: bool,
}

/// Parameter sweep executor.
#[derive(Debug, Clone)]
pub struct ParamSweep {
    initial_balance: f64,
    ma_kind: MaKind,
    parallel: bool,
}

impl ParamSweep {
    pub fn new(initial_balance: f64, ma_kind: MaKind) -> Self {
        Self {
            initial_balance,
            ma_kind,
            parallel: true,
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every combination in `grid` and rank the results.
    ///
    /// The first failing combination aborts the sweep.
    pub fn sweep(
        &self,
        series: &PriceSeries,
        grid: &ParamGrid,
    ) -> Result<SweepResults, BacktestError> {
        let combos = grid.combinations();
        info!(
            combinations = combos.len(),
            ma = self.ma_kind.as_str(),
            parallel = self.parallel,
            "starting sweep"
        );

        let entries: Vec<SweepEntry> = if self.parallel {
            combos
                .par_iter()
                .map(|&(fast, slow)| self.run_one(series, fast, slow))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            combos
                .iter()
                .map(|&(fast, slow)| self.run_one(series, fast, slow))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(SweepResults::new(entries))
    }

    fn run_one(
        &self,
        series: &PriceSeries,
        fast: usize,
        slow: usize,
    ) -> Result<SweepEntry, BacktestError> {
        let config = EngineConfig::new(fast, slow, self.initial_balance).with_ma_kind(self.ma_kind);
        let result = run_backtest(series, &config)?;

        let winners = result.trades.iter().filter(|t| t.is_winner()).count();
        let win_rate_pct = if result.trades.is_empty() {
            0.0
        } else {
            winners as f64 / result.trades.len() as f64 * 100.0
        };
        debug!(fast, slow, return_pct = result.total_return_pct, "combination done");

        Ok(SweepEntry {
            fast_window: fast,
            slow_window: slow,
            total_return_pct: result.total_return_pct,
            final_equity: result.final_equity,
            trade_count: result.trades.len(),
            win_rate_pct,
            max_drawdown_pct: max_drawdown(&result.equity_curve) * 100.0,
            open_at_end: result.is_long_at_end(),
        })
    }
}

/// Convenience wrapper: parallel sweep with the given balance and average kind.
pub fn run_sweep(
    series: &PriceSeries,
    grid: &ParamGrid,
    initial_balance: f64,
    ma_kind: MaKind,
) -> Result<SweepResults, BacktestError> {
    ParamSweep::new(initial_balance, ma_kind).sweep(series, grid)
}

/// Ranked results from a parameter sweep.
///
/// Sorted by `total_return_pct` descending, ties broken by `(fast, slow)`
/// ascending, so the order never depends on thread scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResults {
    entries: Vec<SweepEntry>,
}

impl SweepResults {
    fn new(mut entries: Vec<SweepEntry>) -> Self {
        entries.sort_by(rank);
        Self { entries }
    }

    pub fn all(&self) -> &[SweepEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_n(&self, n: usize) -> &[SweepEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn best(&self) -> Option<&SweepEntry> {
        self.entries.first()
    }

    pub fn get(&self, fast: usize, slow: usize) -> Option<&SweepEntry> {
        self.entries
            .iter()
            .find(|e| e.fast_window == fast && e.slow_window == slow)
    }
}

fn rank(a: &SweepEntry, b: &SweepEntry) -> Ordering {
    b.total_return_pct
        .total_cmp(&a.total_return_pct)
        .then(a.fast_window.cmp(&b.fast_window))
        .then(a.slow_window.cmp(&b.slow_window))
}
