//! Dual moving-average crossover signal.
//!
//! Fires EnterBullish when the fast average moves above the slow one and
//! EnterBearish when it moves below. A bar where the averages tie is Flat.

use super::state::{detect_crossovers, CrossoverEvent};
use super::SignalGenerator;
use crate::domain::PriceSeries;
use crate::error::BacktestError;
use crate::indicators::{indicator_points, IndicatorPoint, MaKind};

/// Moving average crossover signal generator.
///
/// `fast_window < slow_window` is the usual setup but is not enforced: any
/// pair of positive windows gives well-defined output.
#[derive(Debug, Clone, PartialEq)]
pub struct MaCrossover {
    fast_window: usize,
    slow_window: usize,
    ma_kind: MaKind,
}

impl MaCrossover {
    pub fn new(
        fast_window: usize,
        slow_window: usize,
        ma_kind: MaKind,
    ) -> Result<Self, BacktestError> {
        if fast_window == 0 {
            return Err(BacktestError::InvalidWindow {
                name: "fast_window",
                window: fast_window,
            });
        }
        if slow_window == 0 {
            return Err(BacktestError::InvalidWindow {
                name: "slow_window",
                window: slow_window,
            });
        }
        Ok(Self {
            fast_window,
            slow_window,
            ma_kind,
        })
    }

    pub fn fast_window(&self) -> usize {
        self.fast_window
    }

    pub fn slow_window(&self) -> usize {
        self.slow_window
    }

    pub fn ma_kind(&self) -> MaKind {
        self.ma_kind
    }

    /// Fast and slow averages for every bar.
    pub fn indicator_points(
        &self,
        series: &PriceSeries,
    ) -> Result<Vec<IndicatorPoint>, BacktestError> {
        let fast = self.ma_kind.build(self.fast_window)?;
        let slow = self.ma_kind.build(self.slow_window)?;
        Ok(indicator_points(series, fast.as_ref(), slow.as_ref()))
    }
}

impl SignalGenerator for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn warmup_bars(&self) -> usize {
        self.fast_window.max(self.slow_window) - 1
    }

    fn generate(&self, series: &PriceSeries) -> Result<Vec<CrossoverEvent>, BacktestError> {
        let points = self.indicator_points(series)?;
        Ok(detect_crossovers(&points))
    }
}
