//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::BacktestError;
use crate::indicators::MaKind;
use crate::signal::MaCrossover;

/// Parameters for one backtest run.
///
/// Passed explicitly into each call; there is no process-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub fast_window: usize,
    pub slow_window: usize,
    pub initial_balance: f64,
    #[serde(default)]
    pub ma_kind: MaKind,
}

impl EngineConfig {
    pub fn new(fast_window: usize, slow_window: usize, initial_balance: f64) -> Self {
        Self {
            fast_window,
            slow_window,
            initial_balance,
            ma_kind: MaKind::Sma,
        }
    }

    pub fn with_ma_kind(mut self, ma_kind: MaKind) -> Self {
        self.ma_kind = ma_kind;
        self
    }

    /// Reject non-positive windows and a non-positive or non-finite balance.
    ///
    /// `fast_window >= slow_window` is accepted.
    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.fast_window == 0 {
            return Err(BacktestError::InvalidWindow {
                name: "fast_window",
                window: self.fast_window,
            });
        }
        if self.slow_window == 0 {
            return Err(BacktestError::InvalidWindow {
                name: "slow_window",
                window: self.slow_window,
            });
        }
        validate_initial_balance(self.initial_balance)
    }

    /// The crossover strategy these parameters describe.
    pub fn signal(&self) -> Result<MaCrossover, BacktestError> {
        MaCrossover::new(self.fast_window, self.slow_window, self.ma_kind)
    }
}

pub(crate) fn validate_initial_balance(initial_balance: f64) -> Result<(), BacktestError> {
    if initial_balance.is_finite() && initial_balance > 0.0 {
        Ok(())
    } else {
        Err(BacktestError::InvalidInitialBalance(initial_balance))
    }
}
