//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1]
//! Seed: EMA[window-1] = SMA of the first `window` closes.
//! Lookback: window - 1, the same warm-up as the SMA.

use super::Indicator;
use crate::domain::PriceSeries;
use crate::error::BacktestError;

#[derive(Debug, Clone)]
pub struct Ema {
    window: usize,
    name: String,
}

impl Ema {
    pub fn new(window: usize) -> Result<Self, BacktestError> {
        if window == 0 {
            return Err(BacktestError::InvalidWindow {
                name: "window",
                window,
            });
        }
        Ok(Self {
            window,
            name: format!("ema_{window}"),
        })
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn compute(&self, series: &PriceSeries) -> Vec<Option<f64>> {
        let bars = series.bars();
        let n = bars.len();
        let mut result = vec![None; n];

        if n < self.window {
            return result;
        }

        let alpha = 2.0 / (self.window as f64 + 1.0);

        let seed = bars[..self.window].iter().map(|b| b.close).sum::<f64>() / self.window as f64;
        result[self.window - 1] = Some(seed);

        let mut prev = seed;
        for i in self.window..n {
            let ema = alpha * bars[i].close + (1.0 - alpha) * prev;
            result[i] = Some(ema);
            prev = ema;
        }

        result
    }
}
