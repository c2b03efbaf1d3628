//! Simple Moving Average (SMA).
//!
//! Arithmetic mean of the trailing `window` closes.
//! Lookback: window - 1 (first defined value at index window-1).

use super::Indicator;
use crate::domain::PriceSeries;
use crate::error::BacktestError;

#[derive(Debug, Clone)]
pub struct Sma {
    window: usize,
    name: String,
}

impl Sma {
    pub fn new(window: usize) -> Result<Self, BacktestError> {
        if window == 0 {
            return Err(BacktestError::InvalidWindow {
                name: "window",
                window,
            });
        }
        Ok(Self {
            window,
            name: format!("sma_{window}"),
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn compute(&self, series: &PriceSeries) -> Vec<Option<f64>> {
        let bars = series.bars();
        let w = self.window;

        // Each window is summed afresh: no running-sum drift on long series,
        // and equal windows always produce bit-identical means.
        (0..bars.len())
            .map(|i| {
                if i + 1 < w {
                    return None;
                }
                let sum: f64 = bars[i + 1 - w..=i].iter().map(|b| b.close).sum();
                Some(sum / w as f64)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let series = make_series(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        let result = Sma::new(5).unwrap().compute(&series);

        assert_eq!(result.len(), 7);
        for (i, value) in result.iter().take(4).enumerate() {
            assert!(value.is_none(), "expected warm-up at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4].unwrap(), 12.0, DEFAULT_EPSILON);
        // SMA[5] = mean(11,12,13,14,15) = 13.0
        assert_approx(result[5].unwrap(), 13.0, DEFAULT_EPSILON);
        // SMA[6] = mean(12,13,14,15,16) = 14.0
        assert_approx(result[6].unwrap(), 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_close() {
        let series = make_series(&[100.0, 200.0, 300.0]);
        let result = Sma::new(1).unwrap().compute(&series);
        assert_eq!(result, vec![Some(100.0), Some(200.0), Some(300.0)]);
    }

    #[test]
    fn window_equal_to_length_defines_last_bar_only() {
        let series = make_series(&[2.0, 4.0, 6.0]);
        let result = Sma::new(3).unwrap().compute(&series);
        assert_eq!(result, vec![None, None, Some(4.0)]);
    }

    #[test]
    fn sma_lookback() {
        assert_eq!(Sma::new(20).unwrap().lookback(), 19);
        assert_eq!(Sma::new(1).unwrap().lookback(), 0);
    }

    #[test]
    fn sma_too_few_bars() {
        let series = make_series(&[10.0, 11.0]);
        let result = Sma::new(5).unwrap().compute(&series);
        assert!(result.iter().all(Option::is_none));
    }

    #[test]
    fn rejects_zero_window() {
        assert!(Sma::new(0).is_err());
    }
}
