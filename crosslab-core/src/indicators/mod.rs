//! IndicatorEngine: rolling moving averages over the close price.
//!
//! Indicators are pure functions: price series in, aligned `Option<f64>`
//! series out. A value at bar t depends only on closes at bars <= t, and the
//! first `lookback()` values are `None` (warm-up), never zero.

pub mod ema;
pub mod sma;

pub use ema::Ema;
pub use sma::Sma;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;
use crate::error::BacktestError;

/// Trait for moving-average style indicators.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_50").
    fn name(&self) -> &str;

    /// Number of leading bars that stay undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the whole series.
    ///
    /// The output has the same length as `series`.
    fn compute(&self, series: &PriceSeries) -> Vec<Option<f64>>;
}

/// Which moving average a crossover strategy uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaKind {
    #[default]
    Sma,
    Ema,
}

impl MaKind {
    pub fn build(self, window: usize) -> Result<Box<dyn Indicator>, BacktestError> {
        Ok(match self {
            MaKind::Sma => Box::new(Sma::new(window)?),
            MaKind::Ema => Box::new(Ema::new(window)?),
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MaKind::Sma => "sma",
            MaKind::Ema => "ema",
        }
    }
}

/// Fast and slow averages for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub timestamp: DateTime<Utc>,
    pub fast_avg: Option<f64>,
    pub slow_avg: Option<f64>,
}

/// Arithmetic mean of the trailing `window` closes at every bar.
///
/// `window == 0` is a configuration error; a window longer than the series is
/// not, it simply yields an all-`None` output.
pub fn moving_average(
    series: &PriceSeries,
    window: usize,
) -> Result<Vec<Option<f64>>, BacktestError> {
    Ok(Sma::new(window)?.compute(series))
}

/// Run both indicators over `series` and zip them by bar.
pub fn indicator_points(
    series: &PriceSeries,
    fast: &dyn Indicator,
    slow: &dyn Indicator,
) -> Vec<IndicatorPoint> {
    let fast_values = fast.compute(series);
    let slow_values = slow.compute(series);
    series
        .timestamps()
        .zip(fast_values)
        .zip(slow_values)
        .map(|((timestamp, fast_avg), slow_avg)| IndicatorPoint {
            timestamp,
            fast_avg,
            slow_avg,
        })
        .collect()
}

/// Create a series from close prices for testing: hourly bars from 2024-01-01.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> PriceSeries {
    use crate::domain::Bar;
    use chrono::TimeZone;

    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::hours(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: (open.min(close) - 1.0).max(0.0),
                close,
                volume: 1000.0,
            }
        })
        .collect();
    PriceSeries::new(bars).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
