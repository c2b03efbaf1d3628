//! Look-ahead contamination tests.
//!
//! No indicator value, event, or engine decision at bar t may depend on
//! price data from bar t+1 or later.
//!
//! Method: run on a truncated series (bars 0..100) and the full series
//! (bars 0..200). Everything up to bar 99 must match exactly.

use chrono::{Duration, TimeZone, Utc};
use crosslab_core::domain::{Bar, PriceSeries};
use crosslab_core::engine::{run_backtest, EngineConfig};
use crosslab_core::indicators::{Ema, Indicator, MaKind, Sma};
use crosslab_core::signal::{MaCrossover, SignalGenerator};

/// Generate N bars of synthetic data with realistic variation.
fn make_test_series(n: usize) -> PriceSeries {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0;

    for i in 0..n {
        // Deterministic pseudo-random walk using a simple LCG
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
        let change = ((seed % 200) as f64 - 100.0) * 0.05; // -5.0 to +5.0
        price = (price + change).max(10.0);

        bars.push(Bar {
            timestamp: base + Duration::hours(i as i64),
            open: price - 0.5,
            high: price + 2.0,
            low: price - 2.0,
            close: price,
            volume: 1000.0 + i as f64,
        });
    }

    PriceSeries::new(bars).unwrap()
}

fn truncate(series: &PriceSeries, len: usize) -> PriceSeries {
    PriceSeries::new(series.bars()[..len].to_vec()).unwrap()
}

fn assert_no_lookahead(indicator: &dyn Indicator, full: &PriceSeries, truncated_len: usize) {
    let truncated = truncate(full, truncated_len);
    let full_result = indicator.compute(full);
    let truncated_result = indicator.compute(&truncated);

    assert_eq!(
        truncated_result.len(),
        truncated_len,
        "{}: truncated result length mismatch",
        indicator.name()
    );
    for i in 0..truncated_len {
        assert_eq!(
            full_result[i],
            truncated_result[i],
            "{}: value at bar {i} changed when future bars were appended",
            indicator.name()
        );
    }
}

#[test]
fn sma_no_lookahead() {
    let series = make_test_series(200);
    for window in [1, 5, 20, 50] {
        assert_no_lookahead(&Sma::new(window).unwrap(), &series, 100);
    }
}

#[test]
fn ema_no_lookahead() {
    let series = make_test_series(200);
    for window in [1, 5, 20, 50] {
        assert_no_lookahead(&Ema::new(window).unwrap(), &series, 100);
    }
}

#[test]
fn crossover_events_no_lookahead() {
    let series = make_test_series(200);
    let truncated = truncate(&series, 100);

    for kind in [MaKind::Sma, MaKind::Ema] {
        let signal = MaCrossover::new(5, 20, kind).unwrap();
        let full = signal.generate(&series).unwrap();
        let short = signal.generate(&truncated).unwrap();
        assert_eq!(&full[..100], &short[..]);
    }
}

#[test]
fn engine_decisions_no_lookahead() {
    let series = make_test_series(200);
    let truncated = truncate(&series, 100);
    let config = EngineConfig::new(5, 20, 10_000.0);

    let full = run_backtest(&series, &config).unwrap();
    let short = run_backtest(&truncated, &config).unwrap();

    // Equity up to bar 99 is identical.
    assert_eq!(&full.equity_curve[..100], &short.equity_curve[..]);

    // Every trade closed within the first 100 bars appears in both runs.
    let closed_early: Vec<_> = full.trades.iter().filter(|t| t.exit_index < 100).collect();
    assert_eq!(closed_early.len(), short.trades.len());
    for (a, b) in closed_early.iter().zip(&short.trades) {
        assert_eq!(*a, b);
    }
}
