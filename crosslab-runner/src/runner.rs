//! Backtest runner: wires together config, data, engine, and summary.
//!
//! Two entry points:
//! - `run_single_backtest()`: loads a CSV file, then runs. Used by the CLI.
//! - `run_backtest_with_config()`: takes a pre-loaded series. Used by tests
//!   and anything that already holds the data.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, info_span};

use crosslab_core::domain::PriceSeries;
use crosslab_core::engine::{run_backtest, BacktestResult};
use crosslab_core::BacktestError;

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_csv, LoadError};
use crate::summary::ReportSummary;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete, self-describing record of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub config: BacktestConfig,
    pub config_hash: String,
    pub dataset_hash: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub result: BacktestResult,
    pub summary: ReportSummary,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Load `data_path` and run `config` against it.
pub fn run_single_backtest(
    config: &BacktestConfig,
    data_path: &Path,
) -> Result<RunReport, RunError> {
    let series = load_csv(data_path)?;
    run_backtest_with_config(config, &series)
}

/// Run a backtest with pre-loaded data: no I/O.
pub fn run_backtest_with_config(
    config: &BacktestConfig,
    series: &PriceSeries,
) -> Result<RunReport, RunError> {
    config.validate()?;

    let config_hash = config.config_hash();
    let _span = info_span!(
        "run",
        symbol = config.symbol(),
        config = &config_hash[..12],
        fast = config.strategy.fast_window,
        slow = config.strategy.slow_window,
        ma = config.strategy.ma_kind.as_str(),
    )
    .entered();

    let result = run_backtest(series, &config.to_engine_config())?;
    let summary = ReportSummary::from_result(&result, config.report.recent_trades);

    info!(
        trades = summary.trade_count,
        final_equity = result.final_equity,
        return_pct = result.total_return_pct,
        open = result.is_long_at_end(),
        "backtest complete"
    );

    Ok(RunReport {
        schema_version: SCHEMA_VERSION,
        symbol: config.symbol().to_string(),
        config: config.clone(),
        config_hash,
        dataset_hash: series.dataset_hash(),
        start: series.first().timestamp,
        end: series.last().timestamp,
        result,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use crosslab_core::domain::Bar;

    fn series_from(closes: &[f64]) -> PriceSeries {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: base + Duration::hours(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn report_carries_provenance() {
        let series = series_from(&[10.0, 10.0, 10.0, 16.0, 10.0, 13.0, 20.0]);
        let config = BacktestConfig::new("TEST", 1, 3, 1_000.0);
        let report = run_backtest_with_config(&config, &series).unwrap();

        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.symbol, "TEST");
        assert_eq!(report.config_hash, config.config_hash());
        assert_eq!(report.dataset_hash, series.dataset_hash());
        assert_eq!(report.start, series.first().timestamp);
        assert_eq!(report.end, series.last().timestamp);
        assert_eq!(report.summary.trade_count, report.result.trades.len());
        assert!(report.summary.open_position);
    }

    #[test]
    fn invalid_config_is_rejected_before_running() {
        let series = series_from(&[1.0, 2.0, 3.0]);
        let config = BacktestConfig::new("TEST", 0, 3, 1_000.0);
        assert!(matches!(
            run_backtest_with_config(&config, &series),
            Err(RunError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn recent_trades_follow_report_section() {
        let series = series_from(&[10.0, 10.0, 12.0, 9.0, 12.0, 9.0, 12.0, 9.0]);
        let mut config = BacktestConfig::new("TEST", 1, 2, 1_000.0);
        config.report.recent_trades = 2;
        let report = run_backtest_with_config(&config, &series).unwrap();

        assert_eq!(report.result.trades.len(), 3);
        assert_eq!(report.summary.recent_trades.len(), 2);
        assert_eq!(report.summary.recent_trades[1], report.result.trades[2]);
    }
}
