//! CrossLab Runner: configuration, data loading, reports, sweeps, export.
//!
//! This crate builds on `crosslab-core` to provide:
//! - TOML backtest configuration with a content hash
//! - CSV loading and seeded synthetic series
//! - Single-backtest runner producing a self-describing `RunReport`
//! - Report summary statistics
//! - Parallel fast/slow parameter sweeps
//! - JSON / CSV artifact export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod summary;
pub mod sweep;

pub use config::{BacktestConfig, ConfigError};
pub use data_loader::{load_csv, load_csv_reader, save_csv, synthetic_series, write_csv, LoadError};
pub use export::{
    export_equity_csv, export_json, export_sweep_csv, export_trades_csv, import_json,
    load_artifacts, save_artifacts,
};
pub use runner::{
    run_backtest_with_config, run_single_backtest, RunError, RunReport, SCHEMA_VERSION,
};
pub use summary::{ReportSummary, DEFAULT_RECENT_TRADES};
pub use sweep::{run_sweep, ParamGrid, ParamSweep, SweepEntry, SweepResults};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn run_report_is_send_sync() {
        assert_send::<RunReport>();
        assert_sync::<RunReport>();
    }

    #[test]
    fn report_summary_is_send_sync() {
        assert_send::<ReportSummary>();
        assert_sync::<ReportSummary>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
        assert_send::<ParamGrid>();
        assert_sync::<ParamGrid>();
    }

    #[test]
    fn sweep_types_are_send_sync() {
        assert_send::<ParamSweep>();
        assert_sync::<ParamSweep>();
        assert_send::<SweepResults>();
        assert_sync::<SweepResults>();
    }

    #[test]
    fn error_types_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<LoadError>();
        assert_sync::<LoadError>();
    }
}
