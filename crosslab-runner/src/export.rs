//! Reporting and export: JSON and CSV artifact generation.
//!
//! Provides two export formats for backtest results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: trade tape, equity curve, and sweep table for external tools
//!
//! All persisted artifacts include a `schema_version` field. Newer versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use crosslab_core::domain::Trade;
use crosslab_core::engine::EquityPoint;

use crate::runner::{RunReport, SCHEMA_VERSION};
use crate::sweep::SweepResults;

/// Hash prefix length used in artifact directory names.
const HASH_PREFIX_LEN: usize = 12;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `RunReport` to pretty JSON.
pub fn export_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize RunReport to JSON")
}

/// Deserialize a `RunReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunReport> {
    let report: RunReport =
        serde_json::from_str(json).context("failed to deserialize RunReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a trade list as CSV.
///
/// Columns: entry_index, entry_time, entry_price, exit_index, exit_time,
/// exit_price, quantity, pnl, return_pct, bars_held
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "entry_index",
        "entry_time",
        "entry_price",
        "exit_index",
        "exit_time",
        "exit_price",
        "quantity",
        "pnl",
        "return_pct",
        "bars_held",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.entry_index.to_string(),
            &t.entry_time.to_rfc3339(),
            &format!("{:.6}", t.entry_price),
            &t.exit_index.to_string(),
            &t.exit_time.to_rfc3339(),
            &format!("{:.6}", t.exit_price),
            &format!("{:.6}", t.quantity),
            &format!("{:.2}", t.pnl),
            &format!("{:.4}", t.return_pct()),
            &t.bars_held().to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export an equity curve as CSV with bar_index, timestamp, and equity columns.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["bar_index", "timestamp", "equity"])?;
    for (i, point) in equity_curve.iter().enumerate() {
        wtr.write_record([
            &i.to_string(),
            &point.timestamp.to_rfc3339(),
            &format!("{:.2}", point.equity),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export ranked sweep results as CSV, best first.
pub fn export_sweep_csv(results: &SweepResults) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "rank",
        "fast_window",
        "slow_window",
        "total_return_pct",
        "final_equity",
        "trade_count",
        "win_rate_pct",
        "max_drawdown_pct",
        "open_at_end",
    ])?;
    for (i, e) in results.all().iter().enumerate() {
        wtr.write_record([
            &(i + 1).to_string(),
            &e.fast_window.to_string(),
            &e.slow_window.to_string(),
            &format!("{:.4}", e.total_return_pct),
            &format!("{:.2}", e.final_equity),
            &e.trade_count.to_string(),
            &format!("{:.2}", e.win_rate_pct),
            &format!("{:.4}", e.max_drawdown_pct),
            &e.open_at_end.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single backtest run.
///
/// Creates a directory named `{symbol}_{config_hash[..12]}/` under
/// `output_dir` containing:
/// - `report.json`: the full `RunReport`
/// - `trades.csv`: closed trades
/// - `equity.csv`: bar-by-bar equity curve
///
/// Re-running the same config overwrites the same directory. Returns the
/// path to the directory.
pub fn save_artifacts(report: &RunReport, output_dir: &Path) -> Result<PathBuf> {
    let prefix = report
        .config_hash
        .get(..HASH_PREFIX_LEN)
        .unwrap_or(&report.config_hash);
    let run_dir = output_dir.join(format!("{}_{}", report.symbol, prefix));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    // report.json
    let json = export_json(report)?;
    std::fs::write(run_dir.join("report.json"), &json)?;

    // trades.csv
    let trades_csv = export_trades_csv(&report.result.trades)?;
    std::fs::write(run_dir.join("trades.csv"), &trades_csv)?;

    // equity.csv
    let equity_csv = export_equity_csv(&report.result.equity_curve)?;
    std::fs::write(run_dir.join("equity.csv"), &equity_csv)?;

    tracing::info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

/// Load a `RunReport` from an artifact directory's report.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<RunReport> {
    let report_path = dir.join("report.json");
    let json = std::fs::read_to_string(&report_path)
        .with_context(|| format!("failed to read {}", report_path.display()))?;
    import_json(&json)
}
