//! CrossLab CLI: run, sweep, and synth commands.
//!
//! Commands:
//! - `run`: backtest one fast/slow pair from a TOML config or flags
//! - `sweep`: rank every fast/slow combination on one data file
//! - `synth`: write a seeded synthetic price series to CSV

mod obs;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use crosslab_core::indicators::MaKind;
use crosslab_runner::{
    export_json, export_sweep_csv, load_csv, run_backtest_with_config, run_sweep, save_artifacts,
    save_csv, synthetic_series, BacktestConfig, ParamGrid, RunReport, SweepResults,
};

use obs::{init_tracing, LogFormat};

#[derive(Parser)]
#[command(
    name = "crosslab",
    version,
    about = "CrossLab CLI: dual moving-average crossover backtester"
)]
struct Cli {
    /// Log filter (e.g. info, debug, crosslab_core=debug). CROSSLAB_LOG overrides it.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest one fast/slow pair.
    Run {
        /// CSV file with timestamp,open,high,low,close,volume rows.
        #[arg(long)]
        data: PathBuf,

        /// Path to a TOML config file.
        #[arg(long, conflicts_with_all = ["fast", "slow", "balance"])]
        config: Option<PathBuf>,

        /// Fast moving-average window (required without --config).
        #[arg(long)]
        fast: Option<usize>,

        /// Slow moving-average window (required without --config).
        #[arg(long)]
        slow: Option<usize>,

        /// Initial balance. Defaults to 10000.
        #[arg(long)]
        balance: Option<f64>,

        /// Symbol label. Defaults to the config's symbol or the data file name.
        #[arg(long)]
        symbol: Option<String>,

        /// Use exponential instead of simple moving averages.
        #[arg(long, default_value_t = false)]
        ema: bool,

        /// Write report.json, trades.csv, and equity.csv under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the full report as JSON instead of the text summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Rank every fast < slow combination on one data file.
    Sweep {
        /// CSV file with timestamp,open,high,low,close,volume rows.
        #[arg(long)]
        data: PathBuf,

        /// Fast windows, comma separated (e.g. 10,20,30).
        #[arg(long, value_delimiter = ',', required = true)]
        fast: Vec<usize>,

        /// Slow windows, comma separated (e.g. 50,100,200).
        #[arg(long, value_delimiter = ',', required = true)]
        slow: Vec<usize>,

        /// Initial balance.
        #[arg(long, default_value_t = DEFAULT_BALANCE)]
        balance: f64,

        /// Use exponential instead of simple moving averages.
        #[arg(long, default_value_t = false)]
        ema: bool,

        /// How many of the best combinations to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Also write the full ranked table to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Write a seeded synthetic hourly series to CSV.
    Synth {
        /// Number of bars.
        #[arg(long, default_value_t = 1_000)]
        bars: usize,

        /// RNG seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// First bar's timestamp (RFC 3339).
        #[arg(long, default_value = "2024-01-01T00:00:00Z")]
        start: String,

        /// Output CSV path.
        #[arg(long)]
        out: PathBuf,
    },
}

const DEFAULT_BALANCE: f64 = 10_000.0;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format)?;

    match cli.command {
        Commands::Run {
            data,
            config,
            fast,
            slow,
            balance,
            symbol,
            ema,
            output_dir,
            json,
        } => {
            let config = build_config(config.as_deref(), fast, slow, balance, symbol, ema, &data)?;
            run_cmd(&config, &data, output_dir.as_deref(), json)
        }
        Commands::Sweep {
            data,
            fast,
            slow,
            balance,
            ema,
            top,
            csv,
        } => sweep_cmd(
            &data,
            ParamGrid::new(fast, slow),
            balance,
            ma_kind(ema),
            top,
            csv.as_deref(),
        ),
        Commands::Synth {
            bars,
            seed,
            start,
            out,
        } => synth_cmd(bars, seed, &start, &out),
    }
}

fn ma_kind(ema: bool) -> MaKind {
    if ema {
        MaKind::Ema
    } else {
        MaKind::Sma
    }
}

/// Resolve `--config` or the `--fast/--slow/--balance` flags into one config.
fn build_config(
    config_path: Option<&Path>,
    fast: Option<usize>,
    slow: Option<usize>,
    balance: Option<f64>,
    symbol: Option<String>,
    ema: bool,
    data: &Path,
) -> Result<BacktestConfig> {
    let mut config = match (config_path, fast, slow) {
        (Some(path), _, _) => BacktestConfig::from_file(path)?,
        (None, Some(fast), Some(slow)) => {
            let symbol = data
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "UNKNOWN".to_string());
            let balance = balance.unwrap_or(DEFAULT_BALANCE);
            let config = BacktestConfig::new(symbol, fast, slow, balance);
            config.validate()?;
            config
        }
        (None, _, _) => bail!("either --config or both --fast and --slow are required"),
    };

    if let Some(symbol) = symbol {
        config.backtest.symbol = symbol;
    }
    if ema {
        config.strategy.ma_kind = MaKind::Ema;
    }
    Ok(config)
}

fn run_cmd(
    config: &BacktestConfig,
    data: &Path,
    output_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let series = load_csv(data)?;
    let report = run_backtest_with_config(config, &series)?;

    if json {
        println!("{}", export_json(&report)?);
    } else {
        print_summary(&report);
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&report, dir)?;
        if !json {
            println!("Artifacts saved to: {}", run_dir.display());
        }
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    let result = &report.result;
    println!();
    println!("Symbol:         {}", report.symbol);
    println!(
        "Strategy:       {}({})/{}({}) crossover",
        report.config.strategy.ma_kind.as_str().to_uppercase(),
        report.config.strategy.fast_window,
        report.config.strategy.ma_kind.as_str().to_uppercase(),
        report.config.strategy.slow_window
    );
    println!(
        "Period:         {} to {}",
        report.start.format("%Y-%m-%d %H:%M"),
        report.end.format("%Y-%m-%d %H:%M")
    );
    println!(
        "Bars:           {} ({} warmup)",
        result.bar_count, result.warmup_bars
    );
    println!(
        "Crossovers:     {} bullish, {} bearish",
        result.bullish_crossovers, result.bearish_crossovers
    );
    println!();
    print!("{}", report.summary);
}

fn sweep_cmd(
    data: &Path,
    grid: ParamGrid,
    balance: f64,
    ma_kind: MaKind,
    top: usize,
    csv_out: Option<&Path>,
) -> Result<()> {
    if grid.size() == 0 {
        bail!("no fast < slow combinations in the grid");
    }
    let series = load_csv(data)?;
    let results = run_sweep(&series, &grid, balance, ma_kind)?;

    print_sweep(&results, ma_kind, top);

    if let Some(path) = csv_out {
        let csv = export_sweep_csv(&results)?;
        std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))?;
        println!("Sweep table saved to: {}", path.display());
    }
    Ok(())
}

fn print_sweep(results: &SweepResults, ma_kind: MaKind, top: usize) {
    let ma = ma_kind.as_str().to_uppercase();
    println!();
    println!("=== TOP {} OF {} ===", top.min(results.len()), results.len());
    println!(
        "{:>4}  {:<16} {:>10} {:>7} {:>8} {:>9}",
        "#", "Pair", "Return", "Trades", "WinRate", "MaxDD"
    );
    println!("{}", "-".repeat(60));
    for (i, e) in results.top_n(top).iter().enumerate() {
        println!(
            "{:>4}  {:<16} {:>9.2}% {:>7} {:>7.1}% {:>8.2}%",
            i + 1,
            format!("{ma}({})/{ma}({})", e.fast_window, e.slow_window),
            e.total_return_pct,
            e.trade_count,
            e.win_rate_pct,
            e.max_drawdown_pct
        );
    }
}

fn synth_cmd(bars: usize, seed: u64, start: &str, out: &Path) -> Result<()> {
    let start: DateTime<Utc> = DateTime::parse_from_rfc3339(start)
        .with_context(|| format!("invalid --start '{start}' (expected RFC 3339)"))?
        .with_timezone(&Utc);
    let series = synthetic_series(bars, seed, start)?;
    save_csv(&series, out)?;
    println!(
        "Wrote {} bars to {} (dataset {})",
        series.len(),
        out.display(),
        &series.dataset_hash()[..12]
    );
    Ok(())
}
