//! Data loading: CSV files in, validated [`PriceSeries`] out.
//!
//! Two sources:
//! 1. `load_csv()` / `load_csv_reader()`: OHLCV rows with a header
//!    `timestamp,open,high,low,close,volume`
//! 2. `synthetic_series()`: a seeded random walk for demos and benches
//!
//! Both hand their bars to `PriceSeries::new`, so ordering and finiteness are
//! checked in exactly one place. `save_csv()` writes the same format back out.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crosslab_core::domain::{Bar, PriceSeries};
use crosslab_core::BacktestError;

/// Errors from data loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: cannot parse timestamp '{value}' (expected RFC 3339 or epoch milliseconds)")]
    Timestamp { row: usize, value: String },

    #[error("{0}")]
    Series(#[from] BacktestError),
}

/// One CSV row before timestamp parsing.
#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Load a price series from a CSV file.
pub fn load_csv(path: &Path) -> Result<PriceSeries, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = load_csv_reader(file)?;
    info!(
        path = %path.display(),
        bars = series.len(),
        first = %series.first().timestamp,
        last = %series.last().timestamp,
        "loaded price series"
    );
    Ok(series)
}

/// Load a price series from any CSV source.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<PriceSeries, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (index, record) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = record?;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| LoadError::Timestamp {
            row: index + 1,
            value: row.timestamp.clone(),
        })?;
        bars.push(Bar {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }

    debug!(rows = bars.len(), "parsed csv rows");
    Ok(PriceSeries::new(bars)?)
}

/// Write `series` to a CSV file in the format `load_csv` reads.
pub fn save_csv(series: &PriceSeries, path: &Path) -> Result<(), LoadError> {
    let file = std::fs::File::create(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(series, file)?;
    info!(path = %path.display(), bars = series.len(), "saved price series");
    Ok(())
}

/// Write `series` as CSV with RFC 3339 timestamps.
///
/// Prices use the shortest representation that parses back to the same
/// `f64`, so a save/load cycle reproduces the series exactly.
pub fn write_csv<W: Write>(series: &PriceSeries, writer: W) -> Result<(), LoadError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;
    for bar in series.bars() {
        wtr.write_record([
            bar.timestamp.to_rfc3339(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// RFC 3339, or an integer count of Unix epoch milliseconds (the exchange
/// kline convention).
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(millis) = value.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Generate a synthetic hourly series for testing/development.
///
/// Produces a random walk from a starting price of 100.0. The same
/// `(bars, seed, start)` always yields the same series.
pub fn synthetic_series(
    bars: usize,
    seed: u64,
    start: DateTime<Utc>,
) -> Result<PriceSeries, LoadError> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(bars);
    let mut price = 100.0_f64;

    for i in 0..bars {
        let hourly_return: f64 = rng.gen_range(-0.01..0.01);
        let open = price;
        let close = price * (1.0 + hourly_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.005));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.005));
        let volume = rng.gen_range(10.0..1_000.0);

        out.push(Bar {
            timestamp: start + Duration::hours(i as i64),
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
    }

    Ok(PriceSeries::new(out)?)
}
