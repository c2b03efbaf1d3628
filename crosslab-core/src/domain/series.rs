//! PriceSeries: the validated, immutable input to everything downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bar::Bar;
use crate::error::BacktestError;

/// Minimum number of bars a series must hold.
pub const MIN_BARS: usize = 2;

/// Time-ordered sequence of bars.
///
/// The only way to obtain one is [`PriceSeries::new`] (serde goes through the
/// same constructor), so holding a `PriceSeries` proves that:
/// - it has at least [`MIN_BARS`] bars,
/// - timestamps are strictly increasing (no duplicates),
/// - every price and volume is finite and non-negative.
///
/// Gaps between timestamps are tolerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bar>", into = "Vec<Bar>")]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, BacktestError> {
        if bars.len() < MIN_BARS {
            return Err(BacktestError::SeriesTooShort { len: bars.len() });
        }

        for (index, bar) in bars.iter().enumerate() {
            bar.validate(index)?;
            if index > 0 {
                let previous = bars[index - 1].timestamp;
                if bar.timestamp <= previous {
                    return Err(BacktestError::NonMonotonicTimestamp {
                        index,
                        previous,
                        current: bar.timestamp,
                    });
                }
            }
        }

        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false: a constructed series holds at least [`MIN_BARS`] bars.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> &Bar {
        &self.bars[0]
    }

    pub fn last(&self) -> &Bar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.bars.iter().map(|b| b.timestamp)
    }

    /// Content hash of the bars (BLAKE3 over their canonical JSON).
    ///
    /// Two series hash equal iff they hold identical bars, which lets a run
    /// report prove which data it was computed from.
    pub fn dataset_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for bar in &self.bars {
            // Bar holds only plain numbers and a timestamp; serialization cannot fail.
            let json = serde_json::to_vec(bar).unwrap_or_default();
            hasher.update(&json);
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}

impl TryFrom<Vec<Bar>> for PriceSeries {
    type Error = BacktestError;

    fn try_from(bars: Vec<Bar>) -> Result<Self, Self::Error> {
        Self::new(bars)
    }
}

impl From<PriceSeries> for Vec<Bar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}
