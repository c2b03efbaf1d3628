//! Bar: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BacktestError;

/// OHLCV observation for one fixed time interval.
///
/// Only `close` is used downstream, but every field is validated so a
/// corrupted row never reaches the engine silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Check that every price and the volume are finite and non-negative.
    ///
    /// `index` is the bar's position in its series and is only used to make
    /// the error point at the right row.
    pub fn validate(&self, index: usize) -> Result<(), BacktestError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(BacktestError::InvalidPrice {
                    index,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}
