//! Error taxonomy for the core.
//!
//! Every failure is a synchronous `Result` error. Nothing is retried and no
//! sentinel value is ever substituted for a detected invalid state.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Coarse classification of a [`BacktestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad parameters, caught before any computation starts.
    InvalidConfiguration,
    /// Bad bars: ordering, finiteness, sign, or length.
    InvalidInputData,
    /// A zero entry price or a non-finite position amount.
    ArithmeticHazard,
}

/// Errors produced by the indicator, signal, and backtest layers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BacktestError {
    #[error("invalid configuration: {name} must be >= 1 (got {window})")]
    InvalidWindow { name: &'static str, window: usize },

    #[error("invalid configuration: initial balance must be finite and > 0 (got {0})")]
    InvalidInitialBalance(f64),

    #[error("invalid input data: series needs at least 2 bars (got {len})")]
    SeriesTooShort { len: usize },

    #[error(
        "invalid input data: timestamp at bar {index} ({current}) is not after the previous bar ({previous})"
    )]
    NonMonotonicTimestamp {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    #[error("invalid input data: bar {index} has {field} = {value} (must be finite and >= 0)")]
    InvalidPrice {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("invalid input data: {what} has {actual} entries, series has {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("arithmetic hazard: entry at bar {index} ({timestamp}) would use a zero close price")]
    ZeroEntryPrice {
        index: usize,
        timestamp: DateTime<Utc>,
    },

    #[error("arithmetic hazard: {what} at bar {index} ({timestamp}) is not finite (price {price})")]
    NonFiniteAmount {
        what: &'static str,
        index: usize,
        timestamp: DateTime<Utc>,
        price: f64,
    },
}

impl BacktestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BacktestError::InvalidWindow { .. } | BacktestError::InvalidInitialBalance(_) => {
                ErrorKind::InvalidConfiguration
            }
            BacktestError::SeriesTooShort { .. }
            | BacktestError::NonMonotonicTimestamp { .. }
            | BacktestError::InvalidPrice { .. }
            | BacktestError::LengthMismatch { .. } => ErrorKind::InvalidInputData,
            BacktestError::ZeroEntryPrice { .. } | BacktestError::NonFiniteAmount { .. } => {
                ErrorKind::ArithmeticHazard
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            BacktestError::InvalidWindow {
                name: "fast_window",
                window: 0
            }
            .kind(),
            ErrorKind::InvalidConfiguration
        );
        assert_eq!(
            BacktestError::InvalidInitialBalance(-1.0).kind(),
            ErrorKind::InvalidConfiguration
        );
        assert_eq!(
            BacktestError::SeriesTooShort { len: 1 }.kind(),
            ErrorKind::InvalidInputData
        );
        assert_eq!(
            BacktestError::ZeroEntryPrice {
                index: 3,
                timestamp: DateTime::from_timestamp(0, 0).unwrap(),
            }
            .kind(),
            ErrorKind::ArithmeticHazard
        );
        assert_eq!(
            BacktestError::NonFiniteAmount {
                what: "position size",
                index: 1,
                timestamp: DateTime::from_timestamp(0, 0).unwrap(),
                price: 1e-310,
            }
            .kind(),
            ErrorKind::ArithmeticHazard
        );
    }

    #[test]
    fn messages_name_the_offending_field() {
        let err = BacktestError::InvalidPrice {
            index: 7,
            field: "close",
            value: f64::NAN,
        };
        let msg = err.to_string();
        assert!(msg.contains("bar 7"));
        assert!(msg.contains("close"));
    }
}
