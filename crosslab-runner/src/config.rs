//! Serializable backtest configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crosslab_core::engine::EngineConfig;
use crosslab_core::indicators::MaKind;
use crosslab_core::BacktestError;

use crate::summary::DEFAULT_RECENT_TRADES;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] BacktestError),
}

/// Everything needed to reproduce one backtest run.
///
/// ```toml
/// [backtest]
/// symbol = "BTCUSDT"
/// initial_balance = 10000.0
///
/// [strategy]
/// fast_window = 50
/// slow_window = 200
/// ma_kind = "ema"
///
/// [report]
/// recent_trades = 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub strategy: StrategySection,
    #[serde(default)]
    pub report: ReportSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacktestSection {
    pub symbol: String,
    pub initial_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategySection {
    pub fast_window: usize,
    pub slow_window: usize,
    #[serde(default)]
    pub ma_kind: MaKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportSection {
    #[serde(default = "default_recent_trades")]
    pub recent_trades: usize,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            recent_trades: DEFAULT_RECENT_TRADES,
        }
    }
}

fn default_recent_trades() -> usize {
    DEFAULT_RECENT_TRADES
}

impl BacktestConfig {
    /// Build a config in code, e.g. from CLI flags.
    pub fn new(
        symbol: impl Into<String>,
        fast_window: usize,
        slow_window: usize,
        initial_balance: f64,
    ) -> Self {
        Self {
            backtest: BacktestSection {
                symbol: symbol.into(),
                initial_balance,
            },
            strategy: StrategySection {
                fast_window,
                slow_window,
                ma_kind: MaKind::Sma,
            },
            report: ReportSection::default(),
        }
    }

    pub fn with_ma_kind(mut self, ma_kind: MaKind) -> Self {
        self.strategy.ma_kind = ma_kind;
        self
    }

    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_engine_config().validate()?;
        Ok(())
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig::new(
            self.strategy.fast_window,
            self.strategy.slow_window,
            self.backtest.initial_balance,
        )
        .with_ma_kind(self.strategy.ma_kind)
    }

    /// Deterministic fingerprint of the parameters that affect results.
    ///
    /// The `[report]` section only changes presentation and is left out, so
    /// two configs that differ only in `recent_trades` share a hash.
    pub fn config_hash(&self) -> String {
        let hashed = (&self.backtest, &self.strategy);
        // Plain strings and numbers only; serialization cannot fail.
        let json = serde_json::to_string(&hashed).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    pub fn symbol(&self) -> &str {
        &self.backtest.symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[backtest]
symbol = "BTCUSDT"
initial_balance = 10000.0

[strategy]
fast_window = 50
slow_window = 200
ma_kind = "ema"

[report]
recent_trades = 5
"#;

    const MINIMAL: &str = r#"
[backtest]
symbol = "ETHUSDT"
initial_balance = 2500.0

[strategy]
fast_window = 10
slow_window = 30
"#;

    #[test]
    fn parses_full_config() {
        let config = BacktestConfig::from_toml(FULL).unwrap();
        assert_eq!(config.symbol(), "BTCUSDT");
        assert_eq!(config.backtest.initial_balance, 10_000.0);
        assert_eq!(config.strategy.fast_window, 50);
        assert_eq!(config.strategy.slow_window, 200);
        assert_eq!(config.strategy.ma_kind, MaKind::Ema);
        assert_eq!(config.report.recent_trades, 5);
    }

    #[test]
    fn optional_fields_default() {
        let config = BacktestConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.strategy.ma_kind, MaKind::Sma);
        assert_eq!(config.report.recent_trades, DEFAULT_RECENT_TRADES);
    }

    #[test]
    fn engine_config_carries_parameters() {
        let engine = BacktestConfig::from_toml(FULL).unwrap().to_engine_config();
        assert_eq!(engine.fast_window, 50);
        assert_eq!(engine.slow_window, 200);
        assert_eq!(engine.initial_balance, 10_000.0);
        assert_eq!(engine.ma_kind, MaKind::Ema);
    }

    #[test]
    fn zero_window_is_invalid() {
        let toml = MINIMAL.replace("fast_window = 10", "fast_window = 0");
        assert!(matches!(
            BacktestConfig::from_toml(&toml),
            Err(ConfigError::Invalid(BacktestError::InvalidWindow { .. }))
        ));
    }

    #[test]
    fn negative_balance_is_invalid() {
        let toml = MINIMAL.replace("2500.0", "-1.0");
        assert!(matches!(
            BacktestConfig::from_toml(&toml),
            Err(ConfigError::Invalid(BacktestError::InvalidInitialBalance(_)))
        ));
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let toml = format!("{MINIMAL}stop_loss = 0.05\n");
        assert!(matches!(
            BacktestConfig::from_toml(&toml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_section_is_a_parse_error() {
        assert!(matches!(
            BacktestConfig::from_toml("[backtest]\nsymbol = \"X\"\ninitial_balance = 1.0\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn config_hash_is_deterministic() {
        let a = BacktestConfig::from_toml(MINIMAL).unwrap();
        let b = BacktestConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(a.config_hash(), b.config_hash());
        assert_eq!(a.config_hash().len(), 64);
    }

    #[test]
    fn config_hash_ignores_report_section() {
        let a = BacktestConfig::from_toml(MINIMAL).unwrap();
        let mut b = a.clone();
        b.report.recent_trades = 99;
        assert_eq!(a.config_hash(), b.config_hash());

        let c = a.clone().with_ma_kind(MaKind::Ema);
        assert_ne!(a.config_hash(), c.config_hash());
    }

    #[test]
    fn new_matches_parsed() {
        let built = BacktestConfig::new("ETHUSDT", 10, 30, 2500.0);
        assert_eq!(built, BacktestConfig::from_toml(MINIMAL).unwrap());
    }
}
