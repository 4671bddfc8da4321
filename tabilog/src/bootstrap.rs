use rust_decimal::Decimal;
use std::{env, str::FromStr};
use tabilog_domain::{
    BaseCurrency, ConversionRate, CurrencyCode, CurrencyCodeError, Money, RoundingMode,
    SettlementContext,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const BASE_CURRENCY: &str = "TABILOG_BASE_CURRENCY";
const MINOR_UNIT_SCALE: &str = "TABILOG_MINOR_UNIT_SCALE";
const SETTLEMENT_EPSILON: &str = "TABILOG_SETTLEMENT_EPSILON";
const RATES: &str = "TABILOG_RATES";
const MAX_MINOR_UNIT_SCALE: u32 = 8;
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TABILOG_BASE_CURRENCY is invalid: {0}")]
    BaseCurrency(#[from] CurrencyCodeError),
    #[error("{key} must be {expected} (got {value:?})")]
    InvalidNumber {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("TABILOG_RATES entry {0:?} must look like CODE=RATE with a positive rate")]
    InvalidRate(String),
}

/// Settings read from the environment (and `.env`, when present).
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub base: BaseCurrency,
    pub epsilon: Money,
    /// `CODE=RATE` pairs that take precedence over the built-in table.
    pub pinned_rates: Vec<(CurrencyCode, ConversionRate)>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let code = match lookup(BASE_CURRENCY) {
            Some(value) => CurrencyCode::parse(&value)?,
            None => CurrencyCode::JPY,
        };

        let minor_unit_scale = match lookup(MINOR_UNIT_SCALE) {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|scale| *scale <= MAX_MINOR_UNIT_SCALE)
                .ok_or(ConfigError::InvalidNumber {
                    key: MINOR_UNIT_SCALE,
                    expected: "a small non-negative integer",
                    value,
                })?,
            None => 0,
        };

        let epsilon = match lookup(SETTLEMENT_EPSILON) {
            Some(value) => Decimal::from_str(value.trim())
                .ok()
                .filter(|epsilon| *epsilon >= Decimal::ZERO)
                .map(Money::from_decimal)
                .ok_or(ConfigError::InvalidNumber {
                    key: SETTLEMENT_EPSILON,
                    expected: "a non-negative decimal",
                    value,
                })?,
            None => Money::new(1, minor_unit_scale),
        };

        let pinned_rates = match lookup(RATES) {
            Some(value) => parse_rates(&value)?,
            None => Vec::new(),
        };

        Ok(Self {
            base: BaseCurrency {
                code,
                minor_unit_scale,
                rounding_mode: RoundingMode::HalfUp,
            },
            epsilon,
            pinned_rates,
        })
    }

    pub fn settlement_context(&self) -> SettlementContext {
        SettlementContext {
            epsilon: self.epsilon,
            scale: self.base.minor_unit_scale,
            rounding_mode: self.base.rounding_mode,
        }
    }
}

fn parse_rates(value: &str) -> Result<Vec<(CurrencyCode, ConversionRate)>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let invalid = || ConfigError::InvalidRate(entry.to_string());
            let (code, rate) = entry.split_once('=').ok_or_else(invalid)?;
            let code = CurrencyCode::parse(code.trim()).map_err(|_| invalid())?;
            let rate = Decimal::from_str(rate.trim())
                .ok()
                .map(ConversionRate::new)
                .filter(|rate| rate.is_positive())
                .ok_or_else(invalid)?;
            Ok((code, rate))
        })
        .collect()
}

/// Initialize logging and tracing. Output goes to stderr so the tables on
/// stdout stay clean.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_yen() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("default config");

        assert_eq!(config.base, BaseCurrency::jpy());
        assert_eq!(config.epsilon, Money::from_i64(1));
        assert!(config.pinned_rates.is_empty());
        assert_eq!(config.settlement_context(), SettlementContext::jpy_default());
    }

    #[test]
    fn reads_base_currency_and_scale() {
        let config = AppConfig::from_lookup(lookup(&[
            (BASE_CURRENCY, "usd"),
            (MINOR_UNIT_SCALE, "2"),
            (RATES, "JPY=0.0067, EUR = 1.08,"),
        ]))
        .expect("valid config");

        assert_eq!(config.base.code.as_str(), "USD");
        assert_eq!(config.base.minor_unit_scale, 2);
        assert_eq!(config.epsilon, Money::new(1, 2));
        assert_eq!(
            config.pinned_rates,
            vec![
                (
                    CurrencyCode::JPY,
                    ConversionRate::new(Decimal::new(67, 4))
                ),
                (
                    CurrencyCode::parse("EUR").expect("valid code"),
                    ConversionRate::new(Decimal::new(108, 2))
                ),
            ]
        );
    }

    #[rstest]
    #[case::bad_currency(BASE_CURRENCY, "yen!")]
    #[case::bad_scale(MINOR_UNIT_SCALE, "-1")]
    #[case::huge_scale(MINOR_UNIT_SCALE, "99")]
    #[case::negative_epsilon(SETTLEMENT_EPSILON, "-1")]
    #[case::rate_without_value(RATES, "USD")]
    #[case::zero_rate(RATES, "USD=0")]
    fn rejects_invalid_values(#[case] key: &str, #[case] value: &str) {
        assert!(AppConfig::from_lookup(lookup(&[(key, value)])).is_err());
    }
}
