use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tabilog_application::{RateSource, RateSourceError};
use tabilog_domain::{ConversionRate, CurrencyCode};

/// JPY per one unit, as (code, mantissa, scale).
const DEFAULT_JPY_RATES: [(&str, i64, u32); 6] = [
    ("AUD", 105, 0),
    ("JPY", 1, 0),
    ("USD", 150, 0),
    ("EUR", 165, 0),
    ("KRW", 11, 2),
    ("TWD", 48, 1),
];

/// Fixed JPY rates used when no live quote is available.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultRateTable;

impl RateSource for DefaultRateTable {
    fn rate(
        &self,
        currency: &CurrencyCode,
        _as_of: Option<NaiveDate>,
    ) -> Result<ConversionRate, RateSourceError> {
        DEFAULT_JPY_RATES
            .iter()
            .find(|(code, _, _)| *code == currency.as_str())
            .map(|&(_, mantissa, scale)| ConversionRate::new(Decimal::new(mantissa, scale)))
            .ok_or_else(|| RateSourceError::UnsupportedCurrency(currency.clone()))
    }
}

/// Rates pinned by the operator, e.g. from configuration.
#[derive(Clone, Debug, Default)]
pub struct PinnedRateTable {
    rates: HashMap<CurrencyCode, ConversionRate>,
}

impl PinnedRateTable {
    pub fn new(rates: impl IntoIterator<Item = (CurrencyCode, ConversionRate)>) -> Self {
        Self {
            rates: rates.into_iter().collect(),
        }
    }
}

impl RateSource for PinnedRateTable {
    fn rate(
        &self,
        currency: &CurrencyCode,
        _as_of: Option<NaiveDate>,
    ) -> Result<ConversionRate, RateSourceError> {
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| RateSourceError::UnsupportedCurrency(currency.clone()))
    }
}

/// Asks `primary` first and falls back to `fallback` when it fails.
pub struct FallbackRateSource<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackRateSource<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: RateSource, F: RateSource> RateSource for FallbackRateSource<P, F> {
    fn rate(
        &self,
        currency: &CurrencyCode,
        as_of: Option<NaiveDate>,
    ) -> Result<ConversionRate, RateSourceError> {
        match self.primary.rate(currency, as_of) {
            Ok(rate) => Ok(rate),
            Err(RateSourceError::UnsupportedCurrency(_)) => {
                tracing::debug!(currency = %currency, "Primary rate source has no quote");
                self.fallback.rate(currency, as_of)
            }
            Err(err) => {
                tracing::warn!(
                    currency = %currency,
                    error = %err,
                    "Primary rate source failed; using fallback rate"
                );
                self.fallback.rate(currency, as_of)
            }
        }
    }
}
