use crate::model::{ConversionRate, CurrencyCode, Expense, Money, RoundingMode};
use rust_decimal::Decimal;

/// The single currency balances and settlements are expressed in.
///
/// `minor_unit_scale` is the number of decimal places of the smallest unit
/// (0 for JPY, 2 for USD). Converted amounts are rounded to that unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseCurrency {
    pub code: CurrencyCode,
    pub minor_unit_scale: u32,
    pub rounding_mode: RoundingMode,
}

impl BaseCurrency {
    pub const fn jpy() -> Self {
        Self {
            code: CurrencyCode::JPY,
            minor_unit_scale: 0,
            rounding_mode: RoundingMode::HalfUp,
        }
    }
}

impl Default for BaseCurrency {
    fn default() -> Self {
        Self::jpy()
    }
}

/// Converts recorded amounts into the base currency using the rate attached
/// to each record.
#[derive(Clone, Debug, Default)]
pub struct CurrencyNormalizer {
    base: BaseCurrency,
}

impl CurrencyNormalizer {
    pub fn new(base: BaseCurrency) -> Self {
        Self { base }
    }

    /// Amounts already in the base currency pass through untouched; anything
    /// else is multiplied by its rate and rounded to the base minor unit.
    pub fn to_base(
        &self,
        amount: Decimal,
        currency: &CurrencyCode,
        rate: ConversionRate,
    ) -> Money {
        if *currency == self.base.code {
            return Money::from_decimal(amount);
        }

        if !rate.is_positive() {
            tracing::warn!(
                currency = %currency,
                rate = %rate.value(),
                "Converting with a non-positive exchange rate"
            );
        }

        let Some(converted) = amount.checked_mul(rate.value()) else {
            tracing::error!(
                amount = %amount,
                currency = %currency,
                rate = %rate.value(),
                "Currency conversion overflowed; amount treated as zero"
            );
            return Money::ZERO;
        };

        Money::from_decimal(converted)
            .round_to(self.base.minor_unit_scale, self.base.rounding_mode)
    }

    pub fn expense_to_base(&self, expense: &Expense) -> Money {
        self.to_base(expense.amount, &expense.currency, expense.conversion_rate)
    }
}
