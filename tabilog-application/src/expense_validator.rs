use crate::{error::ExpenseValidationError, model::ExpenseDraft, ports::RateSource};
use rust_decimal::Decimal;
use tabilog_domain::{BaseCurrency, ConversionRate, Expense, ParticipantId, Roster};

/// Write-boundary check for expenses.
///
/// Records that pass are safe for the balance calculator: the payer and every
/// split member are on the roster, the split set is non-empty and both amount
/// and rate are positive.
pub struct ExpenseValidator<'a> {
    base: &'a BaseCurrency,
    rates: &'a dyn RateSource,
}

impl<'a> ExpenseValidator<'a> {
    pub fn new(base: &'a BaseCurrency, rates: &'a dyn RateSource) -> Self {
        Self { base, rates }
    }

    pub fn validate(
        &self,
        draft: ExpenseDraft,
        roster: &Roster,
    ) -> Result<Expense, ExpenseValidationError> {
        if draft.amount <= Decimal::ZERO {
            return Err(ExpenseValidationError::NonPositiveAmount(
                draft.amount.to_string(),
            ));
        }
        if !roster.contains(&draft.paid_by) {
            return Err(ExpenseValidationError::UnknownPayer(draft.paid_by));
        }
        if draft.split_with.is_empty() {
            return Err(ExpenseValidationError::EmptySplit);
        }
        if let Some(unknown) = draft
            .split_with
            .iter()
            .find(|member| !roster.contains(member))
        {
            return Err(ExpenseValidationError::UnknownSplitMember(unknown.clone()));
        }

        let conversion_rate = self.resolve_rate(&draft)?;

        Ok(Expense {
            id: draft.id,
            title: draft.title,
            date: draft.date,
            category: draft.category,
            payer: ParticipantId::from(draft.paid_by),
            amount: draft.amount,
            currency: draft.currency,
            conversion_rate,
            split_with: draft
                .split_with
                .into_iter()
                .map(ParticipantId::from)
                .collect(),
            updated_at: draft.updated_at,
        })
    }

    fn resolve_rate(
        &self,
        draft: &ExpenseDraft,
    ) -> Result<ConversionRate, ExpenseValidationError> {
        if draft.currency == self.base.code {
            return Ok(ConversionRate::ONE);
        }

        let rate = match draft.exchange_rate {
            Some(rate) => ConversionRate::new(rate),
            None => self
                .rates
                .rate(&draft.currency, draft.date)
                .map_err(|source| ExpenseValidationError::RateUnavailable {
                    currency: draft.currency.clone(),
                    source,
                })?,
        };

        if !rate.is_positive() {
            return Err(ExpenseValidationError::NonPositiveRate {
                currency: draft.currency.clone(),
                rate: rate.value().to_string(),
            });
        }
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RateSourceError;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};
    use tabilog_domain::CurrencyCode;

    struct FixedRates;

    impl RateSource for FixedRates {
        fn rate(
            &self,
            currency: &CurrencyCode,
            _as_of: Option<NaiveDate>,
        ) -> Result<ConversionRate, RateSourceError> {
            match currency.as_str() {
                "AUD" => Ok(ConversionRate::new(Decimal::from(105))),
                _ => Err(RateSourceError::UnsupportedCurrency(currency.clone())),
            }
        }
    }

    static BASE: BaseCurrency = BaseCurrency::jpy();
    static RATES: FixedRates = FixedRates;

    #[fixture]
    fn validator() -> ExpenseValidator<'static> {
        ExpenseValidator::new(&BASE, &RATES)
    }

    #[fixture]
    fn roster() -> Roster {
        Roster::new(["X", "Y", "Z"])
    }

    fn draft(currency: &str, rate: Option<i64>) -> ExpenseDraft {
        ExpenseDraft {
            id: "e1".to_string(),
            title: "dinner".to_string(),
            date: None,
            category: "meal".to_string(),
            paid_by: "X".to_string(),
            amount: Decimal::from(10),
            currency: CurrencyCode::parse(currency).expect("valid currency"),
            exchange_rate: rate.map(Decimal::from),
            split_with: vec!["X".to_string(), "Y".to_string()],
            updated_at: None,
        }
    }

    #[rstest]
    #[case::base_currency_ignores_rate(draft("JPY", Some(7)), Decimal::ONE)]
    #[case::explicit_rate_kept(draft("AUD", Some(100)), Decimal::from(100))]
    #[case::missing_rate_looked_up(draft("AUD", None), Decimal::from(105))]
    fn accepts_valid_drafts(
        validator: ExpenseValidator<'static>,
        roster: Roster,
        #[case] input: ExpenseDraft,
        #[case] expected_rate: Decimal,
    ) {
        let expense = validator.validate(input, &roster).expect("valid expense");
        assert_eq!(expense.conversion_rate.value(), expected_rate);
        assert_eq!(expense.payer.as_str(), "X");
        assert_eq!(expense.split_with.len(), 2);
    }

    #[rstest]
    fn rejects_empty_split(validator: ExpenseValidator<'static>, roster: Roster) {
        let mut input = draft("JPY", None);
        input.split_with.clear();
        assert_eq!(
            validator.validate(input, &roster),
            Err(ExpenseValidationError::EmptySplit)
        );
    }

    #[rstest]
    fn rejects_unknown_members(validator: ExpenseValidator<'static>, roster: Roster) {
        let mut unknown_payer = draft("JPY", None);
        unknown_payer.paid_by = "W".to_string();
        assert_eq!(
            validator.validate(unknown_payer, &roster),
            Err(ExpenseValidationError::UnknownPayer("W".to_string()))
        );

        let mut unknown_split = draft("JPY", None);
        unknown_split.split_with.push("V".to_string());
        assert_eq!(
            validator.validate(unknown_split, &roster),
            Err(ExpenseValidationError::UnknownSplitMember("V".to_string()))
        );
    }

    #[rstest]
    #[case::zero_amount(Decimal::ZERO)]
    #[case::negative_amount(Decimal::from(-5))]
    fn rejects_non_positive_amount(
        validator: ExpenseValidator<'static>,
        roster: Roster,
        #[case] amount: Decimal,
    ) {
        let mut input = draft("JPY", None);
        input.amount = amount;
        assert!(matches!(
            validator.validate(input, &roster),
            Err(ExpenseValidationError::NonPositiveAmount(_))
        ));
    }

    #[rstest]
    fn rejects_non_positive_rate(validator: ExpenseValidator<'static>, roster: Roster) {
        assert!(matches!(
            validator.validate(draft("AUD", Some(0)), &roster),
            Err(ExpenseValidationError::NonPositiveRate { .. })
        ));
    }

    #[rstest]
    fn reports_missing_rate(validator: ExpenseValidator<'static>, roster: Roster) {
        let result = validator.validate(draft("TWD", None), &roster);
        assert!(matches!(
            result,
            Err(ExpenseValidationError::RateUnavailable {
                source: RateSourceError::UnsupportedCurrency(_),
                ..
            })
        ));
    }
}
