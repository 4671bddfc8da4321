use tabilog_domain::CurrencyCode;
use thiserror::Error;

/// Reasons an expense is refused at the write boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseValidationError {
    #[error("expense must be split with at least one participant")]
    EmptySplit,
    #[error("payer '{0}' is not on the trip roster")]
    UnknownPayer(String),
    #[error("split member '{0}' is not on the trip roster")]
    UnknownSplitMember(String),
    #[error("expense amount must be positive (got {0})")]
    NonPositiveAmount(String),
    #[error("exchange rate for {currency} must be positive (got {rate})")]
    NonPositiveRate { currency: CurrencyCode, rate: String },
    #[error("no exchange rate available for {currency}")]
    RateUnavailable {
        currency: CurrencyCode,
        #[source]
        source: RateSourceError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateSourceError {
    #[error("currency {0} is not supported by this rate source")]
    UnsupportedCurrency(CurrencyCode),
    #[error("rate lookup failed: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read trip document: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed trip document: {0}")]
    Malformed(String),
    #[error("trip has no participants")]
    EmptyRoster,
    #[error("expense #{} is invalid: {source}", .index + 1)]
    InvalidExpense {
        index: usize,
        #[source]
        source: ExpenseValidationError,
    },
}
