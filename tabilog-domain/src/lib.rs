#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    ConversionRate, CurrencyCode, CurrencyCodeError, Expense, MemberBalances, Money,
    ParticipantId, Roster, RoundingMode, SettlementPlan, Transfer,
};
pub use services::{
    BalanceAccumulator, BalanceCalculator, BaseCurrency, CurrencyNormalizer, MemberBreakdown,
    SettlementContext, SettlementPlanner, TripSummary,
};
