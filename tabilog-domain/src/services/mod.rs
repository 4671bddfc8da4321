pub mod balance_calculator;
pub mod currency_normalizer;
pub mod settlement_planner;
pub mod trip_summary;

pub use balance_calculator::{BalanceAccumulator, BalanceCalculator};
pub use currency_normalizer::{BaseCurrency, CurrencyNormalizer};
pub use settlement_planner::{SettlementContext, SettlementPlanner};
pub use trip_summary::{
    BudgetUsage, CategoryTotal, Counterparty, MemberBreakdown, MemberStats, TripSummary,
};
