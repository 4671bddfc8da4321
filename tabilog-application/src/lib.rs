#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod expense_validator;
pub mod ledger_processor;
pub mod model;
pub mod ports;

pub use error::{ExpenseValidationError, RateSourceError, SnapshotError};
pub use expense_validator::ExpenseValidator;
pub use ledger_processor::LedgerProcessor;
pub use model::{ExpenseDraft, LedgerReport, PersonBalance, TripSnapshot, UserProfile};
pub use ports::{MemberDirectory, RateSource, TripSnapshotSource};
