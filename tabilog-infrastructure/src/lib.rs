#![warn(clippy::uninlined_format_args)]

pub mod default_rates;
pub mod json_snapshot;

pub use default_rates::{DefaultRateTable, FallbackRateSource, PinnedRateTable};
pub use json_snapshot::{JsonTripSnapshotSource, TripDocument};
