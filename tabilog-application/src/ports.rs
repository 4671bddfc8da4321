use crate::{
    error::{RateSourceError, SnapshotError},
    model::TripSnapshot,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use tabilog_domain::{ConversionRate, CurrencyCode, ParticipantId};

/// Supplies base-currency rates for new expenses. Rates are captured on the
/// expense record; the ledger never asks again.
pub trait RateSource: Send + Sync {
    fn rate(
        &self,
        currency: &CurrencyCode,
        as_of: Option<NaiveDate>,
    ) -> Result<ConversionRate, RateSourceError>;
}

/// Hands out an atomic snapshot of the trip from whatever store backs it.
pub trait TripSnapshotSource {
    fn load(&self) -> Result<TripSnapshot, SnapshotError>;
}

pub trait MemberDirectory: Send + Sync {
    fn display_name(&self, member: &ParticipantId) -> Option<&str>;
}

impl MemberDirectory for HashMap<ParticipantId, String> {
    fn display_name(&self, member: &ParticipantId) -> Option<&str> {
        self.get(member).map(String::as_str)
    }
}
