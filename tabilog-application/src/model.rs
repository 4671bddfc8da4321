use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tabilog_domain::{
    CurrencyCode, Expense, MemberBalances, Money, ParticipantId, Roster, SettlementPlan,
    TripSummary,
};

/// Expense as entered by a user, before it is checked against the roster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub category: String,
    pub paid_by: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    /// Missing rates are looked up from a rate source at validation time.
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
    #[serde(default)]
    pub split_with: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: ParticipantId,
    pub display_name: String,
}

/// One consistent copy of everything the ledger needs.
///
/// Callers take the snapshot once; the calculators never observe a
/// collection that is still being synced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TripSnapshot {
    pub name: String,
    pub roster: Roster,
    pub expenses: Vec<Expense>,
    pub profiles: Vec<UserProfile>,
    pub budget: Option<Money>,
}

impl TripSnapshot {
    pub fn directory(&self) -> HashMap<ParticipantId, String> {
        self.profiles
            .iter()
            .map(|profile| (profile.id.clone(), profile.display_name.clone()))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonBalance {
    pub id: ParticipantId,
    pub balance: Money,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LedgerReport {
    pub balances: Vec<PersonBalance>,
    pub plan: SettlementPlan,
    pub summary: TripSummary,
}

impl LedgerReport {
    pub fn balance_table(&self) -> MemberBalances {
        self.balances
            .iter()
            .map(|person| (person.id.clone(), person.balance))
            .collect()
    }
}
