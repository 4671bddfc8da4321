use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tabilog_application::{
    ExpenseDraft, ExpenseValidator, RateSource, SnapshotError, TripSnapshot, TripSnapshotSource,
    UserProfile,
};
use tabilog_domain::{BaseCurrency, Money, Roster};

/// On-disk shape of a trip, as exported by the sync layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub budget: Option<Decimal>,
    pub participants: Vec<String>,
    #[serde(default)]
    pub profiles: Vec<UserProfile>,
    #[serde(default)]
    pub expenses: Vec<ExpenseDraft>,
}

impl TripDocument {
    pub fn parse(content: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(content).map_err(|err| SnapshotError::Malformed(err.to_string()))
    }

    /// Validates every expense and freezes the document into a snapshot.
    pub fn into_snapshot(
        self,
        base: &BaseCurrency,
        rates: &dyn RateSource,
    ) -> Result<TripSnapshot, SnapshotError> {
        let roster = Roster::new(self.participants);
        if roster.is_empty() {
            return Err(SnapshotError::EmptyRoster);
        }

        let validator = ExpenseValidator::new(base, rates);
        let expenses = self
            .expenses
            .into_iter()
            .enumerate()
            .map(|(index, mut draft)| {
                if draft.id.is_empty() {
                    draft.id = format!("expense-{}", index + 1);
                }
                validator
                    .validate(draft, &roster)
                    .map_err(|source| SnapshotError::InvalidExpense { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TripSnapshot {
            name: self.name,
            roster,
            expenses,
            profiles: self.profiles,
            budget: self.budget.map(Money::from_decimal),
        })
    }
}

/// Reads a trip document from a JSON file on every `load`.
pub struct JsonTripSnapshotSource<R> {
    path: PathBuf,
    base: BaseCurrency,
    rates: R,
}

impl<R: RateSource> JsonTripSnapshotSource<R> {
    pub fn new(path: impl Into<PathBuf>, base: BaseCurrency, rates: R) -> Self {
        Self {
            path: path.into(),
            base,
            rates,
        }
    }
}

impl<R: RateSource> TripSnapshotSource for JsonTripSnapshotSource<R> {
    fn load(&self) -> Result<TripSnapshot, SnapshotError> {
        let content = fs::read_to_string(&self.path)?;
        let snapshot = TripDocument::parse(&content)?.into_snapshot(&self.base, &self.rates)?;
        tracing::info!(
            path = %self.path.display(),
            participants = snapshot.roster.len(),
            expenses = snapshot.expenses.len(),
            "Loaded trip snapshot"
        );
        Ok(snapshot)
    }
}
