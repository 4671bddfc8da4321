use crate::{
    error::SnapshotError,
    model::{LedgerReport, PersonBalance, TripSnapshot},
    ports::TripSnapshotSource,
};
use tabilog_domain::{
    BalanceCalculator, BaseCurrency, CurrencyNormalizer, Expense, MemberBalances, MemberBreakdown,
    Roster, SettlementContext, SettlementPlan, SettlementPlanner, TripSummary,
};

/// Runs the ledger pipeline over one trip snapshot:
/// expenses -> balances -> settlement plan, plus the trip summary.
///
/// Every call recomputes from scratch; nothing is cached between calls.
#[derive(Clone, Debug, Default)]
pub struct LedgerProcessor {
    calculator: BalanceCalculator,
    planner: SettlementPlanner,
}

impl LedgerProcessor {
    pub fn new(base: BaseCurrency, context: SettlementContext) -> Self {
        Self {
            calculator: BalanceCalculator::new(CurrencyNormalizer::new(base)),
            planner: SettlementPlanner::new(context),
        }
    }

    pub fn normalizer(&self) -> &CurrencyNormalizer {
        self.calculator.normalizer()
    }

    pub fn calculate_balances(&self, roster: &Roster, expenses: &[Expense]) -> MemberBalances {
        self.calculator.calculate(roster, expenses)
    }

    pub fn plan_settlements(&self, balances: &MemberBalances) -> SettlementPlan {
        self.planner.plan(balances)
    }

    pub fn summarize(&self, snapshot: &TripSnapshot) -> TripSummary {
        TripSummary::compute(
            self.normalizer(),
            &snapshot.roster,
            &snapshot.expenses,
            snapshot.budget,
        )
    }

    pub fn breakdown(&self, snapshot: &TripSnapshot, member: &str) -> Option<MemberBreakdown> {
        let member = snapshot.roster.get(member)?;
        Some(MemberBreakdown::compute(
            self.normalizer(),
            &snapshot.roster,
            &snapshot.expenses,
            member,
        ))
    }

    pub fn process(&self, snapshot: &TripSnapshot) -> LedgerReport {
        let balances = self.calculate_balances(&snapshot.roster, &snapshot.expenses);
        let plan = self.plan_settlements(&balances);
        let summary = self.summarize(snapshot);

        tracing::debug!(
            trip = %snapshot.name,
            roster_size = snapshot.roster.len(),
            expense_count = snapshot.expenses.len(),
            transfer_count = plan.len(),
            "Ledger processed"
        );

        LedgerReport {
            balances: balances
                .into_iter()
                .map(|(id, balance)| PersonBalance { id, balance })
                .collect(),
            plan,
            summary,
        }
    }

    pub fn process_source(
        &self,
        source: &dyn TripSnapshotSource,
    ) -> Result<LedgerReport, SnapshotError> {
        let snapshot = source.load()?;
        Ok(self.process(&snapshot))
    }
}
