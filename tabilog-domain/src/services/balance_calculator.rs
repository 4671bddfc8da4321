use crate::{
    model::{Expense, MemberBalances, Money, ParticipantId, Roster},
    services::CurrencyNormalizer,
};
use indexmap::IndexMap;
use rust_decimal::Decimal;

/// Running balance table for one roster.
///
/// Keys outside the roster are never inserted; a credit or debit aimed at an
/// unknown participant is dropped and reported.
pub struct BalanceAccumulator {
    balances: MemberBalances,
}

impl BalanceAccumulator {
    pub fn new(roster: &Roster) -> Self {
        let balances = roster
            .iter()
            .cloned()
            .map(|member| (member, Money::ZERO))
            .collect();
        Self { balances }
    }

    /// Applies one expense whose amount has already been converted to the
    /// base currency. Returns `false`, leaving every balance untouched, when
    /// a balance would leave the range `Decimal` can represent.
    pub fn apply(&mut self, expense: &Expense, base_amount: Money) -> bool {
        if expense.split_with.is_empty() {
            tracing::warn!(
                expense_id = %expense.id,
                payer = %expense.payer,
                "Expense has an empty split set; payer absorbs the whole amount"
            );
        }

        let holders = expense.share_holders();
        let share = base_amount / Decimal::from(holders.len());
        let credits = std::iter::once((&expense.payer, base_amount))
            .chain(holders.into_iter().map(|member| (member, -share)));

        // Staged so an expense lands in full or not at all.
        let mut staged: IndexMap<&ParticipantId, Money> = IndexMap::new();
        for (member, amount) in credits {
            let current = match staged.get(member).or_else(|| self.balances.get(member)) {
                Some(balance) => *balance,
                None => {
                    tracing::warn!(
                        expense_id = %expense.id,
                        member = %member,
                        "Ignoring participant outside the roster"
                    );
                    continue;
                }
            };
            let Some(next) = current.checked_add(amount) else {
                tracing::error!(
                    expense_id = %expense.id,
                    member = %member,
                    amount = %base_amount,
                    "Balance overflow; skipping expense"
                );
                return false;
            };
            staged.insert(member, next);
        }

        for (member, balance) in staged {
            if let Some(slot) = self.balances.get_mut(member) {
                *slot = balance;
            }
        }
        true
    }

    pub fn into_balances(self) -> MemberBalances {
        self.balances
    }
}

/// Derives each participant's net position (paid minus owed) in the base
/// currency. Positive means the group owes the participant.
#[derive(Clone, Debug, Default)]
pub struct BalanceCalculator {
    normalizer: CurrencyNormalizer,
}

impl BalanceCalculator {
    pub fn new(normalizer: CurrencyNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &CurrencyNormalizer {
        &self.normalizer
    }

    /// Recomputes the full balance table from scratch, in roster order.
    pub fn calculate(&self, roster: &Roster, expenses: &[Expense]) -> MemberBalances {
        let mut accumulator = BalanceAccumulator::new(roster);
        for expense in expenses {
            let base_amount = self.normalizer.expense_to_base(expense);
            accumulator.apply(expense, base_amount);
        }
        accumulator.into_balances()
    }
}
