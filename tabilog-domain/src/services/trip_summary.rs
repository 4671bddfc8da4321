use crate::{
    model::{Expense, Money, ParticipantId, Roster},
    services::CurrencyNormalizer,
};
use indexmap::IndexMap;
use rust_decimal::Decimal;

const FULL_PERCENT: Decimal = Decimal::ONE_HUNDRED;

/// What one member fronted and consumed across the trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberStats {
    pub member: ParticipantId,
    pub paid: Money,
    pub cost: Money,
    pub balance: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetUsage {
    pub budget: Money,
    /// Share of the budget spent, in percent, capped at 100.
    pub percent: Decimal,
    pub over_budget: bool,
}

impl BudgetUsage {
    pub fn new(budget: Money, spent: Money) -> Self {
        let percent = if budget.is_positive() {
            spent
                .as_decimal()
                .checked_div(budget.as_decimal())
                .and_then(|ratio| ratio.checked_mul(FULL_PERCENT))
                .map_or(FULL_PERCENT, |percent| percent.min(FULL_PERCENT))
        } else if spent.is_positive() {
            FULL_PERCENT
        } else {
            Decimal::ZERO
        };

        Self {
            budget,
            percent: percent.max(Decimal::ZERO),
            over_budget: spent > budget,
        }
    }
}

/// Trip-wide totals in the base currency.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TripSummary {
    pub total: Money,
    pub budget: Option<BudgetUsage>,
    pub members: Vec<MemberStats>,
    pub categories: Vec<CategoryTotal>,
}

impl TripSummary {
    pub fn compute(
        normalizer: &CurrencyNormalizer,
        roster: &Roster,
        expenses: &[Expense],
        budget: Option<Money>,
    ) -> Self {
        let mut stats: IndexMap<&ParticipantId, (Money, Money)> = roster
            .iter()
            .map(|member| (member, (Money::ZERO, Money::ZERO)))
            .collect();
        let mut categories: IndexMap<&str, Money> = IndexMap::new();
        let mut total = Money::ZERO;

        for expense in expenses {
            let base = normalizer.expense_to_base(expense);
            let holders = expense.share_holders();
            let share = base / Decimal::from(holders.len());
            let category = expense.category.as_str();

            // Every total is checked before any is written, so a skipped
            // expense leaves the summary consistent.
            let next_total = total.checked_add(base);
            let next_category = categories
                .get(category)
                .copied()
                .unwrap_or(Money::ZERO)
                .checked_add(base);
            let next_paid = match stats.get(&expense.payer) {
                Some((paid, _)) => paid.checked_add(base).map(Some),
                None => Some(None),
            };
            let next_costs = holders
                .iter()
                .filter_map(|member| stats.get_full(*member))
                .map(|(index, _, (_, cost))| cost.checked_add(share).map(|next| (index, next)))
                .collect::<Option<Vec<_>>>();

            let (Some(next_total), Some(next_category), Some(next_paid), Some(next_costs)) =
                (next_total, next_category, next_paid, next_costs)
            else {
                tracing::error!(
                    expense_id = %expense.id,
                    amount = %base,
                    "Trip total overflow; leaving expense out of the summary"
                );
                continue;
            };

            total = next_total;
            categories.insert(category, next_category);
            if let (Some(paid), Some((current, _))) = (next_paid, stats.get_mut(&expense.payer)) {
                *current = paid;
            }
            for (index, cost) in next_costs {
                if let Some((_, (_, current))) = stats.get_index_mut(index) {
                    *current = cost;
                }
            }
        }

        let members = stats
            .into_iter()
            .map(|(member, (paid, cost))| MemberStats {
                member: member.clone(),
                paid,
                cost,
                balance: paid - cost,
            })
            .collect();
        let categories = categories
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category: category.to_string(),
                total,
            })
            .collect();

        Self {
            total,
            budget: budget.map(|budget| BudgetUsage::new(budget, total)),
            members,
            categories,
        }
    }

    pub fn member(&self, member: &str) -> Option<&MemberStats> {
        self.members
            .iter()
            .find(|stats| stats.member.as_str() == member)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Counterparty {
    pub member: ParticipantId,
    pub amount: Money,
}

/// One member's view: what they paid by category, whose shares they covered
/// and who covered theirs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberBreakdown {
    pub member: ParticipantId,
    pub paid_categories: Vec<CategoryTotal>,
    pub paid_for_others: Vec<Counterparty>,
    pub others_paid_for_me: Vec<Counterparty>,
}

impl MemberBreakdown {
    pub fn compute(
        normalizer: &CurrencyNormalizer,
        roster: &Roster,
        expenses: &[Expense],
        member: &ParticipantId,
    ) -> Self {
        let others = || roster.iter().filter(|other| *other != member);
        let mut paid_for_others: IndexMap<&ParticipantId, Money> =
            others().map(|other| (other, Money::ZERO)).collect();
        let mut others_paid_for_me = paid_for_others.clone();
        let mut paid_categories: IndexMap<&str, Money> = IndexMap::new();

        for expense in expenses {
            let base = normalizer.expense_to_base(expense);
            let holders = expense.share_holders();
            let share = base / Decimal::from(holders.len());

            if expense.payer == *member {
                let category = expense.category.as_str();
                let next_category = paid_categories
                    .get(category)
                    .copied()
                    .unwrap_or(Money::ZERO)
                    .checked_add(base);
                let next_shares = holders
                    .iter()
                    .filter_map(|holder| paid_for_others.get_full(*holder))
                    .map(|(index, _, amount)| amount.checked_add(share).map(|sum| (index, sum)))
                    .collect::<Option<Vec<_>>>();
                let (Some(next_category), Some(next_shares)) = (next_category, next_shares) else {
                    log_breakdown_overflow(expense, base);
                    continue;
                };
                paid_categories.insert(category, next_category);
                for (index, sum) in next_shares {
                    if let Some((_, amount)) = paid_for_others.get_index_mut(index) {
                        *amount = sum;
                    }
                }
            } else if holders.contains(&member) {
                if let Some(amount) = others_paid_for_me.get_mut(&expense.payer) {
                    match amount.checked_add(share) {
                        Some(sum) => *amount = sum,
                        None => log_breakdown_overflow(expense, base),
                    }
                }
            }
        }

        Self {
            member: member.clone(),
            paid_categories: paid_categories
                .into_iter()
                .map(|(category, total)| CategoryTotal {
                    category: category.to_string(),
                    total,
                })
                .collect(),
            paid_for_others: into_counterparties(paid_for_others),
            others_paid_for_me: into_counterparties(others_paid_for_me),
        }
    }
}

fn log_breakdown_overflow(expense: &Expense, base: Money) {
    tracing::error!(
        expense_id = %expense.id,
        amount = %base,
        "Breakdown overflow; leaving expense out"
    );
}

fn into_counterparties(amounts: IndexMap<&ParticipantId, Money>) -> Vec<Counterparty> {
    amounts
        .into_iter()
        .map(|(member, amount)| Counterparty {
            member: member.clone(),
            amount,
        })
        .collect()
}
