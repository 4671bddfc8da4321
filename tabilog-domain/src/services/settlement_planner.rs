use crate::model::{MemberBalances, Money, ParticipantId, RoundingMode, SettlementPlan, Transfer};
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Tolerance and rounding used when turning balances into transfers.
///
/// `epsilon` is the magnitude below which a balance counts as settled; it is
/// expected to be non-negative. Transfer amounts are rounded to `scale`
/// decimal places.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementContext {
    pub epsilon: Money,
    pub scale: u32,
    pub rounding_mode: RoundingMode,
}

impl SettlementContext {
    /// One yen tolerance, whole-yen transfers.
    pub fn jpy_default() -> Self {
        Self {
            epsilon: Money::from_i64(1),
            scale: 0,
            rounding_mode: RoundingMode::HalfUp,
        }
    }
}

impl Default for SettlementContext {
    fn default() -> Self {
        Self::jpy_default()
    }
}

/// Greedy largest-first debt simplification.
///
/// Debtors are visited from the most negative balance, each paying the
/// creditor at the front of a queue ordered from the most positive balance.
/// The sort is stable, so equal balances keep roster order. Running balances
/// move by the rounded transfer amount, so every debtor ends within
/// `epsilon` of zero while creditors remain. Creditors carry no such bound:
/// each debtor's rounding can leave up to one unit behind, so a creditor may
/// end as far as `debtors * epsilon` from zero. This is not a
/// minimum-transaction solver, but the plan never exceeds
/// `debtors + creditors - 1` transfers.
#[derive(Clone, Debug, Default)]
pub struct SettlementPlanner {
    context: SettlementContext,
}

impl SettlementPlanner {
    pub fn new(context: SettlementContext) -> Self {
        Self { context }
    }

    pub fn plan(&self, balances: &MemberBalances) -> SettlementPlan {
        let epsilon = self.context.epsilon.as_decimal().abs();

        let mut debtors: Vec<(&ParticipantId, Decimal)> = balances
            .iter()
            .map(|(member, balance)| (member, balance.as_decimal()))
            .filter(|(_, balance)| *balance < -epsilon)
            .collect();
        let mut creditors: Vec<(&ParticipantId, Decimal)> = balances
            .iter()
            .map(|(member, balance)| (member, balance.as_decimal()))
            .filter(|(_, balance)| *balance > epsilon)
            .collect();

        debtors.sort_by(|lhs, rhs| lhs.1.cmp(&rhs.1));
        creditors.sort_by(|lhs, rhs| rhs.1.cmp(&lhs.1));

        let debtor_count = debtors.len();
        let creditor_count = creditors.len();
        let mut creditors: VecDeque<(&ParticipantId, Decimal)> = creditors.into();
        let mut transfers = Vec::new();
        let mut residual = Decimal::ZERO;

        for (debtor, mut debt) in debtors {
            while debt < -epsilon {
                let Some((creditor, credit)) = creditors.front_mut() else {
                    break;
                };

                let matched = (-debt).min(*credit);
                let amount = Money::from_decimal(matched)
                    .round_to(self.context.scale, self.context.rounding_mode);
                if amount.is_zero() {
                    // Less than one unit is left on one side.
                    if matched == *credit {
                        residual += *credit;
                        creditors.pop_front();
                        continue;
                    }
                    break;
                }

                transfers.push(Transfer {
                    from: debtor.clone(),
                    to: (*creditor).clone(),
                    amount,
                });

                debt += amount.as_decimal();
                *credit -= amount.as_decimal();
                if *credit < epsilon {
                    residual += *credit;
                    creditors.pop_front();
                }
            }
            residual += debt;
        }
        residual += creditors.iter().map(|(_, credit)| *credit).sum::<Decimal>();

        if !residual.is_zero() {
            tracing::debug!(
                residual = %residual,
                epsilon = %epsilon,
                "Dropping sub-epsilon residual from settlement plan"
            );
        }

        tracing::debug!(
            debtor_count,
            creditor_count,
            transfer_count = transfers.len(),
            "Settlement plan computed"
        );

        SettlementPlan { transfers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{ConversionRate, CurrencyCode, Expense, Roster},
        services::BalanceCalculator,
    };
    use rstest::{fixture, rstest};

    #[fixture]
    fn planner() -> SettlementPlanner {
        SettlementPlanner::new(SettlementContext::jpy_default())
    }

    fn balances(entries: &[(&str, i64)]) -> MemberBalances {
        entries
            .iter()
            .map(|(member, amount)| (ParticipantId::from(*member), Money::from_i64(*amount)))
            .collect()
    }

    fn transfers(plan: &SettlementPlan) -> Vec<(&str, &str, Money)> {
        plan.iter()
            .map(|transfer| (transfer.from.as_str(), transfer.to.as_str(), transfer.amount))
            .collect()
    }

    #[rstest]
    #[case::single_creditor(
        &[("X", 200), ("Y", -100), ("Z", -100)],
        vec![("Y", "X", 100), ("Z", "X", 100)]
    )]
    #[case::already_balanced(&[("X", 0), ("Y", 0)], vec![])]
    #[case::no_creditors(&[("X", -5), ("Y", -3)], vec![])]
    #[case::largest_debtor_first(
        &[("A", 50), ("B", -20), ("C", -80), ("D", 50)],
        vec![("C", "A", 50), ("C", "D", 30), ("B", "D", 20)]
    )]
    #[case::ties_keep_roster_order(
        &[("A", -100), ("B", 100), ("C", -100), ("D", 100)],
        vec![("A", "B", 100), ("C", "D", 100)]
    )]
    #[case::sub_epsilon_balances_ignored(&[("X", 1), ("Y", -1)], vec![])]
    #[case::one_debtor_many_creditors(
        &[("A", 10), ("B", 30), ("C", 20), ("D", -60)],
        vec![("D", "B", 30), ("D", "C", 20), ("D", "A", 10)]
    )]
    fn plan_cases(
        planner: SettlementPlanner,
        #[case] input: &[(&str, i64)],
        #[case] expected: Vec<(&str, &str, i64)>,
    ) {
        let plan = planner.plan(&balances(input));
        let expected: Vec<(&str, &str, Money)> = expected
            .into_iter()
            .map(|(from, to, amount)| (from, to, Money::from_i64(amount)))
            .collect();
        assert_eq!(transfers(&plan), expected);
    }

    #[rstest]
    fn fractional_balances_round_transfer_amounts(planner: SettlementPlanner) {
        let input: MemberBalances = [
            (ParticipantId::from("X"), Money::new(6_666_667, 5)),
            (ParticipantId::from("Y"), Money::new(-3_333_333, 5)),
            (ParticipantId::from("Z"), Money::new(-3_333_334, 5)),
        ]
        .into_iter()
        .collect();

        let plan = planner.plan(&input);

        assert_eq!(
            transfers(&plan),
            vec![
                ("Z", "X", Money::from_i64(33)),
                ("Y", "X", Money::from_i64(33)),
            ]
        );
    }

    #[rstest]
    fn rounding_drift_accumulates_on_the_creditor(planner: SettlementPlanner) {
        let roster = Roster::new(["X", "A", "B", "C", "D", "E"]);
        let expense = Expense::new(
            "X",
            Decimal::from(7),
            CurrencyCode::JPY,
            ConversionRate::ONE,
            ["A", "B", "C", "D", "E"],
        );
        let balances = BalanceCalculator::default().calculate(&roster, &[expense]);

        let plan = planner.plan(&balances);
        let settled = plan.apply_to(&balances);

        // Each debtor owes 1.4 and pays a rounded 1, leaving 0.4 on their side.
        let one = Money::from_i64(1);
        assert_eq!(
            transfers(&plan),
            vec![
                ("A", "X", one),
                ("B", "X", one),
                ("C", "X", one),
                ("D", "X", one),
                ("E", "X", one),
            ]
        );
        assert_eq!(settled["X"], Money::from_i64(2));
        assert!(settled.values().skip(1).all(|balance| *balance == Money::new(-4, 1)));
    }

    #[rstest]
    fn plan_is_deterministic(planner: SettlementPlanner) {
        let input = balances(&[("A", 70), ("B", -30), ("C", -30), ("D", -10)]);
        assert_eq!(planner.plan(&input), planner.plan(&input));
    }

    #[test]
    fn two_decimal_scale_keeps_cents() {
        let planner = SettlementPlanner::new(SettlementContext {
            epsilon: Money::new(1, 2),
            scale: 2,
            rounding_mode: RoundingMode::HalfEven,
        });
        let input: MemberBalances = [
            (ParticipantId::from("X"), Money::new(1234, 2)),
            (ParticipantId::from("Y"), Money::new(-1234, 2)),
        ]
        .into_iter()
        .collect();

        let plan = planner.plan(&input);

        assert_eq!(transfers(&plan), vec![("Y", "X", Money::new(1234, 2))]);
    }
}
