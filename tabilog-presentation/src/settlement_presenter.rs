use crate::text_table::{Alignment, TextTableBuilder};
use std::borrow::Cow;
use tabilog_application::{LedgerReport, MemberDirectory, PersonBalance};
use tabilog_domain::{BaseCurrency, Money, ParticipantId, Transfer};
use tabilog_i18n as i18n;

pub struct SettlementPresenter;

pub struct SettlementView {
    pub balance_table: String,
    /// `None` when nobody owes anything.
    pub transfer_table: Option<String>,
}

impl SettlementPresenter {
    pub fn render(report: &LedgerReport, base: &BaseCurrency) -> SettlementView {
        let empty_directory = EmptyMemberDirectory;
        Self::render_with_members(report, base, &empty_directory)
    }

    pub fn render_with_members(
        report: &LedgerReport,
        base: &BaseCurrency,
        member_directory: &dyn MemberDirectory,
    ) -> SettlementView {
        let balance_table = Self::build_balance_table(&report.balances, base, member_directory);
        let transfers: Vec<&Transfer> = report.plan.iter().collect();

        SettlementView {
            balance_table,
            transfer_table: (!transfers.is_empty())
                .then(|| Self::build_transfer_table(&transfers, base, member_directory)),
        }
    }

    pub fn build_balance_table(
        person_balances: &[PersonBalance],
        base: &BaseCurrency,
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&[Cow::Borrowed(i18n::MEMBER), Cow::Borrowed(i18n::BALANCE)]);

        for person in person_balances {
            builder = builder.row([
                format_member_label(&person.id, member_directory),
                Cow::Owned(format_signed(person.balance, base)),
            ]);
        }

        builder.build()
    }

    pub fn build_transfer_table(
        transfers: &[&Transfer],
        base: &BaseCurrency,
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&[
                Cow::Borrowed(i18n::FROM),
                Cow::Borrowed(i18n::TO),
                Cow::Borrowed(i18n::AMOUNT),
            ]);

        for transfer in transfers {
            builder = builder.row([
                format_member_label(&transfer.from, member_directory),
                format_member_label(&transfer.to, member_directory),
                Cow::Owned(format_amount(transfer.amount, base)),
            ]);
        }

        builder.build()
    }
}

struct EmptyMemberDirectory;

impl MemberDirectory for EmptyMemberDirectory {
    fn display_name(&self, _member: &ParticipantId) -> Option<&str> {
        None
    }
}

pub(crate) fn format_member_label<'a>(
    member: &'a ParticipantId,
    member_directory: &'a dyn MemberDirectory,
) -> Cow<'a, str> {
    Cow::Borrowed(
        member_directory
            .display_name(member)
            .unwrap_or_else(|| member.as_str()),
    )
}

/// Rounds to the base currency's minor unit for display only.
pub(crate) fn format_amount(amount: Money, base: &BaseCurrency) -> String {
    amount
        .round_to(base.minor_unit_scale, base.rounding_mode)
        .to_string()
}

pub(crate) fn format_signed(amount: Money, base: &BaseCurrency) -> String {
    let rounded = amount.round_to(base.minor_unit_scale, base.rounding_mode);
    let sign = if rounded.is_negative() { "" } else { "+" };
    format!("{sign}{rounded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;
    use tabilog_domain::{SettlementPlan, TripSummary};

    const JPY: BaseCurrency = BaseCurrency::jpy();

    fn sample_report() -> LedgerReport {
        LedgerReport {
            balances: vec![
                PersonBalance {
                    id: ParticipantId::from("ryo"),
                    balance: Money::from_i64(120),
                },
                PersonBalance {
                    id: ParticipantId::from("rena"),
                    balance: Money::from_i64(-120),
                },
            ],
            plan: SettlementPlan {
                transfers: vec![Transfer {
                    from: ParticipantId::from("rena"),
                    to: ParticipantId::from("ryo"),
                    amount: Money::from_i64(120),
                }],
            },
            summary: TripSummary::default(),
        }
    }

    #[test]
    fn render_uses_display_name_when_available() {
        let mut directory = HashMap::new();
        directory.insert(ParticipantId::from("rena"), "Rena".to_string());

        let view = SettlementPresenter::render_with_members(&sample_report(), &JPY, &directory);

        assert!(view.balance_table.contains("Rena"));
        assert!(view.balance_table.contains("-120"));
        assert!(view.balance_table.contains("+120"));
        assert!(
            view.transfer_table
                .as_ref()
                .expect("transfer table")
                .contains("Rena")
        );
    }

    #[test]
    fn render_falls_back_to_participant_id() {
        let view = SettlementPresenter::render(&sample_report(), &JPY);

        let transfers = view.transfer_table.expect("transfer table");
        assert!(transfers.contains("rena"));
        assert!(transfers.contains("ryo"));
    }

    #[test]
    fn settled_report_has_no_transfer_table() {
        let mut report = sample_report();
        report.plan = SettlementPlan::default();
        for person in &mut report.balances {
            person.balance = Money::ZERO;
        }

        let view = SettlementPresenter::render(&report, &JPY);

        assert!(view.transfer_table.is_none());
        assert!(view.balance_table.contains("+0"));
    }

    #[rstest]
    #[case::fractional_credit(Money::new(33_333, 3), "+33")]
    #[case::fractional_debt(Money::new(-66_667, 3), "-67")]
    #[case::zero(Money::ZERO, "+0")]
    fn balances_are_shown_in_minor_units(#[case] balance: Money, #[case] expected: &str) {
        assert_eq!(format_signed(balance, &JPY), expected);
    }
}
