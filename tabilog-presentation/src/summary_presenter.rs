use crate::{
    settlement_presenter::{format_amount, format_member_label, format_signed},
    text_table::{Alignment, TextTableBuilder},
};
use std::borrow::Cow;
use tabilog_application::MemberDirectory;
use tabilog_domain::{BaseCurrency, MemberBreakdown, TripSummary};
use tabilog_i18n as i18n;

const PERCENT_DECIMALS: u32 = 1;

pub struct SummaryPresenter;

pub struct SummaryView {
    pub member_table: String,
    pub category_table: String,
    /// `None` when the trip has no budget.
    pub budget_line: Option<String>,
}

impl SummaryPresenter {
    pub fn render_with_members(
        summary: &TripSummary,
        base: &BaseCurrency,
        member_directory: &dyn MemberDirectory,
    ) -> SummaryView {
        SummaryView {
            member_table: Self::build_member_table(summary, base, member_directory),
            category_table: Self::build_category_table(summary, base),
            budget_line: summary.budget.as_ref().map(|usage| {
                let percent = usage.percent.round_dp(PERCENT_DECIMALS).normalize();
                format!(
                    "{}: {} ({})",
                    i18n::BUDGET,
                    format_amount(usage.budget, base),
                    i18n::budget_usage(percent, usage.over_budget)
                )
            }),
        }
    }

    pub fn build_member_table(
        summary: &TripSummary,
        base: &BaseCurrency,
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Right,
                Alignment::Right,
                Alignment::Right,
            ])
            .headers(&[
                Cow::Borrowed(i18n::MEMBER),
                Cow::Borrowed(i18n::PAID),
                Cow::Borrowed(i18n::COST),
                Cow::Borrowed(i18n::BALANCE),
            ]);

        for stats in &summary.members {
            builder = builder.row([
                format_member_label(&stats.member, member_directory),
                Cow::Owned(format_amount(stats.paid, base)),
                Cow::Owned(format_amount(stats.cost, base)),
                Cow::Owned(format_signed(stats.balance, base)),
            ]);
        }

        builder.build()
    }

    /// Categories in first-seen order followed by a total row.
    pub fn build_category_table(summary: &TripSummary, base: &BaseCurrency) -> String {
        TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&[Cow::Borrowed(i18n::CATEGORY), Cow::Borrowed(i18n::AMOUNT)])
            .rows(summary.categories.iter().map(|category| {
                [
                    category_label(&category.category),
                    Cow::Owned(format_amount(category.total, base)),
                ]
            }))
            .row([
                Cow::Borrowed(i18n::TOTAL),
                Cow::Owned(format_amount(summary.total, base)),
            ])
            .build()
    }

    /// Per-counterparty table for one member: what they fronted for each
    /// other member and what each other member fronted for them.
    pub fn build_breakdown_table(
        breakdown: &MemberBreakdown,
        base: &BaseCurrency,
        member_directory: &dyn MemberDirectory,
    ) -> String {
        TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right, Alignment::Right])
            .headers(&[
                Cow::Borrowed(i18n::MEMBER),
                Cow::Borrowed(i18n::PAID_FOR_THEM),
                Cow::Borrowed(i18n::PAID_FOR_ME),
            ])
            .rows(
                breakdown
                    .paid_for_others
                    .iter()
                    .zip(&breakdown.others_paid_for_me)
                    .map(|(mine, theirs)| {
                        [
                            format_member_label(&mine.member, member_directory),
                            Cow::Owned(format_amount(mine.amount, base)),
                            Cow::Owned(format_amount(theirs.amount, base)),
                        ]
                    }),
            )
            .build()
    }
}

fn category_label(category: &str) -> Cow<'_, str> {
    if category.trim().is_empty() {
        Cow::Borrowed(i18n::UNCATEGORIZED)
    } else {
        Cow::Borrowed(category)
    }
}
