#[cfg(all(feature = "ja", feature = "en"))]
compile_error!("Cannot enable both 'ja' and 'en' features at the same time");

#[cfg(feature = "ja")]
pub mod strings {
    pub const MEMBER: &str = "メンバー";
    pub const BALANCE: &str = "収支";
    pub const PAID: &str = "立替額";
    pub const COST: &str = "負担額";
    pub const FROM: &str = "支払人";
    pub const TO: &str = "受取人";
    pub const AMOUNT: &str = "金額";
    pub const CATEGORY: &str = "カテゴリ";
    pub const UNCATEGORIZED: &str = "未分類";
    pub const TOTAL: &str = "合計";
    pub const BUDGET: &str = "予算";
    pub const BALANCES_HEADING: &str = "収支一覧";
    pub const SETTLEMENT_HEADING: &str = "精算プラン";
    pub const SUMMARY_HEADING: &str = "旅の支出";
    pub const ALL_SETTLED: &str = "清算は完了しています";
    pub const OVER_BUDGET: &str = "予算オーバー";
    pub const PAID_FOR_THEM: &str = "立て替えた額";
    pub const PAID_FOR_ME: &str = "立て替えてもらった額";
}

#[cfg(feature = "en")]
pub mod strings {
    pub const MEMBER: &str = "Member";
    pub const BALANCE: &str = "Balance";
    pub const PAID: &str = "Paid";
    pub const COST: &str = "Cost";
    pub const FROM: &str = "From";
    pub const TO: &str = "To";
    pub const AMOUNT: &str = "Amount";
    pub const CATEGORY: &str = "Category";
    pub const UNCATEGORIZED: &str = "Uncategorized";
    pub const TOTAL: &str = "Total";
    pub const BUDGET: &str = "Budget";
    pub const BALANCES_HEADING: &str = "Balances";
    pub const SETTLEMENT_HEADING: &str = "Settlement plan";
    pub const SUMMARY_HEADING: &str = "Trip spending";
    pub const ALL_SETTLED: &str = "Everyone is settled up";
    pub const OVER_BUDGET: &str = "Over budget";
    pub const PAID_FOR_THEM: &str = "Paid for them";
    pub const PAID_FOR_ME: &str = "Paid for me";
}

#[cfg(not(any(feature = "ja", feature = "en")))]
pub mod strings {
    pub const MEMBER: &str = "Member";
    pub const BALANCE: &str = "Balance";
    pub const PAID: &str = "Paid";
    pub const COST: &str = "Cost";
    pub const FROM: &str = "From";
    pub const TO: &str = "To";
    pub const AMOUNT: &str = "Amount";
    pub const CATEGORY: &str = "Category";
    pub const UNCATEGORIZED: &str = "Uncategorized";
    pub const TOTAL: &str = "Total";
    pub const BUDGET: &str = "Budget";
    pub const BALANCES_HEADING: &str = "Balances";
    pub const SETTLEMENT_HEADING: &str = "Settlement plan";
    pub const SUMMARY_HEADING: &str = "Trip spending";
    pub const ALL_SETTLED: &str = "Everyone is settled up";
    pub const OVER_BUDGET: &str = "Over budget";
    pub const PAID_FOR_THEM: &str = "Paid for them";
    pub const PAID_FOR_ME: &str = "Paid for me";
}

pub use strings::*;

pub struct BudgetUsageMessage<P> {
    percent: P,
    over_budget: bool,
}

pub fn budget_usage<P: std::fmt::Display>(percent: P, over_budget: bool) -> BudgetUsageMessage<P> {
    BudgetUsageMessage {
        percent,
        over_budget,
    }
}

#[cfg(feature = "ja")]
impl<P: std::fmt::Display> std::fmt::Display for BudgetUsageMessage<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "予算の{}%を使用", self.percent)?;
        if self.over_budget {
            write!(f, " ({OVER_BUDGET})")?;
        }
        Ok(())
    }
}

#[cfg(not(feature = "ja"))]
impl<P: std::fmt::Display> std::fmt::Display for BudgetUsageMessage<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}% of budget used", self.percent)?;
        if self.over_budget {
            write!(f, " ({OVER_BUDGET})")?;
        }
        Ok(())
    }
}

#[cfg(feature = "ja")]
pub fn invalid_expense(index: usize, detail: impl std::fmt::Display) -> String {
    format!("{}件目の支出が不正です: {detail}", index + 1)
}

#[cfg(not(feature = "ja"))]
pub fn invalid_expense(index: usize, detail: impl std::fmt::Display) -> String {
    format!("Expense #{} is invalid: {detail}", index + 1)
}

#[cfg(feature = "ja")]
pub fn failed_to_load_trip(
    path: impl std::fmt::Display,
    detail: impl std::fmt::Display,
) -> String {
    format!("旅行データ '{path}' を読み込めませんでした: {detail}")
}

#[cfg(not(feature = "ja"))]
pub fn failed_to_load_trip(
    path: impl std::fmt::Display,
    detail: impl std::fmt::Display,
) -> String {
    format!("Failed to load trip '{path}': {detail}")
}
