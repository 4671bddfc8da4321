use chrono::{DateTime, NaiveDate, Utc};
use fxhash::FxHashSet;
use indexmap::{IndexMap, IndexSet};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::{
    borrow::{Borrow, Cow},
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
    sync::Arc,
};
use thiserror::Error;

/// Opaque participant identifier taken from the trip roster.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(Arc<str>);

impl ParticipantId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ParticipantId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for ParticipantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Fixed, ordered set of participants. Iteration order is the tie-break order
/// used by every calculation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    members: IndexSet<ParticipantId>,
}

impl Roster {
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ParticipantId>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, member: &str) -> bool {
        self.members.contains(member)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticipantId> + '_ {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, member: &str) -> Option<&ParticipantId> {
        self.members.get(member)
    }

    pub fn position(&self, member: &str) -> Option<usize> {
        self.members.get_index_of(member)
    }
}

impl<T: Into<ParticipantId>> FromIterator<T> for Roster {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Balance table keyed in roster order.
pub type MemberBalances = IndexMap<ParticipantId, Money>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    /// Round half away from zero (0.5 -> 1, -0.5 -> -1).
    #[default]
    HalfUp,
    /// Banker's rounding.
    HalfEven,
}

impl RoundingMode {
    pub fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// Amount expressed in the base currency.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// `None` when the sum falls outside the range `Decimal` can represent.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn round_to(self, scale: u32, mode: RoundingMode) -> Self {
        Self(self.0.round_dp_with_strategy(scale, mode.strategy()).normalize())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Money {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyCodeError {
    #[error("currency code must be three ASCII letters (got {0:?})")]
    Malformed(String),
}

/// Upper-cased three-letter currency code.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(Cow<'static, str>);

impl CurrencyCode {
    pub const JPY: Self = Self(Cow::Borrowed("JPY"));

    pub fn parse(code: &str) -> Result<Self, CurrencyCodeError> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyCodeError::Malformed(code.to_string()));
        }
        Ok(Self(Cow::Owned(trimmed.to_ascii_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0.into_owned()
    }
}

/// Base-currency units per one unit of the expense currency, fixed at entry time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversionRate(Decimal);

impl ConversionRate {
    pub const ONE: Self = Self(Decimal::ONE);

    pub fn new(rate: Decimal) -> Self {
        Self(rate)
    }

    pub fn value(self) -> Decimal {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }
}

/// A single ledger entry.
///
/// The payer is credited the full base amount; only members of `split_with`
/// are debited, so the payer shares the cost only when listed there.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub category: String,
    pub payer: ParticipantId,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub conversion_rate: ConversionRate,
    pub split_with: Vec<ParticipantId>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Expense {
    pub fn new(
        payer: impl Into<ParticipantId>,
        amount: Decimal,
        currency: CurrencyCode,
        conversion_rate: ConversionRate,
        split_with: impl IntoIterator<Item = impl Into<ParticipantId>>,
    ) -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            date: None,
            category: String::new(),
            payer: payer.into(),
            amount,
            currency,
            conversion_rate,
            split_with: split_with.into_iter().map(Into::into).collect(),
            updated_at: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Members that carry a share of this expense, duplicates removed.
    ///
    /// An empty split set falls back to the payer alone, which keeps the
    /// share count at one and the expense's net effect at zero.
    pub fn share_holders(&self) -> Vec<&ParticipantId> {
        if self.split_with.is_empty() {
            return vec![&self.payer];
        }
        let mut seen = FxHashSet::default();
        self.split_with
            .iter()
            .filter(|member| seen.insert(member.as_str()))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
}

/// Ordered list of transfers that settles a balance table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SettlementPlan {
    pub transfers: Vec<Transfer>,
}

impl SettlementPlan {
    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transfer> + '_ {
        self.transfers.iter()
    }

    pub fn total(&self) -> Money {
        self.transfers.iter().map(|transfer| transfer.amount).sum()
    }

    pub fn paid_by(&self, member: &str) -> Money {
        self.transfers
            .iter()
            .filter(|transfer| transfer.from.as_str() == member)
            .map(|transfer| transfer.amount)
            .sum()
    }

    /// Returns the balances left after every transfer is carried out.
    pub fn apply_to(&self, balances: &MemberBalances) -> MemberBalances {
        let mut remaining = balances.clone();
        for transfer in &self.transfers {
            if let Some(balance) = remaining.get_mut(&transfer.from) {
                *balance += transfer.amount;
            }
            if let Some(balance) = remaining.get_mut(&transfer.to) {
                *balance -= transfer.amount;
            }
        }
        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::upper("AUD", "AUD")]
    #[case::lower("usd", "USD")]
    #[case::padded(" eur ", "EUR")]
    fn currency_code_parses(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(CurrencyCode::parse(input).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case::too_short("YN")]
    #[case::digits("U5D")]
    #[case::empty("")]
    fn currency_code_rejects_malformed(#[case] input: &str) {
        assert!(CurrencyCode::parse(input).is_err());
    }

    #[test]
    fn roster_keeps_insertion_order_and_drops_duplicates() {
        let roster = Roster::new(["X", "Y", "X", "Z"]);
        let ids: Vec<&str> = roster.iter().map(ParticipantId::as_str).collect();
        assert_eq!(ids, ["X", "Y", "Z"]);
        assert_eq!(roster.position("Z"), Some(2));
        assert!(!roster.contains("W"));
    }

    #[rstest]
    #[case::half_up_positive(Money::new(1005, 1), RoundingMode::HalfUp, Money::from_i64(101))]
    #[case::half_up_negative(Money::new(-1005, 1), RoundingMode::HalfUp, Money::from_i64(-101))]
    #[case::half_even(Money::new(1005, 1), RoundingMode::HalfEven, Money::from_i64(100))]
    fn money_rounds_to_scale(
        #[case] input: Money,
        #[case] mode: RoundingMode,
        #[case] expected: Money,
    ) {
        assert_eq!(input.round_to(0, mode), expected);
    }

    #[test]
    fn share_holders_dedupes_and_falls_back_to_payer() {
        let expense = Expense::new(
            "X",
            Decimal::from(100),
            CurrencyCode::JPY,
            ConversionRate::ONE,
            ["X", "Y", "X"],
        );
        let holders: Vec<&str> = expense
            .share_holders()
            .into_iter()
            .map(ParticipantId::as_str)
            .collect();
        assert_eq!(holders, ["X", "Y"]);

        let lonely = Expense::new(
            "X",
            Decimal::from(100),
            CurrencyCode::JPY,
            ConversionRate::ONE,
            Vec::<&str>::new(),
        );
        let holders: Vec<&str> = lonely
            .share_holders()
            .into_iter()
            .map(ParticipantId::as_str)
            .collect();
        assert_eq!(holders, ["X"]);
    }

    #[test]
    fn apply_to_moves_money_from_debtor_to_creditor() {
        let balances = MemberBalances::from_iter([
            (ParticipantId::from("X"), Money::from_i64(200)),
            (ParticipantId::from("Y"), Money::from_i64(-100)),
            (ParticipantId::from("Z"), Money::from_i64(-100)),
        ]);
        let plan = SettlementPlan {
            transfers: vec![Transfer {
                from: "Y".into(),
                to: "X".into(),
                amount: Money::from_i64(100),
            }],
        };

        let remaining = plan.apply_to(&balances);

        assert_eq!(remaining.get("X"), Some(&Money::from_i64(100)));
        assert_eq!(remaining.get("Y"), Some(&Money::ZERO));
        assert_eq!(remaining.get("Z"), Some(&Money::from_i64(-100)));
        assert_eq!(plan.total(), Money::from_i64(100));
        assert_eq!(plan.paid_by("Y"), Money::from_i64(100));
    }
}
