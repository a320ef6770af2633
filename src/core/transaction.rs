use crate::engine::matcher::ExchangeMatch;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw statement row as supplied by the upstream file parser.
///
/// The date stays textual at this boundary: source statements arrive in
/// more than one date format and an unparseable date is a per-row
/// validation failure, not a reason to refuse the whole file. The
/// normalizer owns parsing and classification.
///
/// Exactly one of `credit_usd` / `debit_usd` is expected to be non-zero.
/// Rows with both zero are dropped; rows with both non-zero are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Transaction date, `YYYY-MM-DD` or `MM-DD-YYYY`.
    pub date: String,
    /// Counterparty label or free-text description.
    pub vendor: String,
    /// USD received. Must be >= 0.
    #[serde(default)]
    pub credit_usd: Decimal,
    /// USD withdrawn or converted. Must be >= 0.
    #[serde(default)]
    pub debit_usd: Decimal,
}

impl RawTransaction {
    /// Convenience constructor for an inbound (credit) row.
    pub fn credit(date: impl Into<String>, vendor: impl Into<String>, amount: Decimal) -> Self {
        Self {
            date: date.into(),
            vendor: vendor.into(),
            credit_usd: amount,
            debit_usd: Decimal::ZERO,
        }
    }

    /// Convenience constructor for an outbound (debit) row.
    pub fn debit(date: impl Into<String>, vendor: impl Into<String>, amount: Decimal) -> Self {
        Self {
            date: date.into(),
            vendor: vendor.into(),
            credit_usd: Decimal::ZERO,
            debit_usd: amount,
        }
    }
}

/// An ordered statement of raw rows submitted to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statement {
    rows: Vec<RawTransaction>,
}

impl Statement {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add(&mut self, row: RawTransaction) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[RawTransaction] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Gross USD credited across all rows, before validation.
    pub fn gross_credit_usd(&self) -> Decimal {
        self.rows.iter().map(|r| r.credit_usd).sum()
    }

    /// Gross USD debited across all rows, before validation.
    pub fn gross_debit_usd(&self) -> Decimal {
        self.rows.iter().map(|r| r.debit_usd).sum()
    }
}

impl FromIterator<RawTransaction> for Statement {
    fn from_iter<T: IntoIterator<Item = RawTransaction>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Direction of a normalized transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    /// USD received into the account.
    Credit,
    /// USD withdrawn from the account or converted to JPY.
    Debit,
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxKind::Credit => write!(f, "credit"),
            TxKind::Debit => write!(f, "debit"),
        }
    }
}

/// A validated, rate-annotated transaction.
///
/// Produced by the normalizer; the matcher later fills in
/// `cumulative_profit_jpy` and, for debits, the `matches` that funded the
/// withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub vendor: String,
    pub kind: TxKind,
    /// Positive USD amount, rounded to cents.
    pub amount_usd: Decimal,
    /// The TTM rate applied (JPY per USD).
    pub rate: Decimal,
    /// `amount_usd * rate`, rounded to whole yen.
    pub amount_jpy: Decimal,
    /// Running total of realized FX profit up to and including this
    /// transaction, in processing order. Whole yen.
    pub cumulative_profit_jpy: Decimal,
    /// For debits: the lot matches that funded this withdrawal.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<ExchangeMatch>,
    /// Zero-based index of the source row in the input statement.
    pub row: usize,
}

impl Transaction {
    pub fn is_credit(&self) -> bool {
        self.kind == TxKind::Credit
    }

    pub fn is_debit(&self) -> bool {
        self.kind == TxKind::Debit
    }

    /// Year-month key of the transaction date.
    pub fn month(&self) -> crate::engine::aggregate::MonthKey {
        crate::engine::aggregate::MonthKey::from_date(self.date)
    }
}
