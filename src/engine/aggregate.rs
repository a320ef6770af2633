use crate::core::transaction::Transaction;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Year-month key for monthly aggregation.
///
/// Serializes as `YYYY-MM`, the form reporting collaborators expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = MonthKey;
            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a \"YYYY-MM\" month key")
            }
            fn visit_str<E: de::Error>(self, value: &str) -> Result<MonthKey, E> {
                let (year, month) = value
                    .split_once('-')
                    .ok_or_else(|| E::custom(format!("invalid month key: {value}")))?;
                let year = year.parse().map_err(E::custom)?;
                let month: u32 = month.parse().map_err(E::custom)?;
                if !(1..=12).contains(&month) {
                    return Err(E::custom(format!("month out of range: {value}")));
                }
                Ok(MonthKey { year, month })
            }
        }
        deserializer.deserialize_str(V)
    }
}

/// Per-counterparty totals within one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorTotals {
    pub vendor: String,
    pub credit_usd: Decimal,
    pub credit_jpy: Decimal,
    pub debit_usd: Decimal,
    pub debit_jpy: Decimal,
    pub count: usize,
}

impl VendorTotals {
    fn new(vendor: &str) -> Self {
        Self {
            vendor: vendor.to_string(),
            credit_usd: Decimal::ZERO,
            credit_jpy: Decimal::ZERO,
            debit_usd: Decimal::ZERO,
            debit_jpy: Decimal::ZERO,
            count: 0,
        }
    }
}

/// Totals for one calendar month, with a per-vendor breakdown.
///
/// Vendors appear in first-seen order within the month, which makes
/// report layout deterministic for a given input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub month: MonthKey,
    pub total_credit_usd: Decimal,
    pub total_credit_jpy: Decimal,
    pub total_debit_usd: Decimal,
    pub total_debit_jpy: Decimal,
    pub transaction_count: usize,
    pub vendors: Vec<VendorTotals>,
}

impl MonthlyAggregate {
    fn new(month: MonthKey) -> Self {
        Self {
            month,
            total_credit_usd: Decimal::ZERO,
            total_credit_jpy: Decimal::ZERO,
            total_debit_usd: Decimal::ZERO,
            total_debit_jpy: Decimal::ZERO,
            transaction_count: 0,
            vendors: Vec::new(),
        }
    }

    fn apply(&mut self, tx: &Transaction) {
        if tx.is_credit() {
            self.total_credit_usd += tx.amount_usd;
            self.total_credit_jpy += tx.amount_jpy;
        } else {
            self.total_debit_usd += tx.amount_usd;
            self.total_debit_jpy += tx.amount_jpy;
        }
        self.transaction_count += 1;

        let idx = match self.vendors.iter().position(|v| v.vendor == tx.vendor) {
            Some(idx) => idx,
            None => {
                self.vendors.push(VendorTotals::new(&tx.vendor));
                self.vendors.len() - 1
            }
        };
        let entry = &mut self.vendors[idx];
        if tx.is_credit() {
            entry.credit_usd += tx.amount_usd;
            entry.credit_jpy += tx.amount_jpy;
        } else {
            entry.debit_usd += tx.amount_usd;
            entry.debit_jpy += tx.amount_jpy;
        }
        entry.count += 1;
    }
}

/// Fold annotated transactions into sparse monthly aggregates,
/// chronologically ascending. Months without transactions are absent.
pub fn monthly_aggregates(transactions: &[Transaction]) -> Vec<MonthlyAggregate> {
    let mut months: BTreeMap<MonthKey, MonthlyAggregate> = BTreeMap::new();

    for tx in transactions {
        months
            .entry(tx.month())
            .or_insert_with(|| MonthlyAggregate::new(tx.month()))
            .apply(tx);
    }

    months.into_values().collect()
}
