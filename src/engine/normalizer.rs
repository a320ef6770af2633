use crate::core::money::{round_jpy, round_usd};
use crate::core::rate_table::{RateFallback, RateTable};
use crate::core::transaction::{RawTransaction, Statement, Transaction, TxKind};
use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a raw row was excluded from the normalized stream.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    #[error("unparseable date '{input}'")]
    UnparseableDate { input: String },
    #[error("negative amount")]
    NegativeAmount,
    #[error("both credit and debit amounts present")]
    BothAmountsPresent,
    #[error("no TTM rate resolvable for {date}")]
    RateUnavailable { date: NaiveDate },
}

/// A rejected input row: excluded from the output, reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRejection {
    /// Zero-based index of the row in the input statement.
    pub row: usize,
    pub reason: RejectReason,
}

/// Output of normalization: the surviving transactions in input order,
/// plus the rows that failed validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedBatch {
    pub transactions: Vec<Transaction>,
    pub rejected: Vec<RowRejection>,
}

/// Validate and rate-annotate a raw statement.
///
/// The contract is skip-and-collect: an invalid row is excluded and
/// reported in `rejected`, and processing continues — a single bad line
/// never discards the statement. Rows with both amounts zero are dropped
/// without a rejection (empty filler lines are common in exports).
///
/// Output order is input order; each transaction remembers its source row.
pub fn normalize(
    statement: &Statement,
    rates: &RateTable,
    fallback: RateFallback,
) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for (row, raw) in statement.rows().iter().enumerate() {
        match normalize_row(raw, row, rates, fallback) {
            Ok(Some(tx)) => batch.transactions.push(tx),
            Ok(None) => debug!("row {}: both amounts zero, dropped", row),
            Err(reason) => {
                warn!("row {} rejected: {}", row, reason);
                batch.rejected.push(RowRejection { row, reason });
            }
        }
    }

    batch
}

fn normalize_row(
    raw: &RawTransaction,
    row: usize,
    rates: &RateTable,
    fallback: RateFallback,
) -> Result<Option<Transaction>, RejectReason> {
    if raw.credit_usd < Decimal::ZERO || raw.debit_usd < Decimal::ZERO {
        return Err(RejectReason::NegativeAmount);
    }

    let (kind, amount_usd) = match (
        raw.credit_usd > Decimal::ZERO,
        raw.debit_usd > Decimal::ZERO,
    ) {
        (true, true) => return Err(RejectReason::BothAmountsPresent),
        (true, false) => (TxKind::Credit, raw.credit_usd),
        (false, true) => (TxKind::Debit, raw.debit_usd),
        (false, false) => return Ok(None),
    };

    let date = parse_date(&raw.date).ok_or_else(|| RejectReason::UnparseableDate {
        input: raw.date.clone(),
    })?;

    let rate = rates
        .resolve(date, fallback)
        .map_err(|_| RejectReason::RateUnavailable { date })?;

    let amount_usd = round_usd(amount_usd);

    Ok(Some(Transaction {
        date,
        vendor: clean_vendor(&raw.vendor),
        kind,
        amount_usd,
        rate,
        amount_jpy: round_jpy(amount_usd * rate),
        cumulative_profit_jpy: Decimal::ZERO,
        matches: Vec::new(),
        row,
    }))
}

/// Parse a statement date. ISO `YYYY-MM-DD` is tried first, then the
/// `MM-DD-YYYY` form used by US-style bank exports.
fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%m-%d-%Y"))
        .ok()
}

/// Normalize a counterparty label. Statement descriptions of the form
/// `Payment from <vendor>` collapse to the vendor name; a blank label
/// becomes `Unknown`.
fn clean_vendor(vendor: &str) -> String {
    let vendor = vendor.trim();
    let vendor = vendor.strip_prefix("Payment from ").unwrap_or(vendor).trim();
    if vendor.is_empty() {
        "Unknown".to_string()
    } else {
        vendor.to_string()
    }
}
