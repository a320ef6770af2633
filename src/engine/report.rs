use crate::core::rate_table::{RateFallback, RateTable};
use crate::core::transaction::{Statement, Transaction};
use crate::engine::aggregate::{monthly_aggregates, MonthlyAggregate};
use crate::engine::matcher::{ExchangeMatch, LotMatcher, ShortfallWarning};
use crate::engine::normalizer::{normalize, RowRejection};
use crate::engine::summary::{ProfitSummary, ReportSummary};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a whole conversion run.
///
/// Per-row problems never land here — they are collected into
/// [`RowRejection`] and [`ShortfallWarning`] lists on the report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no valid transactions after normalization ({rejected} rows rejected)")]
    EmptyInput { rejected: usize },
    #[error("statement has {count} rows, exceeding the limit of {limit}")]
    TooManyRows { count: usize, limit: usize },
}

/// Tunable policies for a conversion run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Rate-resolution fallback for dates without a published rate.
    pub fallback: RateFallback,
    /// Upper bound on input rows. The matcher's lot queue grows with
    /// input size, so pathologically large files are refused up front.
    pub max_rows: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fallback: RateFallback::default(),
            max_rows: 100_000,
        }
    }
}

/// The full output of the conversion pipeline, ready for reporting or
/// export collaborators. Serializes to plain JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Annotated transactions in processing order; debits embed their
    /// funding matches.
    pub transactions: Vec<Transaction>,
    pub monthly: Vec<MonthlyAggregate>,
    pub profit_analysis: ProfitSummary,
    pub summary: ReportSummary,
    /// Input rows excluded by validation.
    pub rejected: Vec<RowRejection>,
    /// Debits that exceeded the available lots.
    pub warnings: Vec<ShortfallWarning>,
}

impl ConversionReport {
    /// Flat list of every exchange match across all debits.
    pub fn all_matches(&self) -> Vec<&ExchangeMatch> {
        self.transactions.iter().flat_map(|tx| &tx.matches).collect()
    }
}

/// Run the conversion pipeline: normalize → match lots → aggregate →
/// summarize.
///
/// The statement and rate table come from upstream collaborators; the
/// result is a pure function of both plus `options`.
///
/// # Errors
///
/// - [`EngineError::TooManyRows`] if the statement exceeds
///   `options.max_rows`.
/// - [`EngineError::EmptyInput`] if no row survives normalization.
///
/// # Examples
///
/// ```
/// use fx_reconcile::prelude::*;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let mut rates = RateTable::new();
/// rates.insert(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), dec!(110)).unwrap();
/// rates.insert(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(), dec!(115)).unwrap();
///
/// let mut statement = Statement::new();
/// statement.add(RawTransaction::credit("2024-01-05", "Acme", dec!(1000)));
/// statement.add(RawTransaction::debit("2024-02-10", "", dec!(1000)));
///
/// let report = convert_statement(&statement, &rates, &EngineOptions::default()).unwrap();
/// assert_eq!(report.profit_analysis.total_profit_jpy, dec!(5000));
/// ```
pub fn convert_statement(
    statement: &Statement,
    rates: &RateTable,
    options: &EngineOptions,
) -> Result<ConversionReport, EngineError> {
    if statement.len() > options.max_rows {
        return Err(EngineError::TooManyRows {
            count: statement.len(),
            limit: options.max_rows,
        });
    }

    let batch = normalize(statement, rates, options.fallback);
    if batch.transactions.is_empty() {
        return Err(EngineError::EmptyInput {
            rejected: batch.rejected.len(),
        });
    }

    let result = LotMatcher::match_lots(batch.transactions);
    let monthly = monthly_aggregates(&result.transactions);
    let profit_analysis = ProfitSummary::from_match_result(&result);
    let summary = ReportSummary::from_match_result(&result);

    info!(
        "converted {} transactions across {} months, {} rejected, {} shortfalls, profit {} JPY",
        summary.transaction_count,
        monthly.len(),
        batch.rejected.len(),
        result.warnings.len(),
        summary.total_profit_jpy
    );

    Ok(ConversionReport {
        transactions: result.transactions,
        monthly,
        profit_analysis,
        summary,
        rejected: batch.rejected,
        warnings: result.warnings,
    })
}

impl std::fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Transactions ===")?;
        for tx in &self.transactions {
            writeln!(
                f,
                "{}  {:<6} {:>12} USD @ {:>8} = {:>12} JPY  [{}]  cum. profit {}",
                tx.date, tx.kind, tx.amount_usd, tx.rate, tx.amount_jpy, tx.vendor,
                tx.cumulative_profit_jpy
            )?;
        }

        for month in &self.monthly {
            writeln!(f, "\n--- {} ---", month.month)?;
            writeln!(
                f,
                "  Credit: {} USD / {} JPY",
                month.total_credit_usd, month.total_credit_jpy
            )?;
            writeln!(
                f,
                "  Debit:  {} USD / {} JPY",
                month.total_debit_usd, month.total_debit_jpy
            )?;
            for vendor in &month.vendors {
                writeln!(
                    f,
                    "  {:<20} {} USD / {} JPY ({} txs)",
                    vendor.vendor,
                    vendor.credit_usd + vendor.debit_usd,
                    vendor.credit_jpy + vendor.debit_jpy,
                    vendor.count
                )?;
            }
        }

        writeln!(f)?;
        write!(f, "{}", self.profit_analysis)?;
        writeln!(f)?;
        write!(f, "{}", self.summary)?;

        if !self.rejected.is_empty() {
            writeln!(f, "\n=== Rejected Rows ===")?;
            for rejection in &self.rejected {
                writeln!(f, "  row {}: {}", rejection.row, rejection.reason)?;
            }
        }
        if !self.warnings.is_empty() {
            writeln!(f, "\n=== Warnings ===")?;
            for w in &self.warnings {
                writeln!(
                    f,
                    "  row {}: debit of {} USD on {} exceeded available lots by {}",
                    w.row, w.requested_usd, w.debit_date, w.shortfall_usd
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::RawTransaction;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_rates() -> RateTable {
        let mut rates = RateTable::new();
        rates.insert(d(2024, 1, 5), dec!(110)).unwrap();
        rates.insert(d(2024, 2, 10), dec!(115)).unwrap();
        rates
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let mut statement = Statement::new();
        statement.add(RawTransaction::credit("2024-01-05", "Acme", dec!(1000)));
        statement.add(RawTransaction::debit("2024-02-10", "", dec!(1000)));

        let report =
            convert_statement(&statement, &sample_rates(), &EngineOptions::default()).unwrap();

        assert_eq!(report.transactions.len(), 2);
        assert_eq!(report.monthly.len(), 2);
        assert_eq!(report.profit_analysis.total_profit_jpy, dec!(5000));
        assert_eq!(report.summary.total_profit_jpy, dec!(5000));
        assert!(report.rejected.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_statement_is_fatal() {
        let statement = Statement::new();
        let result = convert_statement(&statement, &sample_rates(), &EngineOptions::default());
        assert_eq!(result.unwrap_err(), EngineError::EmptyInput { rejected: 0 });
    }

    #[test]
    fn test_all_rows_rejected_is_fatal() {
        let mut statement = Statement::new();
        statement.add(RawTransaction::credit("not a date", "Acme", dec!(100)));

        let result = convert_statement(&statement, &sample_rates(), &EngineOptions::default());
        assert_eq!(result.unwrap_err(), EngineError::EmptyInput { rejected: 1 });
    }

    #[test]
    fn test_row_limit_enforced() {
        let statement: Statement = (0..5)
            .map(|_| RawTransaction::credit("2024-01-05", "Acme", dec!(1)))
            .collect();
        let options = EngineOptions {
            max_rows: 3,
            ..Default::default()
        };

        let result = convert_statement(&statement, &sample_rates(), &options);
        assert_eq!(result.unwrap_err(), EngineError::TooManyRows { count: 5, limit: 3 });
    }

    #[test]
    fn test_bad_rows_reported_not_fatal() {
        let mut statement = Statement::new();
        statement.add(RawTransaction::credit("2024-01-05", "Acme", dec!(1000)));
        statement.add(RawTransaction::credit("garbage", "Acme", dec!(50)));

        let report =
            convert_statement(&statement, &sample_rates(), &EngineOptions::default()).unwrap();
        assert_eq!(report.transactions.len(), 1);
        assert_eq!(report.rejected.len(), 1);
    }

    #[test]
    fn test_report_json_round_trip() {
        let mut statement = Statement::new();
        statement.add(RawTransaction::credit("2024-01-05", "Acme", dec!(1000)));
        statement.add(RawTransaction::debit("2024-02-10", "", dec!(1500)));

        let report =
            convert_statement(&statement, &sample_rates(), &EngineOptions::default()).unwrap();
        let json = serde_json::to_string_pretty(&report).unwrap();
        let back: ConversionReport = serde_json::from_str(&json).unwrap();

        assert_eq!(back.transactions.len(), report.transactions.len());
        assert_eq!(back.summary, report.summary);
        assert_eq!(back.warnings, report.warnings);
    }

    #[test]
    fn test_all_matches_flattened() {
        let mut statement = Statement::new();
        statement.add(RawTransaction::credit("2024-01-05", "Acme", dec!(100)));
        statement.add(RawTransaction::credit("2024-01-05", "Globex", dec!(50)));
        statement.add(RawTransaction::debit("2024-02-10", "", dec!(120)));

        let report =
            convert_statement(&statement, &sample_rates(), &EngineOptions::default()).unwrap();
        assert_eq!(report.all_matches().len(), 2);
    }
}
