//! Random statement generation for testing and benchmarks.
//!
//! Produces a plausible USD transaction history plus a matching daily
//! rate table, so the pipeline can be exercised at arbitrary scale.

use crate::core::rate_table::RateTable;
use crate::core::transaction::{RawTransaction, Statement};
use chrono::{Duration, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;

/// Configuration for generating a random statement.
#[derive(Debug, Clone)]
pub struct StatementConfig {
    /// Number of rows to generate.
    pub row_count: usize,
    /// Number of distinct vendors to draw from.
    pub vendor_count: usize,
    /// Fraction of rows that are debits (0.0–1.0).
    pub debit_ratio: f64,
    /// First possible transaction date.
    pub start_date: NaiveDate,
    /// Number of days the statement spans.
    pub day_span: i64,
    /// Minimum row amount in USD.
    pub min_amount: Decimal,
    /// Maximum row amount in USD.
    pub max_amount: Decimal,
}

impl Default for StatementConfig {
    fn default() -> Self {
        Self {
            row_count: 100,
            vendor_count: 8,
            debit_ratio: 0.3,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
            day_span: 365,
            min_amount: Decimal::from(10),
            max_amount: Decimal::from(10_000),
        }
    }
}

/// Generate a random statement and a rate table covering its date span.
///
/// The rate table holds one entry per day (a gapless table, so prior-date
/// fallback is never needed here); rates follow a bounded random walk
/// around a typical USD/JPY level.
pub fn generate_random_statement(config: &StatementConfig) -> (Statement, RateTable) {
    let mut rng = rand::thread_rng();

    let mut rates = RateTable::new();
    let mut level: f64 = rng.gen_range(100.0..160.0);
    for offset in 0..=config.day_span {
        let date = config.start_date + Duration::days(offset);
        level = (level + rng.gen_range(-0.8..0.8)).clamp(80.0, 200.0);
        let rate = Decimal::from_f64_retain(level)
            .unwrap_or(Decimal::from(100))
            .round_dp(2);
        rates.insert(date, rate).expect("walk stays positive");
    }

    let vendors: Vec<String> = (0..config.vendor_count.max(1))
        .map(|i| format!("VENDOR-{:03}", i))
        .collect();

    let min_f64: f64 = config.min_amount.to_string().parse().unwrap_or(10.0);
    let max_f64: f64 = config.max_amount.to_string().parse().unwrap_or(10_000.0);

    let mut statement = Statement::new();
    for _ in 0..config.row_count {
        let date = config.start_date + Duration::days(rng.gen_range(0..=config.day_span));
        let amount_f64 = rng.gen_range(min_f64..max_f64);
        let amount = Decimal::from_f64_retain(amount_f64)
            .unwrap_or(Decimal::from(100))
            .round_dp(2);
        let vendor = vendors[rng.gen_range(0..vendors.len())].clone();

        let row = if rng.gen_bool(config.debit_ratio) {
            RawTransaction::debit(date.to_string(), vendor, amount)
        } else {
            RawTransaction::credit(date.to_string(), vendor, amount)
        };
        statement.add(row);
    }

    (statement, rates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::report::{convert_statement, EngineOptions};

    #[test]
    fn test_generated_statement_has_requested_rows() {
        let config = StatementConfig {
            row_count: 50,
            ..Default::default()
        };
        let (statement, rates) = generate_random_statement(&config);
        assert_eq!(statement.len(), 50);
        assert_eq!(rates.len() as i64, config.day_span + 1);
    }

    #[test]
    fn test_generated_statement_converts() {
        let config = StatementConfig {
            row_count: 200,
            ..Default::default()
        };
        let (statement, rates) = generate_random_statement(&config);
        let report = convert_statement(&statement, &rates, &EngineOptions::default()).unwrap();

        // Every generated date has a rate, so nothing is rejected.
        assert!(report.rejected.is_empty());
        assert_eq!(report.transactions.len(), 200);
    }
}
