use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors arising from TTM rate operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateError {
    #[error("no TTM rate available for {date} (or any earlier date)")]
    NotFound { date: NaiveDate },
    #[error("TTM rate must be positive, got {rate} for {date}")]
    InvalidRate { date: NaiveDate, rate: Decimal },
}

/// Policy for resolving a rate when the requested date has no entry.
///
/// Rates are published for business days only, so weekend and holiday
/// transactions need a deterministic fallback rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateFallback {
    /// Only an exact-date entry resolves; anything else is `NotFound`.
    Exact,
    /// Exact match, else the most recent earlier entry. This is the
    /// default: the last published TTM rate stays in effect until the
    /// next one appears. A date before the first entry is `NotFound` —
    /// a future rate is never applied retroactively.
    #[default]
    PriorDate,
}

/// Daily reference exchange rate table (JPY per USD).
///
/// Ordered by date so prior-date fallback is a range scan. Supplied by an
/// upstream rate-acquisition collaborator; the engine only reads it.
///
/// # Examples
///
/// ```
/// use fx_reconcile::core::rate_table::{RateFallback, RateTable};
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let mut table = RateTable::new();
/// table.insert(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), dec!(144.85)).unwrap();
///
/// // Saturday the 6th falls back to Friday's rate.
/// let sat = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
/// let rate = table.resolve(sat, RateFallback::PriorDate).unwrap();
/// assert_eq!(rate, dec!(144.85));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateTable {
    rates: BTreeMap<NaiveDate, Decimal>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the rate for a date.
    pub fn insert(&mut self, date: NaiveDate, rate: Decimal) -> Result<(), RateError> {
        if rate <= Decimal::ZERO {
            return Err(RateError::InvalidRate { date, rate });
        }
        self.rates.insert(date, rate);
        Ok(())
    }

    /// Resolve the rate in effect on `date` under the given fallback policy.
    ///
    /// Pure function of `(date, table)`: repeated calls always agree.
    pub fn resolve(&self, date: NaiveDate, fallback: RateFallback) -> Result<Decimal, RateError> {
        if let Some(rate) = self.rates.get(&date) {
            return Ok(*rate);
        }
        match fallback {
            RateFallback::Exact => Err(RateError::NotFound { date }),
            RateFallback::PriorDate => self
                .rates
                .range(..date)
                .next_back()
                .map(|(_, rate)| *rate)
                .ok_or(RateError::NotFound { date }),
        }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Earliest date with a published rate.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rates.keys().next().copied()
    }

    /// Latest date with a published rate.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rates.keys().next_back().copied()
    }

    /// All entries in date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Decimal)> + '_ {
        self.rates.iter().map(|(date, rate)| (*date, *rate))
    }
}

impl FromIterator<(NaiveDate, Decimal)> for RateTable {
    fn from_iter<T: IntoIterator<Item = (NaiveDate, Decimal)>>(iter: T) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}
