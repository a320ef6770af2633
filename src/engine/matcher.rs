use crate::core::money::round_jpy;
use crate::core::transaction::Transaction;
use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// An unconsumed (or partially consumed) slice of a credit transaction.
///
/// Lots have no identity beyond their balance and acquisition rate; the
/// matcher holds them in a plain position-indexed queue. Lifecycle:
/// open → partially consumed → exhausted (removed). Never backward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FxLot {
    /// Input row of the credit that created this lot.
    pub origin_row: usize,
    /// Date the USD was acquired.
    pub acquired_on: NaiveDate,
    /// USD not yet consumed by a debit.
    pub remaining_usd: Decimal,
    /// TTM rate on the acquisition date.
    pub acquisition_rate: Decimal,
}

/// One consumption step: a debit drawing down a (possibly partial) lot.
///
/// `profit_jpy` is the realized gain or loss on the matched slice,
/// rounded to whole yen per match so reported rows always sum exactly
/// to the cumulative figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeMatch {
    pub credit_date: NaiveDate,
    pub debit_date: NaiveDate,
    pub matched_usd: Decimal,
    pub acquisition_rate: Decimal,
    pub disposal_rate: Decimal,
    /// `matched_usd * (disposal_rate - acquisition_rate)`, whole yen.
    pub profit_jpy: Decimal,
}

/// A debit asked for more USD than all prior credits supplied.
///
/// The unmatched residue is treated as acquired at the debit's own rate
/// (zero gain) so report generation continues; the caller decides whether
/// to surface this to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortfallWarning {
    /// Input row of the offending debit.
    pub row: usize,
    pub debit_date: NaiveDate,
    /// Full USD amount the debit requested.
    pub requested_usd: Decimal,
    /// Portion no lot could fund.
    pub shortfall_usd: Decimal,
}

/// Output of lot matching: the annotated transactions in processing
/// order, the flat match list, and any shortfall warnings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchResult {
    /// Chronologically ordered (input order breaks ties). Debits carry
    /// their funding matches; every transaction carries the running
    /// profit total.
    pub transactions: Vec<Transaction>,
    /// Every match emitted, in processing order.
    pub matches: Vec<ExchangeMatch>,
    pub warnings: Vec<ShortfallWarning>,
}

impl MatchResult {
    /// Total realized profit across all matches, whole yen.
    pub fn total_profit_jpy(&self) -> Decimal {
        self.matches.iter().map(|m| m.profit_jpy).sum()
    }

    /// Total USD consumed from lots (including zero-gain shortfall residue).
    pub fn total_matched_usd(&self) -> Decimal {
        self.matches.iter().map(|m| m.matched_usd).sum()
    }
}

/// FIFO lot matcher.
///
/// Pairs inbound USD with the outbound events that consume it, oldest
/// acquisition first, and computes the realized JPY gain/loss on each
/// pairing. Strictly sequential: the queue state after each transaction
/// depends on every transaction before it.
pub struct LotMatcher;

impl LotMatcher {
    /// Run FIFO matching over normalized transactions.
    ///
    /// Transactions are processed in chronological order; same-day
    /// transactions keep their input order (stable sort on date). A
    /// credit pushes a new lot; a debit consumes from the queue front,
    /// emitting one [`ExchangeMatch`] per lot touched.
    pub fn match_lots(mut transactions: Vec<Transaction>) -> MatchResult {
        transactions.sort_by_key(|tx| tx.date);

        let mut queue: VecDeque<FxLot> = VecDeque::new();
        let mut matches = Vec::new();
        let mut warnings = Vec::new();
        let mut running_profit = Decimal::ZERO;

        for tx in &mut transactions {
            if tx.is_credit() {
                queue.push_back(FxLot {
                    origin_row: tx.row,
                    acquired_on: tx.date,
                    remaining_usd: tx.amount_usd,
                    acquisition_rate: tx.rate,
                });
            } else {
                let funded = Self::consume(&mut queue, tx, &mut warnings);
                for m in &funded {
                    running_profit += m.profit_jpy;
                }
                matches.extend(funded.iter().cloned());
                tx.matches = funded;
            }
            tx.cumulative_profit_jpy = running_profit;
        }

        MatchResult {
            transactions,
            matches,
            warnings,
        }
    }

    /// Draw `debit.amount_usd` from the front of the queue, emitting one
    /// match per lot consumed. A partially consumed lot stays at the
    /// front with its balance reduced.
    fn consume(
        queue: &mut VecDeque<FxLot>,
        debit: &Transaction,
        warnings: &mut Vec<ShortfallWarning>,
    ) -> Vec<ExchangeMatch> {
        let mut outstanding = debit.amount_usd;
        let mut funded = Vec::new();

        while outstanding > Decimal::ZERO {
            let Some(lot) = queue.front_mut() else {
                // Withdrawal exceeds everything ever credited: match the
                // residue at the debit's own rate (zero gain) and warn.
                warn!(
                    "debit row {} on {}: shortfall of {} USD (requested {})",
                    debit.row, debit.date, outstanding, debit.amount_usd
                );
                warnings.push(ShortfallWarning {
                    row: debit.row,
                    debit_date: debit.date,
                    requested_usd: debit.amount_usd,
                    shortfall_usd: outstanding,
                });
                funded.push(ExchangeMatch {
                    credit_date: debit.date,
                    debit_date: debit.date,
                    matched_usd: outstanding,
                    acquisition_rate: debit.rate,
                    disposal_rate: debit.rate,
                    profit_jpy: Decimal::ZERO,
                });
                break;
            };

            let take = outstanding.min(lot.remaining_usd);
            funded.push(ExchangeMatch {
                credit_date: lot.acquired_on,
                debit_date: debit.date,
                matched_usd: take,
                acquisition_rate: lot.acquisition_rate,
                disposal_rate: debit.rate,
                profit_jpy: round_jpy(take * (debit.rate - lot.acquisition_rate)),
            });

            lot.remaining_usd -= take;
            outstanding -= take;
            if lot.remaining_usd == Decimal::ZERO {
                queue.pop_front();
            }
        }

        funded
    }
}
