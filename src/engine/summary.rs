use crate::core::money::{round_jpy, round_usd};
use crate::engine::matcher::MatchResult;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Headline realized-profit figures derived from the match stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitSummary {
    /// Date of the last debit, if any debit exists.
    pub last_withdrawal_date: Option<NaiveDate>,
    pub last_withdrawal_usd: Decimal,
    pub last_withdrawal_jpy: Decimal,
    /// Profit realized strictly before the last withdrawal date.
    pub cumulative_profit_usd: Decimal,
    pub cumulative_profit_jpy: Decimal,
    /// All realized profit.
    pub total_profit_usd: Decimal,
    pub total_profit_jpy: Decimal,
}

impl ProfitSummary {
    /// Derive the profit summary from a lot-matching result.
    ///
    /// USD-denominated profit converts each match at its own disposal
    /// rate rather than one blended rate, so a statement spanning large
    /// rate moves is not distorted.
    pub fn from_match_result(result: &MatchResult) -> Self {
        let last_debit = result.transactions.iter().rev().find(|tx| tx.is_debit());
        let last_withdrawal_date = last_debit.map(|tx| tx.date);

        let mut cumulative_jpy = Decimal::ZERO;
        let mut cumulative_usd = Decimal::ZERO;
        let mut total_jpy = Decimal::ZERO;
        let mut total_usd = Decimal::ZERO;

        for m in &result.matches {
            let profit_usd = m.profit_jpy / m.disposal_rate;
            total_jpy += m.profit_jpy;
            total_usd += profit_usd;
            if matches!(last_withdrawal_date, Some(last) if m.debit_date < last) {
                cumulative_jpy += m.profit_jpy;
                cumulative_usd += profit_usd;
            }
        }

        Self {
            last_withdrawal_date,
            last_withdrawal_usd: last_debit.map(|tx| tx.amount_usd).unwrap_or(Decimal::ZERO),
            last_withdrawal_jpy: last_debit.map(|tx| tx.amount_jpy).unwrap_or(Decimal::ZERO),
            cumulative_profit_usd: round_usd(cumulative_usd),
            cumulative_profit_jpy: cumulative_jpy,
            total_profit_usd: round_usd(total_usd),
            total_profit_jpy: total_jpy,
        }
    }
}

impl std::fmt::Display for ProfitSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Profit Analysis ===")?;
        match self.last_withdrawal_date {
            Some(date) => writeln!(
                f,
                "Last Withdrawal:    {} ({} USD / {} JPY)",
                date, self.last_withdrawal_usd, self.last_withdrawal_jpy
            )?,
            None => writeln!(f, "Last Withdrawal:    (none)")?,
        }
        writeln!(
            f,
            "Profit Before Last: {} JPY ({} USD)",
            self.cumulative_profit_jpy, self.cumulative_profit_usd
        )?;
        writeln!(
            f,
            "Total Profit:       {} JPY ({} USD)",
            self.total_profit_jpy, self.total_profit_usd
        )
    }
}

/// Flat statement-level totals for reporting collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub transaction_count: usize,
    pub credit_count: usize,
    pub debit_count: usize,
    pub total_credit_usd: Decimal,
    pub total_credit_jpy: Decimal,
    pub total_debit_usd: Decimal,
    pub total_debit_jpy: Decimal,
    /// `total_credit_jpy / total_credit_usd`; 0 when nothing was credited.
    pub average_rate: f64,
    pub total_profit_jpy: Decimal,
}

impl ReportSummary {
    /// Fold statement-level totals from a lot-matching result.
    pub fn from_match_result(result: &MatchResult) -> Self {
        let mut summary = Self {
            transaction_count: result.transactions.len(),
            credit_count: 0,
            debit_count: 0,
            total_credit_usd: Decimal::ZERO,
            total_credit_jpy: Decimal::ZERO,
            total_debit_usd: Decimal::ZERO,
            total_debit_jpy: Decimal::ZERO,
            average_rate: 0.0,
            total_profit_jpy: round_jpy(result.total_profit_jpy()),
        };

        for tx in &result.transactions {
            if tx.is_credit() {
                summary.credit_count += 1;
                summary.total_credit_usd += tx.amount_usd;
                summary.total_credit_jpy += tx.amount_jpy;
            } else {
                summary.debit_count += 1;
                summary.total_debit_usd += tx.amount_usd;
                summary.total_debit_jpy += tx.amount_jpy;
            }
        }

        if summary.total_credit_usd > Decimal::ZERO {
            let avg = summary.total_credit_jpy / summary.total_credit_usd;
            summary.average_rate = avg.to_string().parse::<f64>().unwrap_or(0.0);
        }

        summary
    }
}

impl std::fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Summary ===")?;
        writeln!(
            f,
            "Transactions:  {} ({} credits, {} debits)",
            self.transaction_count, self.credit_count, self.debit_count
        )?;
        writeln!(
            f,
            "Credited:      {} USD / {} JPY",
            self.total_credit_usd, self.total_credit_jpy
        )?;
        writeln!(
            f,
            "Debited:       {} USD / {} JPY",
            self.total_debit_usd, self.total_debit_jpy
        )?;
        writeln!(f, "Average Rate:  {:.2}", self.average_rate)?;
        writeln!(f, "Total Profit:  {} JPY", self.total_profit_jpy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::{Transaction, TxKind};
    use crate::engine::matcher::LotMatcher;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn tx(date: NaiveDate, kind: TxKind, usd: Decimal, rate: Decimal, row: usize) -> Transaction {
        Transaction {
            date,
            vendor: "Acme".to_string(),
            kind,
            amount_usd: usd,
            rate,
            amount_jpy: crate::core::money::round_jpy(usd * rate),
            cumulative_profit_jpy: Decimal::ZERO,
            matches: Vec::new(),
            row,
        }
    }

    #[test]
    fn test_profit_summary_single_withdrawal() {
        let result = LotMatcher::match_lots(vec![
            tx(d(2024, 1, 5), TxKind::Credit, dec!(1000), dec!(110), 0),
            tx(d(2024, 2, 10), TxKind::Debit, dec!(1000), dec!(115), 1),
        ]);
        let summary = ProfitSummary::from_match_result(&result);

        assert_eq!(summary.last_withdrawal_date, Some(d(2024, 2, 10)));
        assert_eq!(summary.last_withdrawal_usd, dec!(1000));
        assert_eq!(summary.last_withdrawal_jpy, dec!(115000));
        assert_eq!(summary.total_profit_jpy, dec!(5000));
        // The only match funds the last withdrawal itself, so nothing
        // was realized strictly before it.
        assert_eq!(summary.cumulative_profit_jpy, dec!(0));
        // 5000 JPY at disposal rate 115.
        assert_eq!(summary.total_profit_usd, dec!(43.48));
    }

    #[test]
    fn test_profit_before_last_withdrawal() {
        let result = LotMatcher::match_lots(vec![
            tx(d(2024, 1, 5), TxKind::Credit, dec!(200), dec!(110), 0),
            tx(d(2024, 2, 10), TxKind::Debit, dec!(100), dec!(115), 1),
            tx(d(2024, 3, 15), TxKind::Debit, dec!(100), dec!(120), 2),
        ]);
        let summary = ProfitSummary::from_match_result(&result);

        assert_eq!(summary.last_withdrawal_date, Some(d(2024, 3, 15)));
        // 100*(115-110) = 500 before the last withdrawal; 1000 on it.
        assert_eq!(summary.cumulative_profit_jpy, dec!(500));
        assert_eq!(summary.total_profit_jpy, dec!(1500));
    }

    #[test]
    fn test_usd_profit_uses_per_match_disposal_rate() {
        let result = LotMatcher::match_lots(vec![
            tx(d(2024, 1, 5), TxKind::Credit, dec!(200), dec!(100), 0),
            tx(d(2024, 2, 10), TxKind::Debit, dec!(100), dec!(110), 1),
            tx(d(2024, 3, 15), TxKind::Debit, dec!(100), dec!(125), 2),
        ]);
        let summary = ProfitSummary::from_match_result(&result);

        // 1000/110 + 2500/125 = 9.0909... + 20 = 29.09
        assert_eq!(summary.total_profit_usd, dec!(29.09));
    }

    #[test]
    fn test_no_withdrawals() {
        let result = LotMatcher::match_lots(vec![tx(
            d(2024, 1, 5),
            TxKind::Credit,
            dec!(1000),
            dec!(110),
            0,
        )]);
        let summary = ProfitSummary::from_match_result(&result);

        assert_eq!(summary.last_withdrawal_date, None);
        assert_eq!(summary.last_withdrawal_usd, dec!(0));
        assert_eq!(summary.total_profit_jpy, dec!(0));
    }

    #[test]
    fn test_report_summary_totals() {
        let result = LotMatcher::match_lots(vec![
            tx(d(2024, 1, 5), TxKind::Credit, dec!(1000), dec!(110), 0),
            tx(d(2024, 1, 12), TxKind::Credit, dec!(500), dec!(112), 1),
            tx(d(2024, 2, 10), TxKind::Debit, dec!(600), dec!(115), 2),
        ]);
        let summary = ReportSummary::from_match_result(&result);

        assert_eq!(summary.transaction_count, 3);
        assert_eq!(summary.credit_count, 2);
        assert_eq!(summary.debit_count, 1);
        assert_eq!(summary.total_credit_usd, dec!(1500));
        assert_eq!(summary.total_credit_jpy, dec!(166000));
        assert_eq!(summary.total_debit_usd, dec!(600));
        // 600*(115-110) = 3000
        assert_eq!(summary.total_profit_jpy, dec!(3000));
    }

    #[test]
    fn test_average_rate_weighted_by_amount() {
        use approx::assert_relative_eq;

        let result = LotMatcher::match_lots(vec![
            tx(d(2024, 1, 5), TxKind::Credit, dec!(1000), dec!(110), 0),
            tx(d(2024, 1, 12), TxKind::Credit, dec!(500), dec!(112), 1),
        ]);
        let summary = ReportSummary::from_match_result(&result);

        // 166000 / 1500 — amount-weighted, not a plain mean of 110 and 112.
        assert_relative_eq!(summary.average_rate, 110.666, epsilon = 0.001);
    }

    #[test]
    fn test_average_rate_zero_without_credits() {
        let summary = ReportSummary::from_match_result(&MatchResult::default());
        assert_eq!(summary.average_rate, 0.0);
    }
}
