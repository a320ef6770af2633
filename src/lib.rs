//! # fx-reconcile
//!
//! USD→JPY conversion and realized FX gain/loss reconciliation engine.
//!
//! Given a USD-denominated transaction history and a table of daily TTM
//! reference rates, this engine converts every cash flow to JPY and
//! computes the FX gain or loss realized by holding USD between the day
//! it was received and the day it was withdrawn, using FIFO lot
//! accounting.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: money rounding, rate table, transactions
//! - **engine** — Pipeline stages: normalizer, FIFO lot matcher, monthly
//!   aggregator, profit summarizer, report driver
//! - **generator** — Random statement generation for tests and benchmarks

pub mod core;
pub mod engine;
pub mod generator;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::rate_table::{RateError, RateFallback, RateTable};
    pub use crate::core::transaction::{RawTransaction, Statement, Transaction, TxKind};
    pub use crate::engine::matcher::{ExchangeMatch, LotMatcher, MatchResult, ShortfallWarning};
    pub use crate::engine::report::{convert_statement, ConversionReport, EngineError, EngineOptions};
    pub use crate::engine::summary::{ProfitSummary, ReportSummary};
}
