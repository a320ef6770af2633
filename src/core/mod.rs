//! Foundational value types: money rounding, the TTM rate table,
//! and raw/normalized transaction records.

pub mod money;
pub mod rate_table;
pub mod transaction;
