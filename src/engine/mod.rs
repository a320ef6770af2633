//! The conversion pipeline, leaves first: normalizer → FIFO lot matcher
//! → aggregator / summarizer → report.

pub mod aggregate;
pub mod matcher;
pub mod normalizer;
pub mod report;
pub mod summary;
