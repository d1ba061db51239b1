//! Aggregation of answer batches into display-ready counts.

pub mod aggregator;

pub use aggregator::*;
