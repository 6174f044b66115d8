//! Aggregation, ranking and classification.
//!
//! This module turns clean rows into the ordered tables the reports are made
//! of: group-by-sum over key tuples, stable top-N per partition, percentages
//! of a total and the size-to-gender buckets.

pub mod aggregate;
pub mod analyzer;
pub mod classify;
pub mod rank;
pub mod types;
pub mod utility;
