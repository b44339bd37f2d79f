//! Analysis layer for the moderation audit report.
//!
//! Loads audit rows, classifies them, aggregates per partition, rolls days
//! up into a weekly view and runs the top-level report pipeline.

pub mod aggregator;
pub mod analysis;
pub mod classifier;
pub mod reader;
pub mod rollup;

pub use audit_core as core;
