//! Shared building blocks for the moderation audit report.
//!
//! Holds the report data model, the error type, numeric formatting rules,
//! date-key extraction and the configuration layers (CLI and JSON file).

pub mod config;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
