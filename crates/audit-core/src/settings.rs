use clap::Parser;
use std::path::PathBuf;

use crate::error::{AuditError, Result};
use crate::models::Partition;
use crate::time_utils::extract_date_key;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Statistical report over moderation audit records
#[derive(Parser, Debug, Clone)]
#[command(
    name = "audit-report",
    about = "Statistical report over moderation audit records",
    version
)]
pub struct Settings {
    /// Input files or directories (.json arrays or .jsonl, one row per record)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Report a single day instead of the weekly rollup (any date-like form)
    #[arg(long, conflicts_with = "all_rows")]
    pub date: Option<String>,

    /// Report every row as one partition, ignoring dates
    #[arg(long)]
    pub all_rows: bool,

    /// Print the dates found in the input and exit
    #[arg(long)]
    pub list_dates: bool,

    /// Output format
    #[arg(long, default_value = "markdown", value_parser = ["markdown", "json"])]
    pub format: String,

    /// Write the report to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Report config file (defaults to ~/.audit-report/config.json)
    #[arg(long, env = "AUDIT_REPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Refuse inputs with more rows than this
    #[arg(long, default_value = "1000000")]
    pub max_rows: usize,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and resolve derived values.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn load_from_args(args: Vec<std::ffi::OsString>) -> Self {
        Self::resolve(Settings::parse_from(args))
    }

    /// `--debug` overrides the log level.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Partition selected on the command line.
    ///
    /// `--date` accepts any form the date extractor understands and is
    /// normalized to `YYYY-MM-DD`.
    pub fn partition(&self) -> Result<Partition> {
        if self.all_rows {
            return Ok(Partition::AllRows);
        }
        match &self.date {
            None => Ok(Partition::Weekly),
            Some(raw) => extract_date_key(raw)
                .map(Partition::Day)
                .ok_or_else(|| AuditError::Config(format!("unrecognised date: {}", raw))),
        }
    }

    /// Whether the JSON report structure was requested instead of markdown.
    pub fn wants_json(&self) -> bool {
        self.format == "json"
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["audit-report", "rows.jsonl"]);

        assert_eq!(settings.inputs, vec![PathBuf::from("rows.jsonl")]);
        assert!(settings.date.is_none());
        assert!(!settings.all_rows);
        assert!(!settings.list_dates);
        assert_eq!(settings.format, "markdown");
        assert!(settings.output.is_none());
        assert_eq!(settings.max_rows, 1_000_000);
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_requires_input() {
        assert!(Settings::try_parse_from(["audit-report"]).is_err());
    }

    #[test]
    fn test_settings_rejects_unknown_format() {
        assert!(Settings::try_parse_from(["audit-report", "a.json", "--format", "html"]).is_err());
    }

    #[test]
    fn test_settings_date_conflicts_with_all_rows() {
        let parsed = Settings::try_parse_from([
            "audit-report",
            "a.json",
            "--date",
            "2024-03-01",
            "--all-rows",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_load_debug_overrides_log_level() {
        let settings = Settings::load_from_args(vec![
            "audit-report".into(),
            "a.json".into(),
            "--debug".into(),
        ]);
        assert_eq!(settings.log_level, "DEBUG");
    }

    // ── partition ─────────────────────────────────────────────────────────────

    #[test]
    fn test_partition_defaults_to_weekly() {
        let settings = Settings::parse_from(["audit-report", "a.json"]);
        assert_eq!(settings.partition().unwrap(), Partition::Weekly);
    }

    #[test]
    fn test_partition_normalizes_date() {
        let settings = Settings::parse_from(["audit-report", "a.json", "--date", "2024/3/1"]);
        assert_eq!(
            settings.partition().unwrap(),
            Partition::Day("2024-03-01".to_string())
        );
    }

    #[test]
    fn test_partition_all_rows() {
        let settings = Settings::parse_from(["audit-report", "a.json", "--all-rows"]);
        assert_eq!(settings.partition().unwrap(), Partition::AllRows);
    }

    #[test]
    fn test_partition_bad_date_is_config_error() {
        let settings = Settings::parse_from(["audit-report", "a.json", "--date", "monday"]);
        assert!(matches!(
            settings.partition().unwrap_err(),
            AuditError::Config(_)
        ));
    }

    #[test]
    fn test_wants_json() {
        let settings = Settings::parse_from(["audit-report", "a.json", "--format", "json"]);
        assert!(settings.wants_json());
    }
}
