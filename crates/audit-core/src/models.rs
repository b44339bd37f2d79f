use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::BlackSampleFormula;
use crate::formatting::ratio_percent;

/// One audit record: column name → raw cell text.
pub type Row = HashMap<String, String>;

/// Number of tags kept in the tag distribution.
pub const TOP_TAG_LIMIT: usize = 35;

/// Outcome of the human-review step for a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HumanStatus {
    /// Never sent to human review.
    #[default]
    None,
    /// Sent to human review, decision still outstanding.
    Pending,
    /// Reviewed and rejected.
    Violation,
    /// Sent to human review with any other outcome (e.g. passed).
    OtherSent,
}

impl HumanStatus {
    /// Whether the row was recalled into human review at all.
    pub fn is_human_sent(self) -> bool {
        self != HumanStatus::None
    }
}

/// Normalized signals derived from one [`Row`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSignals {
    pub machine_rejected: bool,
    pub human_status: HumanStatus,
    /// Canonical strategy names in source order; duplicates are kept.
    pub strategies: Vec<String>,
    /// Canonical tag names, unique within the row, in first-seen order.
    /// Empty unless `human_status` is [`HumanStatus::Violation`].
    pub tags: Vec<String>,
}

/// Counters for one strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyStats {
    /// Rows on which the strategy fired.
    pub hit_count: u64,
    /// Of those, rows sent to human review.
    pub human_review_count: u64,
    /// Of those, rows still awaiting a decision.
    pub pending_count: u64,
    /// Of those, rows decided as violations.
    pub violation_count: u64,
}

impl StrategyStats {
    /// Field-wise sum, used when merging days.
    pub fn merge(&mut self, other: &StrategyStats) {
        self.hit_count += other.hit_count;
        self.human_review_count += other.human_review_count;
        self.pending_count += other.pending_count;
        self.violation_count += other.violation_count;
    }
}

/// A named strategy row of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyEntry {
    pub name: String,
    #[serde(flatten)]
    pub stats: StrategyStats,
}

/// A named tag row of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    pub name: String,
    /// Distinct violation rows carrying this tag.
    pub count: u64,
}

/// Per-partition summary counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicStats {
    pub total_rows: u64,
    pub machine_reject_count: u64,
    /// Rows sent to any human review.
    pub recall_count: u64,
    pub human_violation_count: u64,
    pub black_sample_total: u64,
}

impl BasicStats {
    /// Build from raw counters, deriving `black_sample_total` with `formula`.
    pub fn from_counts(
        total_rows: u64,
        machine_reject_count: u64,
        recall_count: u64,
        human_violation_count: u64,
        formula: BlackSampleFormula,
    ) -> Self {
        let black_sample_total = match formula {
            BlackSampleFormula::MachineRejectPlusViolation => {
                machine_reject_count + human_violation_count
            }
            BlackSampleFormula::RecallPlusViolation => recall_count + human_violation_count,
        };
        Self {
            total_rows,
            machine_reject_count,
            recall_count,
            human_violation_count,
            black_sample_total,
        }
    }

    /// Field-wise sum of all five counters.
    pub fn add(&mut self, other: &BasicStats) {
        self.total_rows += other.total_rows;
        self.machine_reject_count += other.machine_reject_count;
        self.recall_count += other.recall_count;
        self.human_violation_count += other.human_violation_count;
        self.black_sample_total += other.black_sample_total;
    }

    /// `recall_count / total_rows` as an unrounded percentage.
    pub fn recall_rate(&self) -> f64 {
        ratio_percent(self.recall_count as f64, self.total_rows as f64)
    }

    /// `human_violation_count / recall_count` as an unrounded percentage.
    pub fn precision(&self) -> f64 {
        ratio_percent(self.human_violation_count as f64, self.recall_count as f64)
    }

    /// `black_sample_total / total_rows` as an unrounded percentage.
    pub fn risk_level(&self) -> f64 {
        ratio_percent(self.black_sample_total as f64, self.total_rows as f64)
    }
}

/// Simple per-day means across the retained days of a weekly rollup.
///
/// Rates are means of the daily percentages, so every day weighs the same
/// regardless of its volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyAverage {
    pub total_rows: f64,
    pub machine_reject_count: f64,
    pub recall_count: f64,
    pub human_violation_count: f64,
    pub black_sample_total: f64,
    pub recall_rate: f64,
    pub precision: f64,
    pub risk_level: f64,
}

/// Stats for one retained day of a weekly rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    /// Canonical `YYYY-MM-DD` key.
    pub date: String,
    pub basic: BasicStats,
}

/// Report over a single partition (one day, or every row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleReport {
    /// Date key of the day covered; `None` when every row is covered.
    pub date: Option<String>,
    pub basic: BasicStats,
    pub strategies: Vec<StrategyEntry>,
    pub tags: Vec<TagEntry>,
    /// Sum of the counts in `tags` (after truncation).
    pub total_tag_count: u64,
}

/// Report rolled up across every retained day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReport {
    /// Retained days in ascending order.
    pub days: Vec<DailyStats>,
    pub total: BasicStats,
    pub average: DailyAverage,
    pub strategies: Vec<StrategyEntry>,
    pub tags: Vec<TagEntry>,
    pub total_tag_count: u64,
    /// Days removed by the low-volume filter.
    pub dropped_dates: Vec<String>,
}

impl WeeklyReport {
    /// Date keys of the retained days.
    pub fn dates(&self) -> Vec<&str> {
        self.days.iter().map(|d| d.date.as_str()).collect()
    }
}

/// Render-ready report content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReportData {
    Single(SingleReport),
    Weekly(WeeklyReport),
}

/// Which rows a report covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Partition {
    /// Every dated row, rolled up day by day.
    Weekly,
    /// Rows whose date key equals the given `YYYY-MM-DD` key.
    Day(String),
    /// Every row as one partition, dated or not.
    AllRows,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
