//! Weekly rollup: per-day aggregation combined into totals and day means.
//!
//! Rows are grouped by their date key, low-volume stray days are dropped, and
//! each remaining day is aggregated on its own before being summed.

use std::collections::BTreeMap;

use audit_core::config::{NoiseFilter, ReportConfig};
use audit_core::models::{BasicStats, DailyAverage, DailyStats, Row, WeeklyReport};
use tracing::{debug, warn};

use crate::aggregator::{PartitionAggregator, PartitionStats};
use crate::classifier::row_date;

/// Group rows by date key, ascending. Undated rows are left out.
pub fn group_by_date<'a>(rows: &'a [Row], config: &ReportConfig) -> BTreeMap<String, Vec<&'a Row>> {
    let mut days: BTreeMap<String, Vec<&Row>> = BTreeMap::new();
    for row in rows {
        if let Some(key) = row_date(row, config) {
            days.entry(key).or_default().push(row);
        }
    }
    days
}

/// Split dates into `(retained, dropped)` by the low-volume filter.
///
/// `volumes` must be in ascending date order; both outputs keep that order.
/// With a single date, or when the busiest day is not above
/// `filter.min_volume`, every date is retained.
pub fn filter_noise_dates(
    volumes: &[(String, u64)],
    filter: &NoiseFilter,
) -> (Vec<String>, Vec<String>) {
    let all = || volumes.iter().map(|(d, _)| d.clone()).collect::<Vec<_>>();
    if volumes.len() <= 1 {
        return (all(), Vec::new());
    }
    let max_volume = volumes.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let Some(threshold) = filter.threshold(max_volume) else {
        return (all(), Vec::new());
    };

    let mut retained = Vec::new();
    let mut dropped = Vec::new();
    for (date, count) in volumes {
        if (*count as f64) <= threshold {
            dropped.push(date.clone());
        } else {
            retained.push(date.clone());
        }
    }
    (retained, dropped)
}

/// Running sums across retained days.
#[derive(Debug, Default)]
struct RollupSums {
    total: BasicStats,
    recall_rate: f64,
    precision: f64,
    risk_level: f64,
}

impl RollupSums {
    fn add_day(&mut self, basic: &BasicStats) {
        self.total.add(basic);
        self.recall_rate += basic.recall_rate();
        self.precision += basic.precision();
        self.risk_level += basic.risk_level();
    }

    /// Simple means over `days` (at least 1).
    fn average(&self, days: usize) -> DailyAverage {
        let n = days.max(1) as f64;
        DailyAverage {
            total_rows: self.total.total_rows as f64 / n,
            machine_reject_count: self.total.machine_reject_count as f64 / n,
            recall_count: self.total.recall_count as f64 / n,
            human_violation_count: self.total.human_violation_count as f64 / n,
            black_sample_total: self.total.black_sample_total as f64 / n,
            recall_rate: self.recall_rate / n,
            precision: self.precision / n,
            risk_level: self.risk_level / n,
        }
    }
}

/// Stateless helper that builds a [`WeeklyReport`] from raw rows.
pub struct WeeklyRollup;

impl WeeklyRollup {
    /// Roll every dated row up day by day.
    ///
    /// Returns `None` when no date survives (no rows, no parsable dates).
    pub fn build(rows: &[Row], config: &ReportConfig) -> Option<WeeklyReport> {
        let days = group_by_date(rows, config);
        if days.is_empty() {
            debug!("Weekly rollup: no dated rows among {}", rows.len());
            return None;
        }

        let volumes: Vec<(String, u64)> = days
            .iter()
            .map(|(date, day_rows)| (date.clone(), day_rows.len() as u64))
            .collect();
        let (retained, dropped_dates) = filter_noise_dates(&volumes, &config.noise_filter);
        for date in &dropped_dates {
            warn!(
                "Dropping low-volume date {} ({} rows) from weekly rollup",
                date,
                days.get(date).map(Vec::len).unwrap_or(0)
            );
        }
        if retained.is_empty() {
            return None;
        }

        let mut sums = RollupSums::default();
        let mut merged = PartitionStats::default();
        let mut daily = Vec::with_capacity(retained.len());

        for date in &retained {
            let day_rows = days.get(date).map(Vec::as_slice).unwrap_or(&[]);
            let stats = PartitionAggregator::aggregate(day_rows.iter().copied(), config);
            debug!(
                "Day {}: {} rows, {} recalled, {} violations",
                date,
                stats.basic.total_rows,
                stats.basic.recall_count,
                stats.basic.human_violation_count
            );
            sums.add_day(&stats.basic);
            merged.merge_tallies(&stats);
            daily.push(DailyStats {
                date: date.clone(),
                basic: stats.basic,
            });
        }

        let average = sums.average(daily.len());
        let strategies = merged.ranked_strategies();
        let (tags, total_tag_count) = merged.ranked_tags();

        Some(WeeklyReport {
            days: daily,
            total: sums.total,
            average,
            strategies,
            tags,
            total_tag_count,
            dropped_dates,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use audit_core::config::ColumnNames;

    fn test_config() -> ReportConfig {
        ReportConfig {
            columns: ColumnNames {
                date: vec!["date".to_string()],
                sync_machine_status: "sync_status".to_string(),
                async_machine_status: "async_status".to_string(),
                human_status: "human_status".to_string(),
                sync_strategies: "strategies".to_string(),
                async_strategies: "async_strategies".to_string(),
                human_tags: "tags".to_string(),
            },
            ..Default::default()
        }
    }

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn rows_on(date: &str, n: usize, extra: &[(&str, &str)]) -> Vec<Row> {
        (0..n)
            .map(|_| {
                let mut r = row(extra);
                r.insert("date".to_string(), date.to_string());
                r
            })
            .collect()
    }

    fn volumes(counts: &[u64]) -> Vec<(String, u64)> {
        counts
            .iter()
            .enumerate()
            .map(|(i, n)| (format!("2024-03-0{}", i + 1), *n))
            .collect()
    }

    // ── filter_noise_dates ────────────────────────────────────────────────────

    #[test]
    fn test_noise_filter_boundary_drops_tiny_days() {
        let (retained, dropped) =
            filter_noise_dates(&volumes(&[1, 1, 150]), &NoiseFilter::default());
        assert_eq!(retained, vec!["2024-03-03"]);
        assert_eq!(dropped, vec!["2024-03-01", "2024-03-02"]);
    }

    #[test]
    fn test_noise_filter_threshold_is_inclusive() {
        let (retained, dropped) =
            filter_noise_dates(&volumes(&[5, 6, 150]), &NoiseFilter::default());
        assert_eq!(retained, vec!["2024-03-02", "2024-03-03"]);
        assert_eq!(dropped, vec!["2024-03-01"]);
    }

    #[test]
    fn test_noise_filter_skipped_for_small_datasets() {
        let (retained, dropped) =
            filter_noise_dates(&volumes(&[1, 2, 100]), &NoiseFilter::default());
        assert_eq!(retained.len(), 3);
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_noise_filter_skipped_for_single_date() {
        let (retained, dropped) = filter_noise_dates(&volumes(&[1000]), &NoiseFilter::default());
        assert_eq!(retained, vec!["2024-03-01"]);
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_noise_filter_ratio_dominates_large_days() {
        // threshold = max(5, 4000 * 0.005) = 20
        let (retained, _) =
            filter_noise_dates(&volumes(&[20, 21, 4000]), &NoiseFilter::default());
        assert_eq!(retained, vec!["2024-03-02", "2024-03-03"]);
    }

    // ── group_by_date ─────────────────────────────────────────────────────────

    #[test]
    fn test_group_by_date_skips_undated_rows() {
        let mut rows = rows_on("2024/3/2", 2, &[]);
        rows.extend(rows_on("2024-03-01 09:00", 1, &[]));
        rows.push(row(&[("date", "unknown")]));
        rows.push(Row::new());

        let days = group_by_date(&rows, &test_config());
        let keys: Vec<&String> = days.keys().collect();
        assert_eq!(keys, vec!["2024-03-01", "2024-03-02"]);
        assert_eq!(days["2024-03-02"].len(), 2);
    }

    // ── build ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_build_none_without_dates() {
        let rows = vec![row(&[("date", "n/a")]), row(&[("human_status", "拒绝")])];
        assert!(WeeklyRollup::build(&rows, &test_config()).is_none());
        assert!(WeeklyRollup::build(&[], &test_config()).is_none());
    }

    #[test]
    fn test_build_totals_and_day_weighted_averages() {
        // Day 1: 2 rows, 2 recalled (100%), 1 violation.
        let mut rows = rows_on("2024-03-01", 1, &[("human_status", "拒绝")]);
        rows.extend(rows_on("2024-03-01", 1, &[("human_status", "通过")]));
        // Day 2: 8 rows, 2 recalled (25%), 0 violations, 2 machine rejects.
        rows.extend(rows_on(
            "2024-03-02",
            2,
            &[("human_status", "待审"), ("sync_status", "拒绝")],
        ));
        rows.extend(rows_on("2024-03-02", 6, &[]));

        let report = WeeklyRollup::build(&rows, &test_config()).unwrap();

        assert_eq!(report.dates(), vec!["2024-03-01", "2024-03-02"]);
        assert_eq!(report.total.total_rows, 10);
        assert_eq!(report.total.recall_count, 4);
        assert_eq!(report.total.human_violation_count, 1);
        assert_eq!(report.total.machine_reject_count, 2);
        assert_eq!(report.total.black_sample_total, 3);

        let daily_black: u64 = report.days.iter().map(|d| d.basic.black_sample_total).sum();
        assert_eq!(report.total.black_sample_total, daily_black);

        assert!((report.average.total_rows - 5.0).abs() < 1e-9);
        // Mean of 100% and 25%, not 4/10.
        assert!((report.average.recall_rate - 62.5).abs() < 1e-9);
        // Mean of 50% and 0%.
        assert!((report.average.precision - 25.0).abs() < 1e-9);
        // Mean of 50% and 25%.
        assert!((report.average.risk_level - 37.5).abs() < 1e-9);
        assert!((report.total.recall_rate() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_merges_tallies_across_days() {
        let extra = [("human_status", "拒绝"), ("strategies", "s1"), ("tags", "t1&&t1")];
        let mut rows = rows_on("2024-03-01", 1, &extra);
        rows.extend(rows_on("2024-03-02", 2, &extra));
        rows.extend(rows_on("2024-03-02", 1, &[("strategies", "s2&&s2&&s2&&s2")]));

        let report = WeeklyRollup::build(&rows, &test_config()).unwrap();

        assert_eq!(report.strategies[0].name, "s2");
        assert_eq!(report.strategies[0].stats.hit_count, 4);
        assert_eq!(report.strategies[1].name, "s1");
        assert_eq!(report.strategies[1].stats.hit_count, 3);
        assert_eq!(report.strategies[1].stats.violation_count, 3);
        assert_eq!(report.tags.len(), 1);
        assert_eq!(report.tags[0].count, 3);
        assert_eq!(report.total_tag_count, 3);
    }

    #[test]
    fn test_build_excludes_dropped_days_from_everything() {
        let mut rows = rows_on("2024-03-01", 1, &[("strategies", "stray")]);
        rows.extend(rows_on("2024-03-02", 150, &[("strategies", "main")]));

        let report = WeeklyRollup::build(&rows, &test_config()).unwrap();

        assert_eq!(report.dates(), vec!["2024-03-02"]);
        assert_eq!(report.dropped_dates, vec!["2024-03-01"]);
        assert_eq!(report.total.total_rows, 150);
        assert!(report.strategies.iter().all(|s| s.name != "stray"));
        assert!((report.average.total_rows - 150.0).abs() < 1e-9);
    }
}
