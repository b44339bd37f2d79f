//! Top-level report pipeline.
//!
//! Takes an immutable [`ReportRequest`], picks the partition, aggregates, and
//! renders. Nothing is cached between calls; the same request always yields
//! the same data and byte-identical markdown.

use std::collections::BTreeSet;

use audit_core::config::ReportConfig;
use audit_core::models::{Partition, ReportData, Row, SingleReport};
use audit_render::{build_view, render_markdown, ReportView};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::aggregator::{PartitionAggregator, PartitionStats};
use crate::classifier::row_date;
use crate::rollup::WeeklyRollup;

// ── Public types ──────────────────────────────────────────────────────────────

/// Everything one report run needs.
#[derive(Debug, Clone)]
pub struct ReportRequest<'a> {
    pub rows: &'a [Row],
    pub partition: Partition,
    pub config: &'a ReportConfig,
}

/// Metadata produced alongside a report. Not part of the markdown.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// RFC 3339 timestamp when this report was generated.
    pub generated_at: String,
    /// Rows handed to the pipeline.
    pub rows_processed: usize,
    /// Rows whose date columns held no recognisable date.
    pub undated_rows: usize,
    /// Number of partitions aggregated (retained days in weekly mode).
    pub partitions_aggregated: usize,
}

/// A generated report in every output shape.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub data: ReportData,
    pub view: ReportView,
    #[serde(skip)]
    pub markdown: String,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Distinct date keys present in `rows`, ascending.
pub fn available_dates(rows: &[Row], config: &ReportConfig) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row_date(row, config))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Aggregate the requested partition.
///
/// Returns `None` when nothing is left to report: no rows, a day that matches
/// no row, or a weekly rollup with no retained date.
pub fn build_report_data(request: &ReportRequest<'_>) -> Option<ReportData> {
    let ReportRequest {
        rows,
        partition,
        config,
    } = request;

    if rows.is_empty() {
        info!("No rows to report on");
        return None;
    }

    match partition {
        Partition::Weekly => {
            let report = WeeklyRollup::build(rows, config);
            if report.is_none() {
                info!("No retained dates among {} rows", rows.len());
            }
            report.map(ReportData::Weekly)
        }
        Partition::Day(key) => {
            let day_rows: Vec<&Row> = rows
                .iter()
                .filter(|row| row_date(row, config).as_deref() == Some(key.as_str()))
                .collect();
            if day_rows.is_empty() {
                info!("No rows dated {}", key);
                return None;
            }
            let stats = PartitionAggregator::aggregate(day_rows, config);
            Some(ReportData::Single(single_report(Some(key.as_str()), &stats)))
        }
        Partition::AllRows => {
            let stats = PartitionAggregator::aggregate(rows.iter(), config);
            Some(ReportData::Single(single_report(None, &stats)))
        }
    }
}

/// Run the full pipeline: aggregate, build the display structure, render.
pub fn generate_report(request: &ReportRequest<'_>) -> Option<Report> {
    let data = build_report_data(request)?;
    let view = build_view(&data);
    let markdown = render_markdown(&view);

    let partitions_aggregated = match &data {
        ReportData::Single(_) => 1,
        ReportData::Weekly(weekly) => weekly.days.len(),
    };
    let undated_rows = request
        .rows
        .iter()
        .filter(|row| row_date(row, request.config).is_none())
        .count();

    info!(
        "Report ready: {} rows, {} partitions",
        request.rows.len(),
        partitions_aggregated
    );

    Some(Report {
        metadata: ReportMetadata {
            generated_at: Utc::now().to_rfc3339(),
            rows_processed: request.rows.len(),
            undated_rows,
            partitions_aggregated,
        },
        data,
        view,
        markdown,
    })
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn single_report(date: Option<&str>, stats: &PartitionStats) -> SingleReport {
    let (tags, total_tag_count) = stats.ranked_tags();
    SingleReport {
        date: date.map(str::to_string),
        basic: stats.basic,
        strategies: stats.ranked_strategies(),
        tags,
        total_tag_count,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
