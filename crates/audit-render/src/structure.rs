//! Display structure for a report.
//!
//! Pure mapping from [`ReportData`] to titled sections of string cells, with
//! every number already formatted. The markdown renderer and any other
//! presentation layer read this instead of re-deriving numbers.

use audit_core::formatting::{format_fixed, format_percent};
use audit_core::models::{
    BasicStats, DailyAverage, ReportData, SingleReport, StrategyEntry, TagEntry, WeeklyReport,
};
use audit_core::time_utils::date_label;
use serde::{Deserialize, Serialize};

/// Decimals for basic-stat ratios and per-strategy precision.
const RATE_DECIMALS: usize = 2;
/// Decimals for hit rates, tag shares and tag risk levels.
const FINE_DECIMALS: usize = 4;

// ── Model ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportView {
    pub title: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionBody {
    Table(Table),
    Note { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// ── Builders ──────────────────────────────────────────────────────────────────

/// Build the display structure for `data`.
pub fn build_view(data: &ReportData) -> ReportView {
    match data {
        ReportData::Single(report) => single_view(report),
        ReportData::Weekly(report) => weekly_view(report),
    }
}

fn single_view(report: &SingleReport) -> ReportView {
    let scope = report.date.as_deref().unwrap_or("all rows");
    let basic = &report.basic;
    let mut rows = Vec::new();
    for (label, value) in count_rows(basic) {
        rows.push(vec![label.to_string(), value.to_string()]);
    }
    for (label, numerator, denominator) in ratio_rows(basic) {
        rows.push(vec![label.to_string(), pct(numerator, denominator, RATE_DECIMALS)]);
    }

    ReportView {
        title: format!("Moderation Audit Report ({})", scope),
        sections: vec![
            Section {
                title: "Basic Stats".to_string(),
                body: SectionBody::Table(Table {
                    header: vec!["Metric".to_string(), "Value".to_string()],
                    rows,
                }),
            },
            strategy_section(&report.strategies, basic.total_rows),
            tag_section(&report.tags, report.total_tag_count, basic),
        ],
    }
}

fn weekly_view(report: &WeeklyReport) -> ReportView {
    let mut header = vec!["Metric".to_string()];
    header.extend(report.days.iter().map(|d| date_label(&d.date)));
    header.push("Total".to_string());
    header.push("Daily avg".to_string());

    let averages = average_counts(&report.average);
    let mut rows = Vec::new();
    for (i, (label, total)) in count_rows(&report.total).into_iter().enumerate() {
        let mut row = vec![label.to_string()];
        row.extend(report.days.iter().map(|d| count_rows(&d.basic)[i].1.to_string()));
        row.push(total.to_string());
        row.push(format_fixed(averages[i], RATE_DECIMALS));
        rows.push(row);
    }
    let average_rates = [
        report.average.recall_rate,
        report.average.precision,
        report.average.risk_level,
    ];
    for (i, (label, numerator, denominator)) in ratio_rows(&report.total).into_iter().enumerate() {
        let mut row = vec![label.to_string()];
        row.extend(report.days.iter().map(|d| {
            let (_, num, den) = ratio_rows(&d.basic)[i];
            pct(num, den, RATE_DECIMALS)
        }));
        row.push(pct(numerator, denominator, RATE_DECIMALS));
        row.push(format!("{}%", format_fixed(average_rates[i], RATE_DECIMALS)));
        rows.push(row);
    }

    let title = match (report.days.first(), report.days.last()) {
        (Some(first), Some(last)) if first.date != last.date => format!(
            "Moderation Audit Weekly Report ({} to {})",
            first.date, last.date
        ),
        (Some(only), _) => format!("Moderation Audit Weekly Report ({})", only.date),
        _ => "Moderation Audit Weekly Report".to_string(),
    };

    let mut sections = vec![
        Section {
            title: "Basic Stats".to_string(),
            body: SectionBody::Table(Table { header, rows }),
        },
        strategy_section(&report.strategies, report.total.total_rows),
        tag_section(&report.tags, report.total_tag_count, &report.total),
    ];
    if !report.dropped_dates.is_empty() {
        sections.push(Section {
            title: "Excluded Dates".to_string(),
            body: SectionBody::Note {
                text: format!(
                    "Low-volume dates left out of the rollup: {}",
                    report.dropped_dates.join(", ")
                ),
            },
        });
    }

    ReportView {
        title,
        sections,
    }
}

fn strategy_section(strategies: &[StrategyEntry], scope_total: u64) -> Section {
    let body = if strategies.is_empty() {
        SectionBody::Note {
            text: "No strategy hits.".to_string(),
        }
    } else {
        let rows = strategies
            .iter()
            .map(|s| {
                let st = &s.stats;
                vec![
                    s.name.clone(),
                    st.hit_count.to_string(),
                    pct(st.hit_count, scope_total, FINE_DECIMALS),
                    format!("{} ({})", st.human_review_count, st.pending_count),
                    st.violation_count.to_string(),
                    pct(st.violation_count, st.human_review_count, RATE_DECIMALS),
                ]
            })
            .collect();
        SectionBody::Table(Table {
            header: [
                "Strategy",
                "Hits",
                "Hit rate",
                "Human reviewed (pending)",
                "Violations",
                "Precision",
            ]
            .iter()
            .map(|h| h.to_string())
            .collect(),
            rows,
        })
    };
    Section {
        title: "Strategy Breakdown".to_string(),
        body,
    }
}

fn tag_section(tags: &[TagEntry], total_tag_count: u64, scope: &BasicStats) -> Section {
    let body = if tags.is_empty() {
        SectionBody::Note {
            text: "No violation tags.".to_string(),
        }
    } else {
        let mut risk_sum = 0.0;
        let mut rows: Vec<Vec<String>> = tags
            .iter()
            .map(|t| {
                let risk = format_percent(t.count as f64, scope.total_rows as f64, FINE_DECIMALS);
                // Sum the displayed values so the total matches the rows.
                risk_sum += risk.parse::<f64>().unwrap_or(0.0);
                vec![
                    t.name.clone(),
                    t.count.to_string(),
                    pct(t.count, scope.human_violation_count, FINE_DECIMALS),
                    format!("{}%", risk),
                ]
            })
            .collect();
        rows.push(vec![
            "Total".to_string(),
            total_tag_count.to_string(),
            "100.00%".to_string(),
            format!("{}%", format_fixed(risk_sum, FINE_DECIMALS)),
        ]);
        SectionBody::Table(Table {
            header: ["Tag", "Count", "Violation share", "Risk level"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            rows,
        })
    };
    Section {
        title: "Tag Distribution".to_string(),
        body,
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn pct(numerator: u64, denominator: u64, decimals: usize) -> String {
    format!(
        "{}%",
        format_percent(numerator as f64, denominator as f64, decimals)
    )
}

fn count_rows(stats: &BasicStats) -> [(&'static str, u64); 5] {
    [
        ("Total rows", stats.total_rows),
        ("Machine rejected", stats.machine_reject_count),
        ("Recalled", stats.recall_count),
        ("Human violations", stats.human_violation_count),
        ("Black samples", stats.black_sample_total),
    ]
}

fn ratio_rows(stats: &BasicStats) -> [(&'static str, u64, u64); 3] {
    [
        ("Recall rate", stats.recall_count, stats.total_rows),
        ("Precision", stats.human_violation_count, stats.recall_count),
        ("Risk level", stats.black_sample_total, stats.total_rows),
    ]
}

fn average_counts(average: &DailyAverage) -> [f64; 5] {
    [
        average.total_rows,
        average.machine_reject_count,
        average.recall_count,
        average.human_violation_count,
        average.black_sample_total,
    ]
}

// ── Tests ─────────────────────────────────────────────────────────────────────
