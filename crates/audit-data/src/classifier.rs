//! Row classification: raw audit cells → [`RowSignals`].
//!
//! Every lookup tolerates missing columns; an absent cell reads as empty.

use std::collections::HashSet;
use std::sync::OnceLock;

use audit_core::config::ReportConfig;
use audit_core::models::{HumanStatus, Row, RowSignals};
use audit_core::time_utils::extract_date_key;
use regex::Regex;

/// Status literal for a rejected item (machine or human).
pub const REJECT_LITERAL: &str = "拒绝";

/// Human-review status literal for an undecided item.
pub const PENDING_LITERAL: &str = "待审";

/// Delimiter between strategies in the hit-strategy columns.
const STRATEGY_DELIMITER: &str = "&&";

/// Tag tokens that are review boilerplate rather than labels.
const TAG_STOP_WORDS: &[&str] = &[
    "通过",
    "拒绝",
    "待审",
    "送审",
    "null",
    "无",
    "内容涉及",
    "请修改后重试",
];

fn tag_delimiters() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"&&|\$\$|\+|,|，|\s+").expect("regex is valid"))
}

/// Trimmed cell value, or `""` when the column is absent.
fn cell<'a>(row: &'a Row, column: &str) -> &'a str {
    row.get(column).map(|v| v.trim()).unwrap_or("")
}

/// Derive the normalized signals for one row.
pub fn classify(row: &Row, config: &ReportConfig) -> RowSignals {
    let columns = &config.columns;

    let machine_rejected = cell(row, &columns.sync_machine_status) == REJECT_LITERAL
        || cell(row, &columns.async_machine_status) == REJECT_LITERAL;

    let human_status = parse_human_status(cell(row, &columns.human_status));

    let mut raw_strategies = cell(row, &columns.sync_strategies);
    if raw_strategies.is_empty() {
        raw_strategies = cell(row, &columns.async_strategies);
    }
    let strategies = split_strategies(raw_strategies, config);

    let tags = if human_status == HumanStatus::Violation {
        split_tags(cell(row, &columns.human_tags), config)
    } else {
        Vec::new()
    };

    RowSignals {
        machine_rejected,
        human_status,
        strategies,
        tags,
    }
}

/// Map a trimmed human-review status cell to a [`HumanStatus`].
pub fn parse_human_status(value: &str) -> HumanStatus {
    match value {
        "" => HumanStatus::None,
        REJECT_LITERAL => HumanStatus::Violation,
        PENDING_LITERAL => HumanStatus::Pending,
        _ => HumanStatus::OtherSent,
    }
}

/// Split a hit-strategy cell into display names, keeping order and repeats.
pub fn split_strategies(raw: &str, config: &ReportConfig) -> Vec<String> {
    raw.split(STRATEGY_DELIMITER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| config.strategy_name(token).to_string())
        .collect()
}

/// Split a human-tag cell into canonical tags, unique within the row.
pub fn split_tags(raw: &str, config: &ReportConfig) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut tags = Vec::new();
    for token in tag_delimiters().split(raw) {
        let token = token.trim();
        if token.is_empty() || TAG_STOP_WORDS.contains(&token) {
            continue;
        }
        let canonical = config.merged_tag(token);
        if seen.insert(canonical) {
            tags.push(canonical.to_string());
        }
    }
    tags
}

/// Date key of a row, from the first configured date column that has one.
pub fn row_date(row: &Row, config: &ReportConfig) -> Option<String> {
    config
        .columns
        .date
        .iter()
        .find_map(|column| extract_date_key(cell(row, column)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
