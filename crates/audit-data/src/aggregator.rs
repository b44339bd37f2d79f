//! Per-partition aggregation of classified rows.
//!
//! A partition is any row subset the caller chose: one day, or the whole
//! input. The result is a [`BasicStats`] record plus strategy and tag tallies.

use std::collections::HashMap;

use audit_core::config::ReportConfig;
use audit_core::models::{
    BasicStats, HumanStatus, Row, RowSignals, StrategyEntry, StrategyStats, TagEntry,
    TOP_TAG_LIMIT,
};

use crate::classifier::classify;

// ── OrderedTally ──────────────────────────────────────────────────────────────

/// Map from name to value that remembers first-insertion order.
///
/// Stable sorts over [`OrderedTally::iter`] break ties by that order.
#[derive(Debug, Clone)]
pub struct OrderedTally<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for OrderedTally<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V: Default> OrderedTally<V> {
    /// Mutable value for `key`, inserting `V::default()` at the end if absent.
    pub fn entry_mut(&mut self, key: &str) -> &mut V {
        let pos = match self.index.get(key) {
            Some(&pos) => pos,
            None => {
                self.entries.push((key.to_string(), V::default()));
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }
}

impl<V> OrderedTally<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// ── PartitionStats ────────────────────────────────────────────────────────────

/// Everything aggregated over one partition.
#[derive(Debug, Clone, Default)]
pub struct PartitionStats {
    pub basic: BasicStats,
    pub strategies: OrderedTally<StrategyStats>,
    pub tags: OrderedTally<u64>,
}

impl PartitionStats {
    /// Add another partition's strategy and tag tallies to this one.
    ///
    /// `basic` is left alone; rollups keep their own totals.
    pub fn merge_tallies(&mut self, other: &PartitionStats) {
        for (name, stats) in other.strategies.iter() {
            self.strategies.entry_mut(name).merge(stats);
        }
        for (name, count) in other.tags.iter() {
            *self.tags.entry_mut(name) += count;
        }
    }

    /// Strategies ordered by descending hit count, ties in insertion order.
    pub fn ranked_strategies(&self) -> Vec<StrategyEntry> {
        let mut ranked: Vec<StrategyEntry> = self
            .strategies
            .iter()
            .map(|(name, stats)| StrategyEntry {
                name: name.to_string(),
                stats: *stats,
            })
            .collect();
        ranked.sort_by(|a, b| b.stats.hit_count.cmp(&a.stats.hit_count));
        ranked
    }

    /// The [`TOP_TAG_LIMIT`] most frequent tags (ties in insertion order)
    /// and the sum of their counts.
    pub fn ranked_tags(&self) -> (Vec<TagEntry>, u64) {
        let mut ranked: Vec<TagEntry> = self
            .tags
            .iter()
            .map(|(name, count)| TagEntry {
                name: name.to_string(),
                count: *count,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(TOP_TAG_LIMIT);
        let total = ranked.iter().map(|t| t.count).sum();
        (ranked, total)
    }
}

// ── PartitionAggregator ───────────────────────────────────────────────────────

/// Stateless helper that folds rows into [`PartitionStats`].
pub struct PartitionAggregator;

impl PartitionAggregator {
    /// Classify and accumulate every row of one partition.
    pub fn aggregate<'a>(
        rows: impl IntoIterator<Item = &'a Row>,
        config: &ReportConfig,
    ) -> PartitionStats {
        let mut stats = PartitionStats::default();
        let mut total_rows = 0u64;
        let mut machine_reject_count = 0u64;
        let mut recall_count = 0u64;
        let mut human_violation_count = 0u64;

        for row in rows {
            let signals = classify(row, config);
            total_rows += 1;
            if signals.machine_rejected {
                machine_reject_count += 1;
            }
            if signals.human_status.is_human_sent() {
                recall_count += 1;
            }
            if signals.human_status == HumanStatus::Violation {
                human_violation_count += 1;
            }
            Self::add_signals(&mut stats, &signals);
        }

        stats.basic = BasicStats::from_counts(
            total_rows,
            machine_reject_count,
            recall_count,
            human_violation_count,
            config.black_sample_formula,
        );
        stats
    }

    /// Accumulate one row's strategies and tags.
    fn add_signals(stats: &mut PartitionStats, signals: &RowSignals) {
        let sent = signals.human_status.is_human_sent();
        for name in &signals.strategies {
            let entry = stats.strategies.entry_mut(name);
            entry.hit_count += 1;
            if sent {
                entry.human_review_count += 1;
            }
            match signals.human_status {
                HumanStatus::Pending => entry.pending_count += 1,
                HumanStatus::Violation => entry.violation_count += 1,
                HumanStatus::None | HumanStatus::OtherSent => {}
            }
        }
        for tag in &signals.tags {
            *stats.tags.entry_mut(tag) += 1;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
