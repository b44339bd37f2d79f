//! Operator-supplied report configuration.
//!
//! Column names, the strategy display-name table and the tag merge table live
//! in a JSON file so coverage can be extended without a rebuild. Every field
//! has a default, so a partial file is valid.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AuditError, Result};

// ── ColumnNames ───────────────────────────────────────────────────────────────

/// Input column names the classifier reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Candidate timestamp columns, tried in order until one yields a date.
    pub date: Vec<String>,
    pub sync_machine_status: String,
    pub async_machine_status: String,
    pub human_status: String,
    pub sync_strategies: String,
    pub async_strategies: String,
    pub human_tags: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: vec![
                "送审时间".to_string(),
                "创建时间".to_string(),
                "时间".to_string(),
            ],
            sync_machine_status: "同步机审状态".to_string(),
            async_machine_status: "异步机审状态".to_string(),
            human_status: "人审状态".to_string(),
            sync_strategies: "同步命中策略".to_string(),
            async_strategies: "异步命中策略".to_string(),
            human_tags: "人审标签".to_string(),
        }
    }
}

// ── BlackSampleFormula ────────────────────────────────────────────────────────

/// How `black_sample_total` is derived from the other counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlackSampleFormula {
    /// `machine_reject_count + human_violation_count`.
    #[default]
    MachineRejectPlusViolation,
    /// `recall_count + human_violation_count`.
    RecallPlusViolation,
}

// ── NoiseFilter ───────────────────────────────────────────────────────────────

/// Parameters of the low-volume day filter used by the weekly rollup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseFilter {
    /// The filter only runs when the busiest day has more rows than this.
    pub min_volume: u64,
    /// Lower bound of the drop threshold.
    pub floor: f64,
    /// Fraction of the busiest day's volume used as the drop threshold.
    pub ratio: f64,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self {
            min_volume: 100,
            floor: 5.0,
            ratio: 0.005,
        }
    }
}

impl NoiseFilter {
    /// Row count at or below which a day is dropped, or `None` when the
    /// busiest day is too small for filtering to apply.
    pub fn threshold(&self, max_volume: u64) -> Option<f64> {
        if max_volume <= self.min_volume {
            return None;
        }
        Some(self.floor.max(max_volume as f64 * self.ratio))
    }
}

// ── ReportConfig ──────────────────────────────────────────────────────────────

/// Everything the pipeline needs besides the rows themselves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub columns: ColumnNames,
    /// Internal strategy code → display name.
    pub strategy_names: HashMap<String, String>,
    /// Sub-tag → canonical parent tag.
    pub tag_merge: HashMap<String, String>,
    pub black_sample_formula: BlackSampleFormula,
    pub noise_filter: NoiseFilter,
}

impl ReportConfig {
    /// Default config location: `~/.audit-report/config.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".audit-report").join("config.json")
    }

    /// Load from `explicit` when given, otherwise from the default path.
    ///
    /// An explicit path must exist; the default path may be absent, in which
    /// case the built-in defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::config_path();
                if !path.exists() {
                    debug!("No config at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                Self::load_from(&path)
            }
        }
    }

    /// Load and parse the config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AuditError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        debug!(
            "Loaded config from {}: {} strategy names, {} tag merges",
            path.display(),
            config.strategy_names.len(),
            config.tag_merge.len()
        );
        Ok(config)
    }

    /// Display name for a strategy code, falling back to the code itself.
    pub fn strategy_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.strategy_names
            .get(code)
            .map(String::as_str)
            .unwrap_or(code)
    }

    /// Canonical parent for a tag, falling back to the tag itself.
    pub fn merged_tag<'a>(&'a self, tag: &'a str) -> &'a str {
        self.tag_merge.get(tag).map(String::as_str).unwrap_or(tag)
    }

    fn validate(&self) -> Result<()> {
        if self.noise_filter.ratio < 0.0 || self.noise_filter.floor < 0.0 {
            return Err(AuditError::Config(
                "noise_filter.ratio and noise_filter.floor must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
