//! Compares a candidate benchmark configuration against a baseline.
//!
//! Both sides are [`Report`]s. Files are matched by name; files present on
//! only one side are left out. For every [`Metric`] both sides measured, the
//! percentage change from baseline to candidate is computed:
//!
//! ```text
//! change = (candidate - baseline) * 100 / baseline
//! ```
//!
//! A negative change is a decrease (for sizes and timings, an improvement).
//! [`MetricChange::improvement_pct`] gives the change with the sign flipped;
//! summaries and CSVs pick one of the two with [`Direction`].
//!
//! # Example
//!
//! ```
//! use brotli_report_analyzer::comparison::{compare, ComparisonOrder};
//! use brotli_report_analyzer::report::{FileSummary, Metric, Report};
//!
//! let mut baseline = Report::new("c6_w16", None);
//! baseline.insert(FileSummary::from_compressed_size("a.br", 200));
//! let mut candidate = Report::new("c6_w24", None);
//! candidate.insert(FileSummary::from_compressed_size("a.br", 150));
//!
//! let comparison = compare(&baseline, &candidate, ComparisonOrder::Name).unwrap();
//! let change = comparison.files[0].change(Metric::CompressedSize).unwrap();
//! assert_eq!(change.change_pct, Some(-25.0));
//! assert_eq!(change.improvement_pct(), Some(25.0));
//! ```

pub mod stats;

use self::stats::{calculate_stats, percentile_summary, PercentileSummary, Stats};
use crate::report::{Metric, Report};
use core::cmp::Ordering;
use derive_more::FromStr;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while comparing reports.
#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("Reports `{baseline}` and `{candidate}` have no files in common")]
    NoCommonFiles { baseline: String, candidate: String },
}

/// Order of files in a [`Comparison`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromStr)]
pub enum ComparisonOrder {
    /// Order in which files appear in the baseline report.
    #[default]
    Name,
    /// Ascending original file size. Files without a known size go last.
    Size,
}

/// Sign convention of reported percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// `(candidate - baseline) * 100 / baseline`; negative when the candidate is smaller.
    #[default]
    Change,
    /// The negated change; positive when the candidate is smaller.
    Improvement,
}

impl Direction {
    /// Column prefix used in comparison CSVs (`Change in ...`, `Improvement in ...`).
    pub fn name(self) -> &'static str {
        match self {
            Direction::Change => "Change",
            Direction::Improvement => "Improvement",
        }
    }
}

/// Percentage change of `candidate` relative to `baseline`.
///
/// [`None`] if `baseline` is zero, since the change is undefined.
pub fn percent_change(baseline: f64, candidate: f64) -> Option<f64> {
    if baseline == 0.0 {
        None
    } else {
        Some((candidate - baseline) * 100.0 / baseline)
    }
}

/// One metric of one file, on both sides of the comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricChange {
    pub baseline: f64,
    pub candidate: f64,
    /// Percentage change from `baseline` to `candidate`, see [`percent_change`].
    pub change_pct: Option<f64>,
}

impl MetricChange {
    pub fn new(baseline: f64, candidate: f64) -> Self {
        Self {
            baseline,
            candidate,
            change_pct: percent_change(baseline, candidate),
        }
    }

    /// The change with its sign flipped; positive when the candidate is smaller.
    pub fn improvement_pct(&self) -> Option<f64> {
        // Subtracting from zero keeps an unchanged value at 0 rather than -0.
        self.change_pct.map(|change| 0.0 - change)
    }

    /// The percentage in the given sign convention.
    pub fn pct(&self, direction: Direction) -> Option<f64> {
        match direction {
            Direction::Change => self.change_pct,
            Direction::Improvement => self.improvement_pct(),
        }
    }
}

/// Comparison of a single file present in both reports.
#[derive(Debug, Clone, PartialEq)]
pub struct FileComparison {
    pub file_name: String,
    /// Original file size, from the baseline (or the candidate if the baseline lacks it).
    pub original_size: Option<f64>,
    /// Metric → change, for every metric both sides measured.
    pub changes: IndexMap<Metric, MetricChange>,
}

impl FileComparison {
    pub fn change(&self, metric: Metric) -> Option<&MetricChange> {
        self.changes.get(&metric)
    }
}

/// Result of comparing a candidate report against a baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub baseline_label: String,
    pub candidate_label: String,
    pub files: Vec<FileComparison>,
}

impl Comparison {
    /// Metrics measured for at least one file, in [`Metric::ALL`] order.
    pub fn metrics(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| self.files.iter().any(|f| f.changes.contains_key(m)))
            .collect()
    }

    /// Every defined percentage of `metric` in the given convention, in file order.
    pub fn values(&self, metric: Metric, direction: Direction) -> Vec<f64> {
        self.files
            .iter()
            .filter_map(|f| f.change(metric).and_then(|c| c.pct(direction)))
            .collect()
    }

    /// Every defined percentage change of `metric`, in file order.
    pub fn changes(&self, metric: Metric) -> Vec<f64> {
        self.values(metric, Direction::Change)
    }

    /// Every defined improvement (negated change) of `metric`, in file order.
    pub fn improvements(&self, metric: Metric) -> Vec<f64> {
        self.values(metric, Direction::Improvement)
    }

    /// Mean and reported percentiles of `metric`.
    pub fn summary(&self, metric: Metric, direction: Direction) -> Option<PercentileSummary> {
        percentile_summary(&self.values(metric, direction))
    }

    /// Quartile statistics of `metric`.
    pub fn stats(&self, metric: Metric, direction: Direction) -> Option<Stats> {
        calculate_stats(&self.values(metric, direction))
    }
}

/// Compares `candidate` against `baseline`, file by file.
///
/// # Errors
///
/// Returns [`ComparisonError::NoCommonFiles`] if no file appears in both reports.
pub fn compare(
    baseline: &Report,
    candidate: &Report,
    order: ComparisonOrder,
) -> Result<Comparison, ComparisonError> {
    let mut files = Vec::with_capacity(baseline.len());
    for (name, base) in &baseline.files {
        let Some(cand) = candidate.get(name) else {
            debug!("{} is missing from {}, skipping", name, candidate.label);
            continue;
        };

        let changes = Metric::ALL
            .into_iter()
            .filter_map(|metric| {
                let change = MetricChange::new(base.metric(metric)?, cand.metric(metric)?);
                Some((metric, change))
            })
            .collect();

        files.push(FileComparison {
            file_name: name.clone(),
            original_size: base.original_size.or(cand.original_size),
            changes,
        });
    }

    if files.is_empty() {
        return Err(ComparisonError::NoCommonFiles {
            baseline: baseline.label.clone(),
            candidate: candidate.label.clone(),
        });
    }

    if order == ComparisonOrder::Size {
        files.sort_by(|a, b| match (a.original_size, b.original_size) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }

    info!(
        "Compared {} against {}: {} common file(s)",
        candidate.label,
        baseline.label,
        files.len()
    );
    Ok(Comparison {
        baseline_label: baseline.label.clone(),
        candidate_label: candidate.label.clone(),
        files,
    })
}

/// Compares each of `candidates` against `baseline`.
pub fn compare_many(
    baseline: &Report,
    candidates: &[Report],
    order: ComparisonOrder,
) -> Result<Vec<Comparison>, ComparisonError> {
    candidates
        .iter()
        .map(|candidate| compare(baseline, candidate, order))
        .collect()
}
