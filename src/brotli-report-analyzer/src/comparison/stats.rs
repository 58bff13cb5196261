//! Statistical functions for summarising percentage changes.
//!
//! # Types
//!
//! - [`Stats`]: Container for a complete set of statistical measures including
//!   quartiles, mean, median, IQR, min/max, and sample count.
//! - [`PercentileSummary`]: Mean plus the percentiles reported for every
//!   comparison ([`REPORTED_PERCENTILES`]).
//!
//! # Functions
//!
//! - [`calculate_stats`]: Calculate comprehensive statistics for an array of values
//! - [`calculate_percentile`]: Calculate a specific percentile of sorted values
//! - [`percentile_summary`]: Calculate the reported percentiles of an array of values
//! - [`format_stats`]: Format the quartiles of percentage changes on one line
//!
//! Percentiles use linear interpolation between the two closest ranks.

use core::cmp::Ordering;

/// Percentiles included in every [`PercentileSummary`].
pub const REPORTED_PERCENTILES: [u8; 5] = [10, 20, 50, 90, 99];

/// Statistics for a set of numeric values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    /// Minimum value
    pub min: f64,
    /// First quartile (25th percentile)
    pub q1: f64,
    /// Median (50th percentile)
    pub median: f64,
    /// Third quartile (75th percentile)
    pub q3: f64,
    /// Maximum value
    pub max: f64,
    /// Interquartile range (IQR = Q3 - Q1)
    pub iqr: f64,
    /// Mean (average) value
    pub mean: f64,
    /// Sample size
    pub count: usize,
}

/// Mean and selected percentiles of a set of values.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileSummary {
    /// Mean (average) value
    pub mean: f64,
    /// `(percentile, value)` pairs, one per entry of [`REPORTED_PERCENTILES`].
    pub percentiles: Vec<(u8, f64)>,
    /// Sample size
    pub count: usize,
}

impl PercentileSummary {
    /// Value at `percentile`, if it is one of [`REPORTED_PERCENTILES`].
    pub fn percentile(&self, percentile: u8) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|(p, _)| *p == percentile)
            .map(|(_, v)| *v)
    }

    /// Formats the percentiles as `10th Percentile: 1.23% | 20th Percentile: ...`.
    pub fn format_percentiles(&self) -> String {
        self.percentiles
            .iter()
            .map(|(p, v)| format!("{p}th Percentile: {v:.2}%"))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted_values = values.to_vec();
    sorted_values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted_values
}

/// Calculate statistics for an array of values.
///
/// This function calculates various statistics including min, max, quartiles,
/// interquartile range (IQR), and mean.
///
/// # Arguments
///
/// * `values` - Slice of values to analyze
///
/// # Returns
///
/// A [`Stats`] struct containing the calculated statistics, or [`None`] if `values` is empty
pub fn calculate_stats(values: &[f64]) -> Option<Stats> {
    let count = values.len();
    if count == 0 {
        return None;
    }

    let sorted_values = sorted(values);
    let min = sorted_values[0];
    let max = sorted_values[count - 1];

    // Calculate mean
    let sum: f64 = sorted_values.iter().sum();
    let mean = sum / count as f64;

    // Calculate median and quartiles
    let median = calculate_percentile(&sorted_values, 0.5);
    let q1 = calculate_percentile(&sorted_values, 0.25);
    let q3 = calculate_percentile(&sorted_values, 0.75);
    let iqr = q3 - q1;

    Some(Stats {
        min,
        q1,
        median,
        q3,
        max,
        iqr,
        mean,
        count,
    })
}

/// Calculate the mean and [`REPORTED_PERCENTILES`] of an array of values.
///
/// Returns [`None`] if `values` is empty.
pub fn percentile_summary(values: &[f64]) -> Option<PercentileSummary> {
    let count = values.len();
    if count == 0 {
        return None;
    }

    let sorted_values = sorted(values);
    let mean = sorted_values.iter().sum::<f64>() / count as f64;
    let percentiles = REPORTED_PERCENTILES
        .iter()
        .map(|&p| (p, calculate_percentile(&sorted_values, p as f64 / 100.0)))
        .collect();

    Some(PercentileSummary {
        mean,
        percentiles,
        count,
    })
}

/// Calculate a specific percentile of values.
///
/// # Arguments
///
/// * `sorted_values` - Sorted slice of values
/// * `percentile` - Percentile to calculate (0.0 to 1.0)
///
/// # Returns
///
/// The value at the specified percentile
pub fn calculate_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    let count = sorted_values.len();
    if count == 0 {
        return 0.0;
    }

    let index = percentile.clamp(0.0, 1.0) * (count - 1) as f64;
    let lower_idx = index.floor() as usize;
    let upper_idx = index.ceil() as usize;

    if lower_idx == upper_idx {
        sorted_values[lower_idx]
    } else {
        let weight = index - lower_idx as f64;
        sorted_values[lower_idx] * (1.0 - weight) + sorted_values[upper_idx] * weight
    }
}

/// Formats the quartile spread of percentage changes on one line.
///
/// ```text
/// Min: -30.00% | Q1: -12.50% | Median: -5.00% | Q3: 0.00% | Max: 4.00% | IQR: 12.50% (n=42)
/// ```
pub fn format_stats(stats: &Stats) -> String {
    format!(
        "Min: {:.2}% | Q1: {:.2}% | Median: {:.2}% | Q3: {:.2}% | Max: {:.2}% | IQR: {:.2}% (n={})",
        stats.min, stats.q1, stats.median, stats.q3, stats.max, stats.iqr, stats.count
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_values_have_no_stats() {
        assert_eq!(calculate_stats(&[]), None);
        assert_eq!(percentile_summary(&[]), None);
    }

    #[test]
    fn single_value_is_every_statistic() {
        let stats = calculate_stats(&[4.2]).unwrap();
        assert_eq!(stats.min, 4.2);
        assert_eq!(stats.max, 4.2);
        assert_eq!(stats.median, 4.2);
        assert_eq!(stats.iqr, 0.0);
        assert_eq!(stats.count, 1);
    }

    #[test]
    fn quartiles_interpolate_between_ranks() {
        // Unsorted on purpose.
        let stats = calculate_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert!(approx_eq(stats.q1, 1.75));
        assert!(approx_eq(stats.median, 2.5));
        assert!(approx_eq(stats.q3, 3.25));
        assert!(approx_eq(stats.iqr, 1.5));
        assert!(approx_eq(stats.mean, 2.5));
    }

    #[test]
    fn reported_percentiles() {
        let values: Vec<f64> = (0..=10).map(|v| v as f64 * 10.0).collect();
        let summary = percentile_summary(&values).unwrap();
        assert_eq!(summary.count, 11);
        assert!(approx_eq(summary.mean, 50.0));
        assert!(approx_eq(summary.percentile(10).unwrap(), 10.0));
        assert!(approx_eq(summary.percentile(20).unwrap(), 20.0));
        assert!(approx_eq(summary.percentile(50).unwrap(), 50.0));
        assert!(approx_eq(summary.percentile(90).unwrap(), 90.0));
        assert!(approx_eq(summary.percentile(99).unwrap(), 99.0));
        assert_eq!(summary.percentile(75), None);
    }

    #[test]
    fn formats_percentiles() {
        let summary = percentile_summary(&[1.0, 2.0]).unwrap();
        let text = summary.format_percentiles();
        assert!(text.starts_with("10th Percentile: 1.10% | 20th Percentile: 1.20%"));
        assert!(text.ends_with("99th Percentile: 1.99%"));
    }

    #[test]
    fn formats_stats() {
        let stats = calculate_stats(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            format_stats(&stats),
            "Min: 1.00% | Q1: 1.50% | Median: 2.00% | Q3: 2.50% | Max: 3.00% | IQR: 1.00% (n=3)"
        );
    }
}
