//! Writes comparison and suite summaries as CSV files.
//!
//! - [`write_comparison_csv`]: one row per file, one column per compared metric.
//! - [`write_comparison_csvs`]: the above, for several comparisons.
//! - [`write_suite_summary_csv`]: one row per configuration of a single input file.

use crate::{
    comparison::{Comparison, Direction},
    suite::SuiteEntry,
};
use csv::Writer;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// File name of the summary written for each input file of a suite.
pub const SUITE_SUMMARY_FILE_NAME: &str = "summary.csv";

/// Name of the CSV file a comparison is written to.
///
/// `_comparison_report_<baseline>_vs_<candidate>.csv`, sanitized for use as a file name.
pub fn comparison_file_name(comparison: &Comparison) -> String {
    sanitize_filename::sanitize(format!(
        "_comparison_report_{}_vs_{}.csv",
        comparison.baseline_label, comparison.candidate_label
    ))
}

/// Writes a comparison to `output_dir`, returning the path of the written file.
///
/// Columns:
///
/// - `File Name`
/// - `Original File Size`
/// - `Change in <Metric> (%)` for every metric in [`Comparison::metrics`], or
///   `Improvement in <Metric> (%)` with [`Direction::Improvement`]
///
/// Undefined values are left empty.
pub fn write_comparison_csv(
    comparison: &Comparison,
    output_dir: &Path,
    direction: Direction,
) -> std::io::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(comparison_file_name(comparison));
    let mut wtr = Writer::from_path(&path)?;

    let metrics = comparison.metrics();
    let mut headers = vec!["File Name".to_string(), "Original File Size".to_string()];
    headers.extend(
        metrics
            .iter()
            .map(|m| format!("{} in {} (%)", direction.name(), m.name())),
    );
    wtr.write_record(&headers)?;

    for file in &comparison.files {
        let mut record = vec![file.file_name.clone(), format_optional(file.original_size)];
        record.extend(
            metrics
                .iter()
                .map(|m| format_optional(file.change(*m).and_then(|c| c.pct(direction)))),
        );
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(path)
}

/// Writes every comparison to `output_dir`, returning the written paths in order.
pub fn write_comparison_csvs(
    comparisons: &[Comparison],
    output_dir: &Path,
    direction: Direction,
) -> std::io::Result<Vec<PathBuf>> {
    comparisons
        .iter()
        .map(|comparison| write_comparison_csv(comparison, output_dir, direction))
        .collect()
}

#[derive(Serialize)]
struct SuiteRecord<'a> {
    #[serde(rename = "Configuration")]
    configuration: &'a str,
    #[serde(rename = "Compression Quality")]
    quality: Option<u32>,
    #[serde(rename = "Window Bits")]
    window_bits: Option<u32>,
    #[serde(rename = "Version")]
    version: Option<&'a str>,
    #[serde(rename = "Compressed File Size(B)")]
    compressed_size: f64,
    #[serde(rename = "Time Taken by Brotli(ms)")]
    brotli_time_ms: Option<f64>,
}

/// Writes the per-configuration results of one input file to
/// `<output_dir>/summary.csv`, returning the path of the written file.
pub fn write_suite_summary_csv(entries: &[SuiteEntry], output_dir: &Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(SUITE_SUMMARY_FILE_NAME);
    let mut wtr = Writer::from_path(&path)?;

    for entry in entries {
        let params = entry.params.as_ref();
        wtr.serialize(SuiteRecord {
            configuration: &entry.label,
            quality: params.map(|p| p.quality),
            window_bits: params.map(|p| p.window_bits),
            version: params.and_then(|p| p.version.as_deref()),
            compressed_size: entry.compressed_size,
            brotli_time_ms: entry.brotli_time_ms,
        })?;
    }

    wtr.flush()?;
    Ok(path)
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::{compare, ComparisonOrder};
    use crate::report::{params::ReportParams, FileSummary, Report};
    use tempfile::TempDir;

    fn sized_report(label: &str, sizes: &[(&str, u64)]) -> Report {
        let mut report = Report::new(label, None);
        for (name, size) in sizes {
            report.insert(FileSummary::from_compressed_size(*name, *size));
        }
        report
    }

    #[test]
    fn writes_comparison_rows() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let baseline = sized_report("c6_w16", &[("a.br", 200), ("b.br", 0)]);
        let candidate = sized_report("c6_w24", &[("a.br", 150), ("b.br", 10)]);
        let comparison = compare(&baseline, &candidate, ComparisonOrder::Name)?;

        let path = write_comparison_csv(&comparison, tmp.path(), Direction::Change)?;
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("_comparison_report_c6_w16_vs_c6_w24.csv")
        );
        assert_eq!(
            fs::read_to_string(&path)?,
            "File Name,Original File Size,Change in Compression Size (%)\n\
             a.br,,-25\n\
             b.br,,\n"
        );
        Ok(())
    }

    #[test]
    fn writes_improvement_columns() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let baseline = sized_report("c6_w16", &[("a.br", 200), ("b.br", 100)]);
        let candidate = sized_report("c6_w24", &[("a.br", 150), ("b.br", 110)]);
        let comparison = compare(&baseline, &candidate, ComparisonOrder::Name)?;

        let path = write_comparison_csv(&comparison, tmp.path(), Direction::Improvement)?;
        assert_eq!(
            fs::read_to_string(&path)?,
            "File Name,Original File Size,Improvement in Compression Size (%)\n\
             a.br,,25\n\
             b.br,,-10\n"
        );
        Ok(())
    }

    #[test]
    fn comparison_file_name_is_sanitized() -> anyhow::Result<()> {
        let baseline = sized_report("runs/base", &[("a.br", 1)]);
        let candidate = sized_report("cand", &[("a.br", 1)]);
        let comparison = compare(&baseline, &candidate, ComparisonOrder::Name)?;
        assert!(!comparison_file_name(&comparison).contains('/'));
        Ok(())
    }

    #[test]
    fn writes_suite_summary() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let entries = vec![
            SuiteEntry {
                label: "c6_w16".into(),
                params: ReportParams::parse_tokens("c6_w16"),
                compressed_size: 1000.0,
                brotli_time_ms: Some(12.5),
            },
            SuiteEntry {
                label: "c9_w24_v110".into(),
                params: ReportParams::parse_tokens("c9_w24_v110"),
                compressed_size: 900.0,
                brotli_time_ms: None,
            },
        ];

        let path = write_suite_summary_csv(&entries, &tmp.path().join("a.txt"))?;
        assert_eq!(path, tmp.path().join("a.txt").join(SUITE_SUMMARY_FILE_NAME));
        assert_eq!(
            fs::read_to_string(&path)?,
            "Configuration,Compression Quality,Window Bits,Version,Compressed File Size(B),Time Taken by Brotli(ms)\n\
             c6_w16,6,16,,1000.0,12.5\n\
             c9_w24_v110,9,24,110,900.0,\n"
        );
        Ok(())
    }
}
