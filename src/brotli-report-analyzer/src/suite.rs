//! Summarises a suite of benchmark runs per input file.
//!
//! A suite directory holds one report per configuration, anywhere below it
//! (e.g. `suite/test_data_compressed_c6_w16/_report_c6_w16.csv`). For every
//! input file across those reports, [`summarize_suite`] collects the mean
//! compressed size and Brotli time of each configuration, and [`write_suite`]
//! writes them to `<suite>/<file name>/summary.csv`.

use crate::{
    csv::write_suite_summary_csv,
    report::{params::is_report_file_name, params::ReportParams, Report, ReportError},
};
use indexmap::IndexMap;
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Errors raised while summarising a suite.
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("Directory {} does not exist.", .0.display())]
    NotADirectory(PathBuf),

    #[error("No `_report*.csv` files found under {}", .0.display())]
    NoReports(PathBuf),

    #[error("Failed to read directory entry: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Failed to write suite summary: {0}")]
    Io(#[from] io::Error),
}

/// Results of one configuration for one input file.
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteEntry {
    /// Configuration label, e.g. `c6_w16`.
    pub label: String,
    pub params: Option<ReportParams>,
    /// Mean compressed size in bytes.
    pub compressed_size: f64,
    /// Mean Brotli encoder time in milliseconds.
    pub brotli_time_ms: Option<f64>,
}

/// Every input file of a suite with its per-configuration results.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SuiteSummary {
    /// Number of reports the summary was built from.
    pub report_count: usize,
    /// File name → entries, sorted by configuration.
    pub files: IndexMap<String, Vec<SuiteEntry>>,
}

/// Finds every `_report*.csv` below `suite_dir`, in path order.
pub fn find_reports(suite_dir: &Path) -> Result<Vec<PathBuf>, SuiteError> {
    if !suite_dir.is_dir() {
        return Err(SuiteError::NotADirectory(suite_dir.to_path_buf()));
    }

    let mut reports = Vec::new();
    for entry in WalkDir::new(suite_dir).sort_by_file_name() {
        let entry = entry?;
        let is_report = entry.file_type().is_file()
            && entry.file_name().to_str().is_some_and(is_report_file_name);
        if is_report {
            debug!("Found report: {}", entry.path().display());
            reports.push(entry.into_path());
        }
    }
    Ok(reports)
}

/// Builds a [`SuiteSummary`] from already loaded reports.
///
/// Entries of each file are sorted by configuration (quality, then window
/// bits), with unparsable labels last in label order.
pub fn summarize_reports(reports: &[Report]) -> SuiteSummary {
    let mut files: IndexMap<String, Vec<SuiteEntry>> = IndexMap::new();
    for report in reports {
        for (file_name, summary) in &report.files {
            files.entry(file_name.clone()).or_default().push(SuiteEntry {
                label: report.label.clone(),
                params: report.params.clone(),
                compressed_size: summary.compressed_size,
                brotli_time_ms: summary.brotli_time_ms(),
            });
        }
    }

    for entries in files.values_mut() {
        entries.sort_by(|a, b| match (&a.params, &b.params) {
            (Some(pa), Some(pb)) => pa.cmp(pb).then_with(|| a.label.cmp(&b.label)),
            (Some(_), None) => core::cmp::Ordering::Less,
            (None, Some(_)) => core::cmp::Ordering::Greater,
            (None, None) => a.label.cmp(&b.label),
        });
    }

    SuiteSummary {
        report_count: reports.len(),
        files,
    }
}

/// Loads every report below `suite_dir` and summarises them per input file.
///
/// # Errors
///
/// Fails if `suite_dir` is not a directory, contains no reports, or any
/// report cannot be loaded.
pub fn summarize_suite(suite_dir: &Path) -> Result<SuiteSummary, SuiteError> {
    let paths = find_reports(suite_dir)?;
    if paths.is_empty() {
        return Err(SuiteError::NoReports(suite_dir.to_path_buf()));
    }

    let reports = paths
        .iter()
        .map(|path| Report::load(path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(summarize_reports(&reports))
}

/// Writes `<suite_dir>/<file name>/summary.csv` for every file in `summary`.
///
/// File names are sanitized before being used as directory names.
/// Returns the written paths.
pub fn write_suite(suite_dir: &Path, summary: &SuiteSummary) -> Result<Vec<PathBuf>, SuiteError> {
    let mut written = Vec::with_capacity(summary.files.len());
    for (file_name, entries) in &summary.files {
        let output_dir = suite_dir.join(sanitize_filename::sanitize(file_name));
        let path = write_suite_summary_csv(entries, &output_dir)?;
        info!("Wrote {} configuration(s) to {}", entries.len(), path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::SUITE_SUMMARY_FILE_NAME;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str =
        "Original File Name,File Size(B),Compressed File Size(B),Time Taken by Brotli(s)\n";

    fn write_report(dir: &Path, run_dir: &str, file_name: &str, rows: &str) -> PathBuf {
        let run = dir.join(run_dir);
        fs::create_dir_all(&run).unwrap();
        let path = run.join(file_name);
        fs::write(&path, format!("{HEADER}{rows}")).unwrap();
        path
    }

    fn create_suite() -> TempDir {
        let tmp = TempDir::new().unwrap();
        write_report(
            tmp.path(),
            "test_data_compressed_c6_w24",
            "_report_c6_w24.csv",
            "a.txt,1000,300,0.004\nb.txt,50,40,0.001\n",
        );
        write_report(
            tmp.path(),
            "test_data_compressed_c6_w16",
            "_report_c6_w16.csv",
            "a.txt,1000,400,0.002\na.txt,1000,500,0.004\n",
        );
        fs::write(tmp.path().join("notes.csv"), "unrelated").unwrap();
        tmp
    }

    #[test]
    fn finds_only_report_files() {
        let suite = create_suite();
        let reports = find_reports(suite.path()).unwrap();
        let names: Vec<String> = reports
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["_report_c6_w16.csv", "_report_c6_w24.csv"]);
    }

    #[test]
    fn summarizes_per_file_and_configuration() {
        let suite = create_suite();
        let summary = summarize_suite(suite.path()).unwrap();
        assert_eq!(summary.report_count, 2);

        let a = &summary.files["a.txt"];
        let labels: Vec<&str> = a.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["c6_w16", "c6_w24"]);
        assert_eq!(a[0].compressed_size, 450.0);
        assert!((a[0].brotli_time_ms.unwrap() - 3.0).abs() < 1e-9);

        let b = &summary.files["b.txt"];
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].label, "c6_w24");
    }

    #[test]
    fn writes_summary_per_file() {
        let suite = create_suite();
        let summary = summarize_suite(suite.path()).unwrap();
        let written = write_suite(suite.path(), &summary).unwrap();

        assert_eq!(written.len(), 2);
        assert!(suite.path().join("a.txt").join(SUITE_SUMMARY_FILE_NAME).is_file());
        assert!(suite.path().join("b.txt").join(SUITE_SUMMARY_FILE_NAME).is_file());

        // Summaries are not picked up as reports on the next run.
        assert_eq!(find_reports(suite.path()).unwrap().len(), 2);
    }

    #[test]
    fn empty_suite_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            summarize_suite(tmp.path()),
            Err(SuiteError::NoReports(_))
        ));
    }

    #[test]
    fn malformed_report_aborts() {
        let tmp = TempDir::new().unwrap();
        let run = tmp.path().join("run");
        fs::create_dir(&run).unwrap();
        fs::write(run.join("_report_c6_w16.csv"), "Original File Name\nx\n").unwrap();
        assert!(matches!(
            summarize_suite(tmp.path()),
            Err(SuiteError::Report(ReportError::Malformed { .. }))
        ));
    }
}
