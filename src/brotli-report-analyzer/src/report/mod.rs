//! Loads Brotli benchmark reports and summarises them per input file.
//!
//! A report is a CSV file written by the benchmark harness, with one row per
//! compression run. The same input file is usually compressed several times,
//! so rows are grouped by `Original File Name` and averaged into a
//! [`FileSummary`].
//!
//! # Report Columns
//!
//! Required:
//!
//! - `Original File Name`
//! - `File Size(B)`
//! - `Compressed File Size(B)`
//! - `Time Taken by Brotli(s)`
//!
//! Optional (may be absent or empty):
//!
//! - `Compression Quality`, `Window Bits`
//! - `Time Taken by Compression(s)`
//! - `Compression Ratio`
//! - `CPU Usage by Process(%)`
//! - `Maximum Resident Size(KB)`
//!
//! Other columns are ignored. Surrounding whitespace is trimmed from every
//! header and field.
//!
//! # Submodules
//!
//! - [`params`]: configuration parsed from report file names.
//! - [`directory`]: summaries built from directories of compressed files.

pub mod directory;
pub mod params;

use self::params::ReportParams;
use core::fmt;
use csv::{ReaderBuilder, Trim};
use indexmap::IndexMap;
use serde::Deserialize;
use std::{
    ffi::OsStr,
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::info;

/// Errors raised while loading reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to open report {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Report `{label}` is malformed: {source}")]
    Malformed {
        label: String,
        #[source]
        source: csv::Error,
    },

    #[error("Report `{0}` contains no rows")]
    Empty(String),

    #[error("Directory {} does not exist.", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to read directory entry: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A single row of a benchmark report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "Original File Name")]
    pub file_name: String,
    #[serde(rename = "File Size(B)")]
    pub original_size: f64,
    #[serde(rename = "Compressed File Size(B)")]
    pub compressed_size: f64,
    #[serde(rename = "Time Taken by Brotli(s)")]
    pub brotli_time_s: f64,
    #[serde(rename = "Compression Quality", default)]
    pub compression_quality: Option<u32>,
    #[serde(rename = "Window Bits", default)]
    pub window_bits: Option<u32>,
    #[serde(rename = "Time Taken by Compression(s)", default)]
    pub compression_time_s: Option<f64>,
    #[serde(rename = "Compression Ratio", default)]
    pub compression_ratio: Option<f64>,
    #[serde(rename = "CPU Usage by Process(%)", default)]
    pub cpu_usage_pct: Option<f64>,
    #[serde(rename = "Maximum Resident Size(KB)", default)]
    pub max_rss_kb: Option<f64>,
    /// Peak RSS as written by harnesses that report it in bytes.
    #[serde(rename = "Maximum Resident Size(B)", default)]
    pub max_rss_b: Option<f64>,
}

impl ReportRow {
    /// Peak RSS in KiB, from whichever of the two RSS columns is present.
    pub fn max_rss_kib(&self) -> Option<f64> {
        self.max_rss_kb.or(self.max_rss_b.map(|bytes| bytes / 1024.0))
    }
}

/// A measured quantity that can be compared between reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    /// Compressed size in bytes.
    CompressedSize,
    /// Time spent inside the Brotli encoder, in seconds.
    BrotliTime,
    /// Time spent on the full compression including I/O, in seconds.
    CompressionTime,
    /// CPU usage of the compressing process, in percent.
    CpuUsage,
    /// Peak resident set size, in KiB.
    MaxRss,
}

impl Metric {
    /// Every metric, in output column order.
    pub const ALL: [Metric; 5] = [
        Metric::CompressedSize,
        Metric::CompressionTime,
        Metric::BrotliTime,
        Metric::CpuUsage,
        Metric::MaxRss,
    ];

    /// Human-readable name, as used in CSV headers.
    pub fn name(self) -> &'static str {
        match self {
            Metric::CompressedSize => "Compression Size",
            Metric::BrotliTime => "Brotli Time",
            Metric::CompressionTime => "Compression Time",
            Metric::CpuUsage => "CPU Usage",
            Metric::MaxRss => "Maximum Resident Size",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Averaged measurements of a single input file.
///
/// Optional metrics are averaged over the rows that have them, and are
/// [`None`] if no row does.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    /// Name of the original (uncompressed) file.
    pub file_name: String,
    /// Number of report rows averaged into this summary.
    pub samples: usize,
    /// Size of the original file, from its first row.
    pub original_size: Option<f64>,
    /// Mean compressed size in bytes.
    pub compressed_size: f64,
    pub brotli_time_s: Option<f64>,
    pub compression_time_s: Option<f64>,
    pub compression_ratio: Option<f64>,
    pub cpu_usage_pct: Option<f64>,
    pub max_rss_kb: Option<f64>,
}

impl FileSummary {
    /// Summary of a file known only by its compressed size.
    pub fn from_compressed_size(file_name: impl Into<String>, compressed_size: u64) -> Self {
        Self {
            file_name: file_name.into(),
            samples: 1,
            original_size: None,
            compressed_size: compressed_size as f64,
            brotli_time_s: None,
            compression_time_s: None,
            compression_ratio: None,
            cpu_usage_pct: None,
            max_rss_kb: None,
        }
    }

    /// The value of `metric`, if this summary has it.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::CompressedSize => Some(self.compressed_size),
            Metric::BrotliTime => self.brotli_time_s,
            Metric::CompressionTime => self.compression_time_s,
            Metric::CpuUsage => self.cpu_usage_pct,
            Metric::MaxRss => self.max_rss_kb,
        }
    }

    /// Mean Brotli encoder time in milliseconds.
    pub fn brotli_time_ms(&self) -> Option<f64> {
        self.brotli_time_s.map(|s| s * 1000.0)
    }
}

/// Running mean that skips missing values.
#[derive(Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn get(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

struct FileSummaryBuilder {
    file_name: String,
    samples: usize,
    original_size: Option<f64>,
    compressed_size: Mean,
    brotli_time_s: Mean,
    compression_time_s: Mean,
    compression_ratio: Mean,
    cpu_usage_pct: Mean,
    max_rss_kb: Mean,
}

impl FileSummaryBuilder {
    fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            samples: 0,
            original_size: None,
            compressed_size: Mean::default(),
            brotli_time_s: Mean::default(),
            compression_time_s: Mean::default(),
            compression_ratio: Mean::default(),
            cpu_usage_pct: Mean::default(),
            max_rss_kb: Mean::default(),
        }
    }

    fn add(&mut self, row: &ReportRow) {
        self.samples += 1;
        self.original_size.get_or_insert(row.original_size);
        self.compressed_size.add(Some(row.compressed_size));
        self.brotli_time_s.add(Some(row.brotli_time_s));
        self.compression_time_s.add(row.compression_time_s);
        self.compression_ratio.add(row.compression_ratio);
        self.cpu_usage_pct.add(row.cpu_usage_pct);
        self.max_rss_kb.add(row.max_rss_kib());
    }

    fn finish(self) -> FileSummary {
        FileSummary {
            file_name: self.file_name,
            samples: self.samples,
            original_size: self.original_size,
            compressed_size: self.compressed_size.get().unwrap_or_default(),
            brotli_time_s: self.brotli_time_s.get(),
            compression_time_s: self.compression_time_s.get(),
            compression_ratio: self.compression_ratio.get(),
            cpu_usage_pct: self.cpu_usage_pct.get(),
            max_rss_kb: self.max_rss_kb.get(),
        }
    }
}

/// A benchmark report, summarised per input file.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Name of the configuration, e.g. `c6_w24_v110`.
    pub label: String,
    /// Configuration parsed from the report name, if it follows the naming scheme.
    pub params: Option<ReportParams>,
    /// File name → summary, in the order files first appear in the report.
    pub files: IndexMap<String, FileSummary>,
}

impl Report {
    /// Creates an empty report.
    pub fn new(label: impl Into<String>, params: Option<ReportParams>) -> Self {
        Self {
            label: label.into(),
            params,
            files: IndexMap::new(),
        }
    }

    /// Loads and summarises the report at `path`.
    ///
    /// The label is taken from the configuration in the file name
    /// (`_report_c6_w16.csv` → `c6_w16`), or the file stem if the name does
    /// not follow that scheme.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened, is not a valid report, or has no rows.
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let file_name = path
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or_default();
        let params = ReportParams::from_report_file_name(file_name);
        let label = match &params {
            Some(params) => params.label(),
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        };

        let file = File::open(path).map_err(|source| ReportError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let report = Self::from_reader(label, params, file)?;
        info!(
            "Loaded report {} ({} files) from {}",
            report.label,
            report.len(),
            path.display()
        );
        Ok(report)
    }

    /// Reads and summarises report rows from any CSV source.
    pub fn from_reader<R: Read>(
        label: impl Into<String>,
        params: Option<ReportParams>,
        reader: R,
    ) -> Result<Self, ReportError> {
        let label = label.into();
        let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

        let mut rows = Vec::new();
        for row in csv_reader.deserialize::<ReportRow>() {
            let row = row.map_err(|source| ReportError::Malformed {
                label: label.clone(),
                source,
            })?;
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(ReportError::Empty(label));
        }
        Ok(Self::from_rows(label, params, rows))
    }

    /// Groups `rows` by file name and averages each group.
    pub fn from_rows(
        label: impl Into<String>,
        params: Option<ReportParams>,
        rows: impl IntoIterator<Item = ReportRow>,
    ) -> Self {
        let mut builders: IndexMap<String, FileSummaryBuilder> = IndexMap::new();
        for row in rows {
            builders
                .entry(row.file_name.clone())
                .or_insert_with(|| FileSummaryBuilder::new(&row.file_name))
                .add(&row);
        }

        let mut report = Self::new(label, params);
        report.files = builders
            .into_iter()
            .map(|(name, builder)| (name, builder.finish()))
            .collect();
        report
    }

    /// Summary of `file_name`, if the report contains it.
    pub fn get(&self, file_name: &str) -> Option<&FileSummary> {
        self.files.get(file_name)
    }

    /// Adds or replaces the summary of a file.
    pub fn insert(&mut self, summary: FileSummary) {
        self.files.insert(summary.file_name.clone(), summary);
    }

    /// Number of distinct input files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether any file in the report has a value for `metric`.
    pub fn has_metric(&self, metric: Metric) -> bool {
        self.files.values().any(|f| f.metric(metric).is_some())
    }
}
