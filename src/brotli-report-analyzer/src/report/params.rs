//! Compressor configuration encoded in report and directory names.
//!
//! Benchmark runs name their outputs after the configuration used, e.g.
//! `_report_c6_w24_v110.csv` or `test_data_compressed_c6_w24_v110/`.
//! Tokens are separated by `_`:
//!
//! - `c<N>`: compression quality
//! - `w<N>`: window bits
//! - `v<S>`: format version (optional)
//!
//! Unrecognised tokens are ignored.

use core::fmt;

/// Prefix of every benchmark report file name.
pub const REPORT_PREFIX: &str = "_report";

/// Extension of benchmark report files.
pub const REPORT_EXTENSION: &str = "csv";

/// Compressor configuration a report was produced with.
///
/// Orders by quality, then window bits, then version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportParams {
    /// Compression quality (`c` token).
    pub quality: u32,
    /// Window size in bits (`w` token).
    pub window_bits: u32,
    /// Format version (`v` token), e.g. `110`.
    pub version: Option<String>,
}

impl ReportParams {
    /// Parses the parameters from a `_`-separated token list such as `c6_w24_v110`.
    ///
    /// Returns [`None`] unless both quality and window bits are present.
    pub fn parse_tokens(text: &str) -> Option<Self> {
        let mut quality = None;
        let mut window_bits = None;
        let mut version = None;

        for token in text.split('_').filter(|t| !t.is_empty()) {
            let mut chars = token.chars();
            let kind = chars.next();
            let value = chars.as_str();
            if value.is_empty() {
                continue;
            }
            match kind {
                Some('c') => quality = quality.or(value.parse().ok()),
                Some('w') => window_bits = window_bits.or(value.parse().ok()),
                Some('v') if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '.') => {
                    version = version.or(Some(value.to_string()))
                }
                _ => {}
            }
        }

        Some(Self {
            quality: quality?,
            window_bits: window_bits?,
            version,
        })
    }

    /// Parses the parameters from a report file name such as `_report_c6_w16.csv`.
    pub fn from_report_file_name(file_name: &str) -> Option<Self> {
        let stem = file_name
            .strip_suffix(REPORT_EXTENSION)
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(file_name);
        let tokens = stem.strip_prefix(REPORT_PREFIX)?;
        Self::parse_tokens(tokens)
    }

    /// Short label used in output file names and console output, e.g. `c6_w24_v110`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ReportParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}_w{}", self.quality, self.window_bits)?;
        if let Some(version) = &self.version {
            write!(f, "_v{version}")?;
        }
        Ok(())
    }
}

/// Whether `file_name` looks like a benchmark report (`_report*.csv`).
pub fn is_report_file_name(file_name: &str) -> bool {
    file_name.starts_with(REPORT_PREFIX)
        && file_name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext == REPORT_EXTENSION)
}
