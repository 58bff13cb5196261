//! Builds reports directly from directories of compressed files.
//!
//! Used when no CSV report exists: the compressed outputs of a run are
//! measured on disk, and only the [`Metric::CompressedSize`] is available.
//!
//! [`Metric::CompressedSize`]: super::Metric::CompressedSize

use super::{params::ReportParams, FileSummary, Report, ReportError};
use std::{ffi::OsStr, path::Path};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Extension of Brotli compressed files.
pub const DEFAULT_COMPRESSED_EXTENSION: &str = "br";

/// Marker preceding the configuration in benchmark output directory names.
const COMPRESSED_MARKER: &str = "compressed_";

/// Derives a report label from an output directory name.
///
/// `test_data_compressed_c6_w16` → `c6_w16`. Names without the marker are
/// returned unchanged.
pub fn label_from_dir_name(dir_name: &str) -> &str {
    match dir_name.rfind(COMPRESSED_MARKER) {
        Some(idx) if idx + COMPRESSED_MARKER.len() < dir_name.len() => {
            &dir_name[idx + COMPRESSED_MARKER.len()..]
        }
        _ => dir_name,
    }
}

/// Summarises the files with the given `extension` directly inside `directory`.
///
/// Each file becomes a [`FileSummary`] keyed by its file name, with its size
/// on disk as the compressed size.
///
/// # Errors
///
/// Fails if `directory` is not a directory, an entry cannot be read, or no
/// file has the requested extension.
pub fn summarize_compressed_dir(directory: &Path, extension: &str) -> Result<Report, ReportError> {
    if !directory.is_dir() {
        return Err(ReportError::NotADirectory(directory.to_path_buf()));
    }

    let dir_name = directory
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| directory.display().to_string());
    let label = label_from_dir_name(&dir_name).to_string();
    let params = ReportParams::parse_tokens(&label);

    let mut report = Report::new(label, params);
    let walker = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension() != Some(OsStr::new(extension)) {
            continue;
        }

        let size = entry.metadata()?.len();
        let file_name = entry.file_name().to_string_lossy().into_owned();
        debug!("Measured {} ({} bytes)", path.display(), size);
        report.insert(FileSummary::from_compressed_size(file_name, size));
    }

    if report.is_empty() {
        return Err(ReportError::Empty(report.label));
    }

    info!(
        "Measured {} compressed file(s) in {}",
        report.len(),
        directory.display()
    );
    Ok(report)
}
