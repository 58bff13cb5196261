//! Partitions a directory of benchmark inputs into size buckets.
//!
//! Files directly inside a source directory are classified with
//! [`FileSizeBucket::for_size`] and copied into one directory per bucket,
//! created next to the source directory. The originals are never modified.
//!
//! The work is split in two steps so the bucket assignment can be inspected
//! before anything is written:
//!
//! - [`collect_buckets`]: enumerate and classify (read-only).
//! - [`copy_files_to_buckets`]: create bucket directories and copy.
//!
//! [`segregate`] runs both.

use crate::bucket::FileSizeBucket;
use indexmap::IndexMap;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Errors raised while bucketing a directory.
#[derive(Debug, Error)]
pub enum SegregateError {
    #[error("Directory {} does not exist.", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to read directory entry: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to create bucket directory {}: {source}", path.display())]
    CreateBucketDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {} into {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Refusing to copy {} onto itself; the source directory is also a bucket directory.", path.display())]
    SameFile { path: PathBuf },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Where to read files from and where to put the bucket directories.
#[derive(Debug, Clone)]
pub struct SegregateOptions {
    /// Directory whose files are bucketed.
    pub source_dir: PathBuf,
    /// Directory in which bucket directories are created.
    /// If not specified, the parent of `source_dir` is used.
    pub output_dir: Option<PathBuf>,
}

impl SegregateOptions {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: None,
        }
    }

    /// Resolves the directory that receives the bucket directories.
    ///
    /// The source path is canonicalized first, so relative inputs such as `.`
    /// still resolve to their real parent. A source at the filesystem root
    /// has no parent and uses itself.
    pub fn bucket_root(&self) -> Result<PathBuf, SegregateError> {
        if let Some(output_dir) = &self.output_dir {
            return Ok(output_dir.clone());
        }

        let source = fs::canonicalize(&self.source_dir)?;
        Ok(match source.parent() {
            Some(parent) => parent.to_path_buf(),
            None => source,
        })
    }
}

/// Files of a directory grouped by bucket label, in first-seen order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BucketedFiles {
    /// Number of regular files found in the source directory.
    pub files_found: usize,
    /// Bucket label → paths of the files that belong to it.
    pub buckets: IndexMap<String, Vec<PathBuf>>,
}

impl BucketedFiles {
    /// Number of distinct buckets encountered.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Paths assigned to the bucket with the given label.
    pub fn files_in(&self, label: &str) -> &[PathBuf] {
        self.buckets.get(label).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Outcome of a completed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SegregationSummary {
    pub files_found: usize,
    pub files_copied: usize,
    /// Every bucket directory that received at least one file.
    pub bucket_dirs: Vec<PathBuf>,
}

/// Classifies every regular file directly inside `directory`.
///
/// Subdirectories are skipped and not descended into. Symbolic links are
/// followed, so a link to a regular file is bucketed by its target's size.
/// Files are visited in file name order.
///
/// # Errors
///
/// Returns [`SegregateError::NotADirectory`] if `directory` is not a directory,
/// or an error if an entry cannot be read.
pub fn collect_buckets(directory: &Path) -> Result<BucketedFiles, SegregateError> {
    if !directory.is_dir() {
        return Err(SegregateError::NotADirectory(directory.to_path_buf()));
    }

    let mut result = BucketedFiles::default();
    let walker = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            debug!("Skipping non-file entry: {}", entry.path().display());
            continue;
        }

        let size = entry.metadata()?.len();
        let bucket = FileSizeBucket::for_size(size);
        debug!(
            "Classified {} ({} bytes) into bucket {}",
            entry.path().display(),
            size,
            bucket
        );

        result.files_found += 1;
        result
            .buckets
            .entry(bucket.label())
            .or_default()
            .push(entry.into_path());
    }

    Ok(result)
}

/// Copies every file in `files` into `<bucket_root>/<label>/`.
///
/// Bucket directories are created if absent; existing contents are kept and
/// files with the same name are overwritten. The first failure aborts the
/// run; files copied before it stay in place.
///
/// # Errors
///
/// Returns [`SegregateError::SameFile`] before copying anything if a
/// destination resolves to its own source, as happens when the source
/// directory is itself named after a bucket (e.g. re-running on `<parent>/64`).
pub fn copy_files_to_buckets(
    bucket_root: &Path,
    files: &BucketedFiles,
) -> Result<SegregationSummary, SegregateError> {
    for (label, paths) in &files.buckets {
        let bucket_dir = bucket_root.join(label);
        for path in paths {
            let Some(file_name) = path.file_name() else {
                continue;
            };
            if is_same_file(path, &bucket_dir.join(file_name))? {
                return Err(SegregateError::SameFile { path: path.clone() });
            }
        }
    }

    let mut summary = SegregationSummary {
        files_found: files.files_found,
        ..Default::default()
    };

    for (label, paths) in &files.buckets {
        let bucket_dir = bucket_root.join(label);
        fs::create_dir_all(&bucket_dir).map_err(|source| SegregateError::CreateBucketDir {
            path: bucket_dir.clone(),
            source,
        })?;

        for path in paths {
            let Some(file_name) = path.file_name() else {
                warn!("Skipping path without a file name: {}", path.display());
                continue;
            };

            let destination = bucket_dir.join(file_name);
            fs::copy(path, &destination).map_err(|source| SegregateError::Copy {
                from: path.clone(),
                to: destination.clone(),
                source,
            })?;
            debug!("Copied {} -> {}", path.display(), destination.display());
            summary.files_copied += 1;
        }

        info!("Bucket {}: {} file(s)", label, paths.len());
        summary.bucket_dirs.push(bucket_dir);
    }

    Ok(summary)
}

/// Whether `destination` exists and resolves to the same file as `source`.
fn is_same_file(source: &Path, destination: &Path) -> io::Result<bool> {
    if !destination.exists() {
        return Ok(false);
    }
    Ok(fs::canonicalize(source)? == fs::canonicalize(destination)?)
}

/// Classifies the files of `options.source_dir` and copies them into bucket directories.
pub fn segregate(options: &SegregateOptions) -> Result<SegregationSummary, SegregateError> {
    let files = collect_buckets(&options.source_dir)?;
    let bucket_root = options.bucket_root()?;
    copy_files_to_buckets(&bucket_root, &files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, size: usize) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, vec![0xAB; size]).unwrap();
        path
    }

    /// Creates `<tmp>/source` and fills it with files of the given sizes.
    fn create_source(sizes: &[(&str, usize)]) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source");
        fs::create_dir(&source).unwrap();
        for (name, size) in sizes {
            write_file(&source, name, *size);
        }
        (tmp, source)
    }

    fn file_names(dir: &Path) -> BTreeSet<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn rejects_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing");
        assert!(matches!(
            collect_buckets(&missing),
            Err(SegregateError::NotADirectory(path)) if path == missing
        ));
    }

    #[test]
    fn rejects_file_as_source() {
        let tmp = TempDir::new().unwrap();
        let file = write_file(tmp.path(), "file.bin", 10);
        assert!(matches!(
            collect_buckets(&file),
            Err(SegregateError::NotADirectory(_))
        ));
    }

    #[test]
    fn groups_files_by_bucket_label() {
        let (_tmp, source) = create_source(&[
            ("a", 0),
            ("b", 1000),
            ("c", 70000),
            ("d", 200000),
            ("e", 5000000),
        ]);

        let files = collect_buckets(&source).unwrap();
        assert_eq!(files.files_found, 5);

        let labels: Vec<&str> = files.buckets.keys().map(String::as_str).collect();
        assert_eq!(labels, ["64", "64-128", "128-256", "4096-8192"]);
        assert_eq!(files.files_in("64").len(), 2);
        assert_eq!(files.files_in("4096-8192"), [source.join("e")]);
        assert!(files.files_in("256-512").is_empty());
    }

    #[test]
    fn skips_subdirectories() {
        let (_tmp, source) = create_source(&[("top.bin", 100)]);
        let nested = source.join("nested");
        fs::create_dir(&nested).unwrap();
        write_file(&nested, "inner.bin", 100);

        let files = collect_buckets(&source).unwrap();
        assert_eq!(files.files_found, 1);
        assert_eq!(files.files_in("64"), [source.join("top.bin")]);
    }

    #[test]
    fn copies_into_sibling_bucket_directories() {
        let (tmp, source) = create_source(&[
            ("small.txt", 10 * 1024),
            ("medium_a.txt", 100 * 1024),
            ("medium_b.txt", 100 * 1024),
        ]);

        let summary = segregate(&SegregateOptions::new(&source)).unwrap();
        assert_eq!(summary.files_found, 3);
        assert_eq!(summary.files_copied, 3);
        assert_eq!(summary.bucket_dirs.len(), 2);

        let root = fs::canonicalize(tmp.path()).unwrap();
        assert_eq!(file_names(&root.join("64")), BTreeSet::from([String::from("small.txt")]));
        assert_eq!(
            file_names(&root.join("64-128")),
            BTreeSet::from([String::from("medium_a.txt"), String::from("medium_b.txt")])
        );

        // Copies keep their contents.
        assert_eq!(fs::read(root.join("64-128/medium_a.txt")).unwrap().len(), 100 * 1024);
    }

    #[test]
    fn repeated_runs_leave_source_untouched() {
        let (tmp, source) = create_source(&[("a.bin", 1000), ("b.bin", 70000)]);
        let before = file_names(&source);

        let options = SegregateOptions::new(&source);
        let first = segregate(&options).unwrap();
        let second = segregate(&options).unwrap();

        assert_eq!(first.files_copied, 2);
        assert_eq!(second.files_copied, 2);
        assert_eq!(file_names(&source), before);

        // Second run adds its (identical) copies to the existing bucket contents.
        fs::write(tmp.path().join("64").join("extra.bin"), b"kept").unwrap();
        segregate(&options).unwrap();
        assert_eq!(
            file_names(&tmp.path().join("64")),
            BTreeSet::from([String::from("a.bin"), String::from("extra.bin")])
        );
        assert_eq!(file_names(&tmp.path().join("64-128")), BTreeSet::from([String::from("b.bin")]));
    }

    #[test]
    fn output_dir_overrides_parent() {
        let (tmp, source) = create_source(&[("a.bin", 1000)]);
        let output = tmp.path().join("buckets");

        let options = SegregateOptions {
            source_dir: source,
            output_dir: Some(output.clone()),
        };
        let summary = segregate(&options).unwrap();
        assert_eq!(summary.bucket_dirs, [output.join("64")]);
        assert!(output.join("64").join("a.bin").is_file());
        assert!(!tmp.path().join("64").exists());
    }

    #[test]
    fn source_named_after_its_bucket_is_not_truncated() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("64");
        fs::create_dir(&source).unwrap();
        write_file(&source, "a.bin", 1000);
        write_file(&source, "b.bin", 70000);

        let result = segregate(&SegregateOptions::new(&source));
        assert!(matches!(
            result,
            Err(SegregateError::SameFile { path }) if path == source.join("a.bin")
        ));

        // Nothing was copied, and the originals keep their contents.
        assert_eq!(fs::read(source.join("a.bin")).unwrap().len(), 1000);
        assert_eq!(fs::read(source.join("b.bin")).unwrap().len(), 70000);
        assert!(!tmp.path().join("64-128").exists());
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinks_to_files_and_skips_links_to_directories() {
        use std::os::unix::fs::symlink;

        let (tmp, source) = create_source(&[("plain.bin", 100)]);
        let target = write_file(tmp.path(), "target.bin", 70000);
        symlink(&target, source.join("linked.bin")).unwrap();
        let nested = tmp.path().join("nested");
        fs::create_dir(&nested).unwrap();
        symlink(&nested, source.join("linked_dir")).unwrap();

        let files = collect_buckets(&source).unwrap();
        assert_eq!(files.files_found, 2);
        assert_eq!(files.files_in("64-128"), [source.join("linked.bin")]);

        segregate(&SegregateOptions::new(&source)).unwrap();
        let copy = fs::canonicalize(tmp.path()).unwrap().join("64-128/linked.bin");
        assert!(!fs::symlink_metadata(&copy).unwrap().file_type().is_symlink());
        assert_eq!(fs::read(&copy).unwrap().len(), 70000);
    }

    #[test]
    fn empty_directory_copies_nothing() {
        let (_tmp, source) = create_source(&[]);
        let summary = segregate(&SegregateOptions::new(&source)).unwrap();
        assert_eq!(summary, SegregationSummary::default());
    }
}
