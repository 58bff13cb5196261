//! Classifies file sizes into power-of-two buckets.
//!
//! Benchmark corpora are split into groups of similarly sized files so that
//! compression results can be compared between files of comparable size.
//!
//! # Bucket Layout
//!
//! - Files under 64 KiB land in the catch-all bucket labelled `64`.
//! - Every other bucket spans `[N KiB, 2N KiB)` where `N` is a power of two
//!   starting at 64, and is labelled `N-2N` (e.g. `64-128`, `128-256`).
//!
//! A size exactly on a boundary belongs to the bucket that starts there, so
//! 65536 bytes is classified as `64-128`.
//!
//! # Example
//!
//! ```
//! use brotli_report_analyzer::bucket::{classify, FileSizeBucket};
//!
//! assert_eq!(classify(1000), "64");
//! assert_eq!(classify(65536), "64-128");
//!
//! let bucket = FileSizeBucket::for_size(200_000);
//! assert_eq!(bucket.label(), "128-256");
//! assert!(bucket.contains(200_000));
//! ```

use core::fmt;
use core::str::FromStr;
use thiserror::Error;

/// Upper bound of the catch-all bucket, and lower bound of the first
/// doubling bucket, in KiB.
pub const MIN_BUCKET_KIB: u64 = 64;

const KIB: u64 = 1024;

/// A contiguous range of file sizes, as produced by [`FileSizeBucket::for_size`].
///
/// Bounds are stored in KiB so the topmost bucket can be represented without
/// overflowing a [`u64`] byte count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileSizeBucket {
    /// Inclusive lower bound in KiB. Zero for the catch-all bucket.
    lower_kib: u64,
    /// Exclusive upper bound in KiB.
    upper_kib: u64,
}

/// Error returned when a string is not a valid bucket label.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BucketLabelError {
    #[error("Bucket label `{0}` is not of the form `64` or `N-2N`")]
    Malformed(String),

    #[error("Bucket label `{0}` does not start at a power of two of at least 64 KiB")]
    InvalidLowerBound(String),

    #[error("Bucket label `{0}` must end at exactly twice its start")]
    InvalidUpperBound(String),
}

impl FileSizeBucket {
    /// The catch-all bucket holding every file under 64 KiB.
    pub const SMALLEST: Self = Self {
        lower_kib: 0,
        upper_kib: MIN_BUCKET_KIB,
    };

    /// Returns the bucket a file of `size_bytes` belongs to.
    pub fn for_size(size_bytes: u64) -> Self {
        if size_bytes < MIN_BUCKET_KIB * KIB {
            return Self::SMALLEST;
        }

        let mut bucket_start = MIN_BUCKET_KIB;
        // A start whose byte count overflows is past every representable size.
        while bucket_start
            .checked_mul(KIB)
            .is_some_and(|start_bytes| start_bytes <= size_bytes)
        {
            bucket_start *= 2;
        }

        let bucket_end = bucket_start;
        bucket_start /= 2;
        Self {
            lower_kib: bucket_start,
            upper_kib: bucket_end,
        }
    }

    /// Inclusive lower bound in bytes.
    pub fn lower_bound_bytes(&self) -> u64 {
        self.lower_kib * KIB
    }

    /// Exclusive upper bound in bytes, saturating at [`u64::MAX`] for the topmost bucket.
    pub fn upper_bound_bytes(&self) -> u64 {
        self.upper_kib.saturating_mul(KIB)
    }

    /// Inclusive lower bound in KiB.
    pub fn lower_bound_kib(&self) -> u64 {
        self.lower_kib
    }

    /// Exclusive upper bound in KiB.
    pub fn upper_bound_kib(&self) -> u64 {
        self.upper_kib
    }

    /// Whether this is the catch-all bucket for files under 64 KiB.
    pub fn is_smallest(&self) -> bool {
        self.lower_kib == 0
    }

    /// Whether a file of `size_bytes` falls inside this bucket.
    pub fn contains(&self, size_bytes: u64) -> bool {
        let size = size_bytes as u128;
        let lower = self.lower_kib as u128 * KIB as u128;
        let upper = self.upper_kib as u128 * KIB as u128;
        size >= lower && size < upper
    }

    /// The directory-friendly label of this bucket, in KiB.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FileSizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_smallest() {
            write!(f, "{}", self.upper_kib)
        } else {
            write!(f, "{}-{}", self.lower_kib, self.upper_kib)
        }
    }
}

impl FromStr for FileSizeBucket {
    type Err = BucketLabelError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let malformed = || BucketLabelError::Malformed(label.to_string());

        let Some((start, end)) = label.split_once('-') else {
            return match label.parse::<u64>() {
                Ok(MIN_BUCKET_KIB) => Ok(Self::SMALLEST),
                _ => Err(malformed()),
            };
        };

        let start: u64 = start.parse().map_err(|_| malformed())?;
        let end: u64 = end.parse().map_err(|_| malformed())?;

        if start < MIN_BUCKET_KIB || !start.is_power_of_two() {
            return Err(BucketLabelError::InvalidLowerBound(label.to_string()));
        }
        if start.checked_mul(2) != Some(end) {
            return Err(BucketLabelError::InvalidUpperBound(label.to_string()));
        }

        Ok(Self {
            lower_kib: start,
            upper_kib: end,
        })
    }
}

/// Returns the bucket label for a file of `size_bytes`.
///
/// Shorthand for `FileSizeBucket::for_size(size_bytes).label()`.
pub fn classify(size_bytes: u64) -> String {
    FileSizeBucket::for_size(size_bytes).label()
}
