//! Scan interval bounds.

use std::time::Duration;

/// Shortest allowed polling interval, in seconds.
pub const MIN_SCAN_INTERVAL_SECS: u64 = 30;

/// Longest allowed polling interval, in seconds.
pub const MAX_SCAN_INTERVAL_SECS: u64 = 600;

/// Interval used when configuration does not give one.
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 60;

/// Error returned for an interval outside the allowed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error(
    "scan interval {secs}s out of range ({}-{}s)",
    MIN_SCAN_INTERVAL_SECS,
    MAX_SCAN_INTERVAL_SECS
)]
pub struct InvalidScanInterval {
    secs: u64,
}

/// A polling interval, validated against the allowed bounds at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScanInterval(u64);

impl ScanInterval {
    pub fn from_secs(secs: u64) -> Result<Self, InvalidScanInterval> {
        if (MIN_SCAN_INTERVAL_SECS..=MAX_SCAN_INTERVAL_SECS).contains(&secs) {
            Ok(Self(secs))
        } else {
            Err(InvalidScanInterval { secs })
        }
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for ScanInterval {
    fn default() -> Self {
        Self(DEFAULT_SCAN_INTERVAL_SECS)
    }
}
