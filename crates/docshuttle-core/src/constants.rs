//! Shared constants.

use chrono::Duration;

/// Fixed retention window for converted files. Not configurable per file:
/// `expires_at` is always exactly `created_at + RETENTION_HOURS`.
pub const RETENTION_HOURS: i64 = 24;

/// Default interval between expiry sweeps, in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// File extension produced by the converter.
pub const OUTPUT_EXTENSION: &str = "docx";

/// Retention window as a [`chrono::Duration`].
pub fn retention() -> Duration {
    Duration::hours(RETENTION_HOURS)
}
