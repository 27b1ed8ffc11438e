//! Recording storage capacity.

use crate::error::{ensure_non_negative, ensure_record_hours, ensure_retention, SizingResult};
use crate::model::{round2, CameraGroup};

/// Seconds per hour (3600.0).
pub const SECS_PER_HOUR: f64 = 3600.0;
/// Bits per byte.
pub const BITS_PER_BYTE: f64 = 8.0;
/// Bytes per terabyte (decimal, 10^12).
pub const BYTES_PER_TB: f64 = 1e12;

/// Computes the recording storage required by a site, in **terabytes (TB, base-10)**.
///
/// # Parameters
///
/// - `total_bandwidth_mbps`: Aggregate bandwidth of all cameras, in Mbps.
/// - `retention_days`: Days footage must stay available. Must be `>= 1`.
/// - `record_hours`: Hours per day the cameras record. Must be within `[0, 24]`.
///
/// # Errors
///
/// Returns [`SizingError::InvalidSizingInput`](crate::SizingError::InvalidSizingInput) if:
///
/// - `retention_days` is `0`
/// - `record_hours` is outside `[0, 24]`
/// - `total_bandwidth_mbps` is negative or not finite
///
/// # Formulas
///
/// ```text
/// bytes_per_day = total_bandwidth_mbps * 10^6 / 8 * 3600 * record_hours
/// storage_tb    = bytes_per_day * retention_days / 10^12
/// ```
///
/// The result is rounded to 2 decimals.
///
/// # Examples
///
/// ```
/// use vms_sizer::storage_tb;
///
/// // 100 Mbps around the clock for 30 days.
/// let tb = storage_tb(100.0, 30, 24.0).unwrap();
/// assert!((tb - 32.4).abs() < 1e-9);
/// ```
pub fn storage_tb(
    total_bandwidth_mbps: f64,
    retention_days: u32,
    record_hours: f64,
) -> SizingResult<f64> {
    ensure_non_negative(total_bandwidth_mbps, "total_bandwidth_mbps")?;
    ensure_retention(retention_days)?;
    ensure_record_hours(record_hours)?;

    let bytes_per_sec = total_bandwidth_mbps * 1e6 / BITS_PER_BYTE;
    let bytes_per_day = bytes_per_sec * SECS_PER_HOUR * record_hours;
    let total_bytes = bytes_per_day * retention_days as f64;

    Ok(round2(total_bytes / BYTES_PER_TB))
}

/// Longest retention across groups; storage must hold the longest-kept stream.
pub fn governing_retention_days(groups: &[CameraGroup]) -> Option<u32> {
    groups.iter().map(|g| g.retention_days).max()
}

/// Longest daily recording schedule across groups.
pub fn governing_record_hours(groups: &[CameraGroup]) -> Option<f64> {
    groups.iter().map(|g| g.record_hour).reduce(f64::max)
}
