//! Delta extraction from raw counter readings
//!
//! Sub-meters report raw cumulative readings as strings. This module
//! turns a (previous, current) reading pair into a canonical non-negative
//! watt-hour delta, or classifies why no delta could be produced.
//!
//! # Truncation order
//!
//! Each reading is truncated toward zero to an integer *before*
//! differencing. This matters near fractional boundaries: readings
//! `1.9 -> 2.9` yield `2 - 1 = 1`, not `trunc(2.9 - 1.9) = 1` by accident
//! of the values; `1.9 -> 2.1` yields `2 - 1 = 1` where
//! subtract-then-truncate would give 0. The truncate-then-subtract order
//! is the contract and is covered by tests.

use crate::units::EnergyUnit;

/// Outcome of extracting a delta from a reading pair
///
/// Only [`DeltaResult::Delta`] feeds the reconciliation engine; the other
/// variants describe recognized no-delta conditions so callers can log
/// them. None of them is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaResult {
    /// Canonical non-negative watt-hour delta (zero is valid)
    Delta(i64),
    /// One of the readings is absent (first observation of this meter)
    Missing,
    /// One of the readings failed to parse as a finite decimal
    Malformed,
    /// The counter decreased (reset or rollback); the report is dropped
    Reset,
}

impl DeltaResult {
    /// Get the delta if one was produced
    pub fn delta(&self) -> Option<i64> {
        match self {
            DeltaResult::Delta(d) => Some(*d),
            _ => None,
        }
    }
}

/// Parse a raw reading and truncate it toward zero
///
/// Non-finite parses (NaN, infinities) count as malformed, matching the
/// behavior of integer conversion in the upstream event producers.
fn truncate_reading(raw: &str) -> Option<i64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value as i64)
}

/// Extract a canonical watt-hour delta from consecutive raw readings
///
/// Readings are parsed as decimals, truncated toward zero, and differenced
/// in that order. Absent or unparseable readings and negative differences
/// produce the corresponding no-delta variant; otherwise the difference is
/// normalized with the declared unit of the *new* reading.
///
/// # Example
/// ```
/// use passthrough_meter_core_rs::delta::{extract_delta, DeltaResult};
/// use passthrough_meter_core_rs::EnergyUnit;
///
/// let d = extract_delta(Some("1"), Some("2"), EnergyUnit::KilowattHour);
/// assert_eq!(d, DeltaResult::Delta(1_000));
///
/// let d = extract_delta(Some("100"), Some("40"), EnergyUnit::WattHour);
/// assert_eq!(d, DeltaResult::Reset);
/// ```
pub fn extract_delta(
    previous: Option<&str>,
    current: Option<&str>,
    unit: EnergyUnit,
) -> DeltaResult {
    let (previous, current) = match (previous, current) {
        (Some(p), Some(c)) => (p, c),
        _ => return DeltaResult::Missing,
    };

    let old = match truncate_reading(previous) {
        Some(v) => v,
        None => return DeltaResult::Malformed,
    };
    let new = match truncate_reading(current) {
        Some(v) => v,
        None => return DeltaResult::Malformed,
    };

    // Readings can parse to values near the i64 limits (truncation
    // saturates), so the difference and the unit scaling stay checked;
    // out-of-range values are malformed, never a panic.
    let raw_delta = match new.checked_sub(old) {
        Some(d) => d,
        None => return DeltaResult::Malformed,
    };
    if raw_delta < 0 {
        return DeltaResult::Reset;
    }

    match unit.checked_normalize(raw_delta) {
        Some(delta) => DeltaResult::Delta(delta),
        None => DeltaResult::Malformed,
    }
}
