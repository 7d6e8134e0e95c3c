//! Energy unit normalization
//!
//! All ledger arithmetic runs on integer watt-hours. Sub-meters declare
//! their readings in one of a fixed set of units; this module converts
//! declared-unit deltas into the canonical smallest unit.
//!
//! # Critical Invariants
//!
//! 1. All energy values are i64 (watt-hours)
//! 2. The unit set is closed: anything outside it is a hard error, never
//!    a silent pass-through

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while resolving a declared unit
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitError {
    #[error("unrecognized energy unit: {0}")]
    Unrecognized(String),
}

/// Energy unit a sub-meter declares its readings in
///
/// The set is closed on purpose: an observation declaring any other unit
/// is dropped upstream with a [`UnitError`], it is never guessed at.
///
/// # Example
/// ```
/// use passthrough_meter_core_rs::EnergyUnit;
///
/// assert_eq!(EnergyUnit::KilowattHour.normalize(2), 2_000);
/// assert_eq!("Wh".parse::<EnergyUnit>(), Ok(EnergyUnit::WattHour));
/// assert!("BTU".parse::<EnergyUnit>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyUnit {
    /// Watt-hour ("Wh"), the canonical smallest unit
    WattHour,
    /// Kilowatt-hour ("kWh"), x1,000
    KilowattHour,
    /// Megawatt-hour ("MWh"), x1,000,000
    MegawattHour,
}

impl EnergyUnit {
    /// Multiplier from this unit to canonical watt-hours
    pub fn multiplier(&self) -> i64 {
        match self {
            EnergyUnit::WattHour => 1,
            EnergyUnit::KilowattHour => 1_000,
            EnergyUnit::MegawattHour => 1_000_000,
        }
    }

    /// Convert a delta expressed in this unit into canonical watt-hours
    ///
    /// # Example
    /// ```
    /// use passthrough_meter_core_rs::EnergyUnit;
    ///
    /// assert_eq!(EnergyUnit::WattHour.normalize(5), 5);
    /// assert_eq!(EnergyUnit::MegawattHour.normalize(3), 3_000_000);
    /// ```
    pub fn normalize(&self, value: i64) -> i64 {
        value * self.multiplier()
    }

    /// Overflow-checked [`normalize`](Self::normalize)
    ///
    /// Used on paths fed by external readings, where a parseable value can
    /// still be too large to scale into watt-hours.
    pub fn checked_normalize(&self, value: i64) -> Option<i64> {
        value.checked_mul(self.multiplier())
    }

    /// The wire symbol sub-meters report this unit as
    pub fn symbol(&self) -> &'static str {
        match self {
            EnergyUnit::WattHour => "Wh",
            EnergyUnit::KilowattHour => "kWh",
            EnergyUnit::MegawattHour => "MWh",
        }
    }
}

impl FromStr for EnergyUnit {
    type Err = UnitError;

    /// Parse a wire unit symbol, case-sensitive (matches the symbols the
    /// upstream event stream carries)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Wh" => Ok(EnergyUnit::WattHour),
            "kWh" => Ok(EnergyUnit::KilowattHour),
            "MWh" => Ok(EnergyUnit::MegawattHour),
            other => Err(UnitError::Unrecognized(other.to_string())),
        }
    }
}

impl fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipliers() {
        assert_eq!(EnergyUnit::WattHour.multiplier(), 1);
        assert_eq!(EnergyUnit::KilowattHour.multiplier(), 1_000);
        assert_eq!(EnergyUnit::MegawattHour.multiplier(), 1_000_000);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(EnergyUnit::WattHour.normalize(0), 0);
        assert_eq!(EnergyUnit::KilowattHour.normalize(1), 1_000);
        assert_eq!(EnergyUnit::MegawattHour.normalize(2), 2_000_000);
    }

    #[test]
    fn test_checked_normalize_rejects_overflow() {
        assert_eq!(EnergyUnit::KilowattHour.checked_normalize(7), Some(7_000));
        assert_eq!(EnergyUnit::KilowattHour.checked_normalize(i64::MAX), None);
        assert_eq!(EnergyUnit::MegawattHour.checked_normalize(i64::MAX / 2), None);
    }

    #[test]
    fn test_parse_known_symbols() {
        assert_eq!("Wh".parse::<EnergyUnit>(), Ok(EnergyUnit::WattHour));
        assert_eq!("kWh".parse::<EnergyUnit>(), Ok(EnergyUnit::KilowattHour));
        assert_eq!("MWh".parse::<EnergyUnit>(), Ok(EnergyUnit::MegawattHour));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(
            "WH".parse::<EnergyUnit>(),
            Err(UnitError::Unrecognized("WH".to_string()))
        );
        assert_eq!(
            "KWH".parse::<EnergyUnit>(),
            Err(UnitError::Unrecognized("KWH".to_string()))
        );
    }

    #[test]
    fn test_parse_unknown_symbol() {
        let err = "J".parse::<EnergyUnit>().unwrap_err();
        assert_eq!(err, UnitError::Unrecognized("J".to_string()));
    }

    #[test]
    fn test_symbol_round_trip() {
        for unit in [
            EnergyUnit::WattHour,
            EnergyUnit::KilowattHour,
            EnergyUnit::MegawattHour,
        ] {
            assert_eq!(unit.symbol().parse::<EnergyUnit>(), Ok(unit));
        }
    }
}
