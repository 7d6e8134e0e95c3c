//! Wire-level sub-meter observation
//!
//! One record per raw counter update, exactly as the ingestion boundary
//! delivers it: readings still strings, unit still the declared wire
//! symbol. The engine's [`apply`](crate::engine::Reconciler::apply)
//! resolves both.

use serde::{Deserialize, Serialize};

/// A raw counter update from one sub-meter
///
/// `previous` and `current` are optional because a meter's first report
/// has no prior reading, and transient sensor glitches can drop either
/// side.
///
/// # Example
/// ```
/// use passthrough_meter_core_rs::Observation;
///
/// let obs: Observation = serde_json::from_str(
///     r#"{"key": "meter_in_1", "previous": "1.0", "current": "2.5", "unit": "kWh"}"#,
/// ).unwrap();
/// assert_eq!(obs.key, "meter_in_1");
/// assert_eq!(obs.unit, "kWh");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Stable identifier of the reporting sub-meter
    pub key: String,
    /// Prior raw reading, absent on first observation
    #[serde(default)]
    pub previous: Option<String>,
    /// New raw reading
    #[serde(default)]
    pub current: Option<String>,
    /// Declared unit symbol ("Wh", "kWh", "MWh")
    pub unit: String,
}

impl Observation {
    /// Convenience constructor for hosts assembling observations in code
    pub fn new(
        key: impl Into<String>,
        previous: Option<&str>,
        current: Option<&str>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            previous: previous.map(|s| s.to_string()),
            current: current.map(|s| s.to_string()),
            unit: unit.into(),
        }
    }
}
