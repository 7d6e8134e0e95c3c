//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and PyO3-compatible types (PyDict etc.)

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use uuid::Uuid;

use crate::engine::{ObserveOutcome, ReconcilerConfig};
use crate::models::event::IgnoreReason;

/// Extract a required field from a Python dict with a clear error message
pub fn extract_required<'py, T: FromPyObject<'py>>(
    dict: &Bound<'py, PyDict>,
    key: &str,
) -> PyResult<T> {
    match dict.get_item(key)? {
        Some(value) => value
            .extract()
            .map_err(|e| PyValueError::new_err(format!("invalid value for '{}': {}", key, e))),
        None => Err(PyValueError::new_err(format!(
            "missing required field: '{}'",
            key
        ))),
    }
}

/// Extract an optional field, falling back to a default when absent
pub fn extract_or<'py, T: FromPyObject<'py>>(
    dict: &Bound<'py, PyDict>,
    key: &str,
    default: T,
) -> PyResult<T> {
    match dict.get_item(key)? {
        Some(value) if !value.is_none() => value
            .extract()
            .map_err(|e| PyValueError::new_err(format!("invalid value for '{}': {}", key, e))),
        _ => Ok(default),
    }
}

/// Parse a `ReconcilerConfig` out of a Python dict
///
/// Expected shape:
///
/// ```python
/// {
///     "input_keys": ["meter_in_1", "meter_in_2"],
///     "output_keys": ["meter_out_1"],
///     "seed_input": 0,          # optional
///     "seed_output": 0,         # optional
///     "seed_pass_through": 0,   # optional
///     "pairing_id": "…uuid…",   # optional
/// }
/// ```
pub fn parse_reconciler_config(dict: &Bound<'_, PyDict>) -> PyResult<ReconcilerConfig> {
    let pairing_id: Option<String> = extract_or(dict, "pairing_id", None)?;
    let pairing_id = match pairing_id {
        Some(raw) => Some(
            Uuid::parse_str(&raw)
                .map_err(|e| PyValueError::new_err(format!("invalid pairing_id: {}", e)))?,
        ),
        None => None,
    };

    Ok(ReconcilerConfig {
        input_keys: extract_required(dict, "input_keys")?,
        output_keys: extract_required(dict, "output_keys")?,
        seed_input: extract_or(dict, "seed_input", 0)?,
        seed_output: extract_or(dict, "seed_output", 0)?,
        seed_pass_through: extract_or(dict, "seed_pass_through", 0)?,
        pairing_id,
    })
}

fn ignore_reason_str(reason: IgnoreReason) -> &'static str {
    match reason {
        IgnoreReason::MissingReading => "missing_reading",
        IgnoreReason::MalformedReading => "malformed_reading",
        IgnoreReason::CounterReset => "counter_reset",
    }
}

/// Convert an `ObserveOutcome` into a Python dict
pub fn outcome_to_py(py: Python, outcome: &ObserveOutcome) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    match outcome {
        ObserveOutcome::Applied {
            group,
            delta,
            recognized,
            residual,
        } => {
            dict.set_item("status", "applied")?;
            dict.set_item("group", group.as_str())?;
            dict.set_item("delta", delta)?;
            dict.set_item("recognized", recognized)?;
            dict.set_item("residual", residual)?;
        }
        ObserveOutcome::Ignored(reason) => {
            dict.set_item("status", "ignored")?;
            dict.set_item("reason", ignore_reason_str(*reason))?;
        }
    }
    Ok(dict.unbind())
}
