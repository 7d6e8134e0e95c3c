//! PyO3 wrapper for the reconciliation engine
//!
//! This module provides the Python interface to the Rust engine.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{outcome_to_py, parse_reconciler_config};
use crate::engine::{MeterGroup, Reconciler as RustReconciler, ReconcilerSnapshot};
use crate::units::EnergyUnit;

/// Python wrapper for the Rust `Reconciler`
///
/// # Example (from Python)
///
/// ```python
/// from passthrough_meter_core_rs import Reconciler
///
/// engine = Reconciler.new({
///     "input_keys": ["sensor.battery_in"],
///     "output_keys": ["sensor.battery_out"],
/// })
///
/// engine.observe("sensor.battery_in", "0", "5", "Wh")
/// engine.observe("sensor.battery_out", "0", "5", "Wh")
/// print(engine.pass_through())  # 5
/// ```
#[pyclass(name = "Reconciler")]
pub struct PyReconciler {
    inner: RustReconciler,
}

#[pymethods]
impl PyReconciler {
    /// Create a new engine from a configuration dict
    ///
    /// # Errors
    ///
    /// Raises ValueError for missing/invalid fields or an invalid pairing
    /// configuration (empty group, overlapping key, negative seed).
    #[staticmethod]
    fn new(config: &Bound<'_, PyDict>) -> PyResult<Self> {
        let rust_config = parse_reconciler_config(config)?;
        let inner = RustReconciler::new(rust_config)
            .map_err(|e| PyValueError::new_err(format!("failed to create reconciler: {}", e)))?;
        Ok(PyReconciler { inner })
    }

    /// Apply one raw reading pair
    ///
    /// # Returns
    ///
    /// Dict describing the outcome:
    /// - applied: `{"status": "applied", "group", "delta", "recognized", "residual"}`
    /// - ignored: `{"status": "ignored", "reason"}`
    ///
    /// # Errors
    ///
    /// Raises ValueError for an unrecognized unit symbol; state is left
    /// untouched in that case.
    #[pyo3(signature = (key, previous, current, unit))]
    fn observe(
        &mut self,
        py: Python,
        key: &str,
        previous: Option<&str>,
        current: Option<&str>,
        unit: &str,
    ) -> PyResult<Py<PyDict>> {
        let unit: EnergyUnit = unit
            .parse()
            .map_err(|e| PyValueError::new_err(format!("{}", e)))?;
        let outcome = self.inner.observe(key, previous, current, unit);
        outcome_to_py(py, &outcome)
    }

    /// Input group running total in watt-hours
    fn total_input(&self) -> i64 {
        self.inner.total_input()
    }

    /// Output group running total in watt-hours
    fn total_output(&self) -> i64 {
        self.inner.total_output()
    }

    /// Corroborated pass-through total in watt-hours
    fn pass_through(&self) -> i64 {
        self.inner.pass_through()
    }

    /// Number of observations seen
    fn seq(&self) -> u64 {
        self.inner.seq()
    }

    /// Stable pairing id as a string
    fn pairing_id(&self) -> String {
        self.inner.pairing_id().to_string()
    }

    /// Number of unsettled entries on a group's ledger ("input"/"output")
    fn pending_depth(&self, group: &str) -> PyResult<usize> {
        let group = match group {
            "input" => MeterGroup::Input,
            "output" => MeterGroup::Output,
            other => {
                return Err(PyValueError::new_err(format!(
                    "unknown group: '{}' (expected 'input' or 'output')",
                    other
                )))
            }
        };
        Ok(self.inner.pending_depth(group))
    }

    /// Capture the complete engine state as JSON
    fn snapshot_json(&self) -> PyResult<String> {
        self.inner
            .snapshot()
            .to_json()
            .map_err(|e| PyRuntimeError::new_err(format!("{}", e)))
    }

    /// Rebuild an engine from a config dict and a snapshot JSON string
    #[staticmethod]
    fn restore_json(config: &Bound<'_, PyDict>, snapshot: &str) -> PyResult<Self> {
        let rust_config = parse_reconciler_config(config)?;
        let snapshot = ReconcilerSnapshot::from_json(snapshot)
            .map_err(|e| PyValueError::new_err(format!("{}", e)))?;
        let inner = RustReconciler::restore(rust_config, snapshot)
            .map_err(|e| PyValueError::new_err(format!("{}", e)))?;
        Ok(PyReconciler { inner })
    }
}
