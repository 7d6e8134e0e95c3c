//! Pass-Through Meter Core - Rust Engine
//!
//! Reconciles readings from two correlated groups of monotonically
//! increasing energy counters (charge/discharge, import/export) that may
//! report the same physical energy flow redundantly and asynchronously.
//!
//! # Architecture
//!
//! - **units**: energy unit normalization to canonical watt-hours
//! - **delta**: delta extraction from raw counter readings
//! - **models**: domain types (PendingLedger, Observation, event log)
//! - **engine**: the reconciliation engine and its checkpointing
//!
//! # Critical Invariants
//!
//! 1. All energy values are i64 (watt-hours)
//! 2. The engine is single-writer: observations apply strictly in order
//! 3. FFI boundary is minimal and safe

// Module declarations
pub mod delta;
pub mod engine;
pub mod models;
pub mod units;

// Re-exports for convenience
pub use delta::{extract_delta, DeltaResult};
pub use engine::{
    LedgerSnapshot, MeterGroup, ObserveOutcome, ReconcileError, Reconciler, ReconcilerConfig,
    ReconcilerSnapshot,
};
pub use models::{
    event::{EventLog, IgnoreReason, ReconcileEvent},
    ledger::{PendingEntry, PendingLedger},
    observation::Observation,
};
pub use units::{EnergyUnit, UnitError};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn passthrough_meter_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::reconciler::PyReconciler>()?;
    Ok(())
}
