//! FFI boundary (PyO3)
//!
//! Python bindings for the reconciliation engine. The boundary stays
//! minimal: construct from a dict, feed observations, read totals,
//! round-trip snapshots as JSON.

pub mod reconciler;
pub mod types;
