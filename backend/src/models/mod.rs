//! Domain models for the reconciliation core

pub mod event;
pub mod ledger;
pub mod observation;

// Re-exports
pub use event::{EventLog, IgnoreReason, ReconcileEvent};
pub use ledger::{PendingEntry, PendingLedger};
pub use observation::Observation;
