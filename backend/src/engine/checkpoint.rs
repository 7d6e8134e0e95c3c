//! Snapshot save/restore for the reconciliation engine
//!
//! Enables a host to persist the complete per-pairing state (both
//! ledgers, pass-through counter, sequence position) and resume from it
//! after a restart.
//!
//! # Critical Invariants
//!
//! - **Config matching**: a snapshot restores only against a config with
//!   the same key sets; the SHA-256 hash pins the structural part of the
//!   config (key sets), not the seeds, so hosts can keep passing their
//!   usual construction config
//! - **Fidelity**: restore reproduces totals, carry, and pending queues
//!   exactly; reconciliation resumes as if the process never stopped

use super::{ReconcileError, Reconciler, ReconcilerConfig};
use crate::models::ledger::{PendingEntry, PendingLedger};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use uuid::Uuid;

/// SHA-256 over both key sets, in set order
pub(crate) fn config_hash(
    input_keys: &BTreeSet<String>,
    output_keys: &BTreeSet<String>,
) -> String {
    let mut hasher = Sha256::new();
    for key in input_keys {
        hasher.update(key.as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(b"--\n");
    for key in output_keys {
        hasher.update(key.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

/// One group's ledger state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub committed: i64,
    pub carry: i64,
    pub pending: Vec<PendingEntry>,
    pub corroborators: BTreeSet<String>,
}

impl From<&PendingLedger> for LedgerSnapshot {
    fn from(ledger: &PendingLedger) -> Self {
        LedgerSnapshot {
            committed: ledger.committed(),
            carry: ledger.carry(),
            pending: ledger.pending().to_vec(),
            corroborators: ledger.corroborators().clone(),
        }
    }
}

impl From<LedgerSnapshot> for PendingLedger {
    fn from(snapshot: LedgerSnapshot) -> Self {
        PendingLedger::from_parts(
            snapshot.corroborators,
            snapshot.committed,
            snapshot.carry,
            snapshot.pending,
        )
    }
}

/// Complete engine state snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerSnapshot {
    /// Pairing this snapshot belongs to
    pub pairing_id: Uuid,
    /// Observation sequence position
    pub seq: u64,
    /// Pass-through total at snapshot time
    pub pass_through: i64,
    /// Input group ledger
    pub input: LedgerSnapshot,
    /// Output group ledger
    pub output: LedgerSnapshot,
    /// Hash of the originating key sets (for restore validation)
    pub config_hash: String,
}

impl ReconcilerSnapshot {
    /// Encode as JSON for text-based persistence
    pub fn to_json(&self) -> Result<String, ReconcileError> {
        serde_json::to_string(self).map_err(|e| ReconcileError::SnapshotEncode(e.to_string()))
    }

    /// Decode from JSON produced by [`to_json`](Self::to_json)
    pub fn from_json(json: &str) -> Result<Self, ReconcileError> {
        serde_json::from_str(json).map_err(|e| ReconcileError::SnapshotDecode(e.to_string()))
    }
}

impl Reconciler {
    /// Capture the complete engine state
    ///
    /// The event log is not part of the snapshot; hosts that want event
    /// history persist it separately.
    pub fn snapshot(&self) -> ReconcilerSnapshot {
        ReconcilerSnapshot {
            pairing_id: self.pairing_id,
            seq: self.seq,
            pass_through: self.pass_through,
            input: LedgerSnapshot::from(&self.input),
            output: LedgerSnapshot::from(&self.output),
            config_hash: self.config_hash.clone(),
        }
    }

    /// Rebuild an engine from a snapshot
    ///
    /// `config` supplies the key sets (validated as in [`Reconciler::new`]);
    /// all state comes from the snapshot, so the config's seeds are
    /// ignored. Fails when the snapshot was taken for different key sets.
    pub fn restore(
        config: ReconcilerConfig,
        snapshot: ReconcilerSnapshot,
    ) -> Result<Self, ReconcileError> {
        let mut engine = Reconciler::new(config)?;
        if engine.config_hash != snapshot.config_hash {
            return Err(ReconcileError::SnapshotConfigMismatch {
                expected: snapshot.config_hash,
                found: engine.config_hash,
            });
        }

        engine.pairing_id = snapshot.pairing_id;
        engine.seq = snapshot.seq;
        engine.pass_through = snapshot.pass_through;
        engine.input = snapshot.input.into();
        engine.output = snapshot.output.into();
        Ok(engine)
    }
}
