//! Reconciliation engine
//!
//! Owns the per-pairing state triple: the input group's pending ledger,
//! the output group's pending ledger, and the pass-through counter. Every
//! observation is a complete, synchronous transition from one consistent
//! triple to the next.
//!
//! # Serialization contract
//!
//! The engine is logically single-writer: observations must be applied in
//! arrival order, because cancellation is defined oldest-pending-first and
//! the carry buffer's borrow/return pairing depends on sequential
//! application. The engine holds only owned data and defines no locking of
//! its own; a host that ingests concurrently wraps it in its own mutex or
//! actor.
//!
//! # Critical Invariants
//!
//! 1. `pass_through()` never decreases
//! 2. Each ledger's committed total never decreases
//! 3. `total_input() + pass_through()` and `total_output() + pass_through()`
//!    never decrease (a group's raw total alone dips exactly when pending
//!    energy is reclassified as pass-through)
//! 4. A failed or ignored observation leaves all state untouched

pub mod checkpoint;

use crate::delta::{extract_delta, DeltaResult};
use crate::models::event::{EventLog, IgnoreReason, ReconcileEvent};
use crate::models::ledger::PendingLedger;
use crate::models::observation::Observation;
use crate::units::{EnergyUnit, UnitError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub use checkpoint::{LedgerSnapshot, ReconcilerSnapshot};

/// Which side of the pairing a sub-meter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeterGroup {
    /// Charge / import side
    Input,
    /// Discharge / export side
    Output,
}

impl MeterGroup {
    /// Lowercase name used in errors and FFI dictionaries
    pub fn as_str(&self) -> &'static str {
        match self {
            MeterGroup::Input => "input",
            MeterGroup::Output => "output",
        }
    }
}

impl fmt::Display for MeterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from engine construction and snapshot restore
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("{group} group has no sub-meter keys")]
    EmptyGroup { group: MeterGroup },

    #[error("sub-meter key {key} is configured in both groups")]
    OverlappingKey { key: String },

    #[error("seed for {field} is negative: {value}")]
    NegativeSeed { field: &'static str, value: i64 },

    #[error("unit error: {0}")]
    Unit(#[from] UnitError),

    #[error("snapshot was taken for a different pairing config (expected hash {expected}, found {found})")]
    SnapshotConfigMismatch { expected: String, found: String },

    #[error("snapshot encode failed: {0}")]
    SnapshotEncode(String),

    #[error("snapshot decode failed: {0}")]
    SnapshotDecode(String),
}

/// Static configuration of one meter pairing
///
/// The two key sets are the pairing's sub-meters; the seeds restore
/// committed totals from whatever persistence the host provides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Charge-side sub-meter keys (non-empty)
    pub input_keys: Vec<String>,
    /// Discharge-side sub-meter keys (non-empty)
    pub output_keys: Vec<String>,
    /// Prior committed total for the input group
    #[serde(default)]
    pub seed_input: i64,
    /// Prior committed total for the output group
    #[serde(default)]
    pub seed_output: i64,
    /// Prior pass-through total
    #[serde(default)]
    pub seed_pass_through: i64,
    /// Stable id of this pairing; generated when absent
    #[serde(default)]
    pub pairing_id: Option<Uuid>,
}

/// Result of applying one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveOutcome {
    /// The observation was reconciled (a zero delta reports all zeros)
    Applied {
        group: MeterGroup,
        delta: i64,
        recognized: i64,
        residual: i64,
    },

    /// The observation contributed nothing
    Ignored(IgnoreReason),
}

impl ObserveOutcome {
    /// Whether the observation carried a usable delta
    pub fn is_applied(&self) -> bool {
        matches!(self, ObserveOutcome::Applied { .. })
    }

    /// Watt-hours recognized as pass-through by this observation
    pub fn recognized(&self) -> i64 {
        match self {
            ObserveOutcome::Applied { recognized, .. } => *recognized,
            ObserveOutcome::Ignored(_) => 0,
        }
    }
}

/// Delta-reconciliation engine for one configured meter pairing
///
/// # Example
/// ```
/// use passthrough_meter_core_rs::{EnergyUnit, Reconciler, ReconcilerConfig};
///
/// let config = ReconcilerConfig {
///     input_keys: vec!["meter_in".to_string()],
///     output_keys: vec!["meter_out".to_string()],
///     ..Default::default()
/// };
/// let mut engine = Reconciler::new(config).unwrap();
///
/// // Charge side reports 5 Wh; nothing corroborates it yet.
/// engine.observe("meter_in", Some("0"), Some("5"), EnergyUnit::WattHour);
/// assert_eq!(engine.total_input(), 5);
/// assert_eq!(engine.pass_through(), 0);
///
/// // Discharge side reports the matching 5 Wh: recognized as pass-through.
/// engine.observe("meter_out", Some("0"), Some("5"), EnergyUnit::WattHour);
/// assert_eq!(engine.pass_through(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct Reconciler {
    /// Stable id of the configured pairing
    pairing_id: Uuid,
    /// Charge-side ledger; entries await the output group's keys
    input: PendingLedger,
    /// Discharge-side ledger; entries await the input group's keys
    output: PendingLedger,
    /// Keys belonging to the output group, for routing
    output_keys: BTreeSet<String>,
    /// Corroborated flow-through total, engine-owned and monotone
    pass_through: i64,
    /// Observations seen (applied or ignored)
    seq: u64,
    /// Decision log
    events: EventLog,
    /// SHA-256 over the key sets, pinned into snapshots
    config_hash: String,
}

impl Reconciler {
    /// Build an engine from a validated pairing configuration
    ///
    /// The corroboration wiring is symmetric: the input ledger awaits the
    /// output group's keys and vice versa.
    ///
    /// # Errors
    ///
    /// - [`ReconcileError::EmptyGroup`] when either key set is empty
    /// - [`ReconcileError::OverlappingKey`] when a key appears in both
    /// - [`ReconcileError::NegativeSeed`] when any seed is below zero
    pub fn new(config: ReconcilerConfig) -> Result<Self, ReconcileError> {
        let input_keys: BTreeSet<String> = config.input_keys.iter().cloned().collect();
        let output_keys: BTreeSet<String> = config.output_keys.iter().cloned().collect();

        if input_keys.is_empty() {
            return Err(ReconcileError::EmptyGroup {
                group: MeterGroup::Input,
            });
        }
        if output_keys.is_empty() {
            return Err(ReconcileError::EmptyGroup {
                group: MeterGroup::Output,
            });
        }
        if let Some(key) = input_keys.intersection(&output_keys).next() {
            return Err(ReconcileError::OverlappingKey { key: key.clone() });
        }
        for (field, value) in [
            ("input", config.seed_input),
            ("output", config.seed_output),
            ("pass_through", config.seed_pass_through),
        ] {
            if value < 0 {
                return Err(ReconcileError::NegativeSeed { field, value });
            }
        }

        let config_hash = checkpoint::config_hash(&input_keys, &output_keys);

        Ok(Self {
            pairing_id: config.pairing_id.unwrap_or_else(Uuid::new_v4),
            input: PendingLedger::new(output_keys.clone(), config.seed_input),
            output: PendingLedger::new(input_keys, config.seed_output),
            output_keys,
            pass_through: config.seed_pass_through,
            seq: 0,
            events: EventLog::new(),
            config_hash,
        })
    }

    /// Apply one raw reading pair from a sub-meter
    ///
    /// Extraction failures are recognized conditions, not errors: absent
    /// or malformed readings and counter resets contribute nothing and
    /// leave all state untouched.
    pub fn observe(
        &mut self,
        key: &str,
        previous: Option<&str>,
        current: Option<&str>,
        unit: EnergyUnit,
    ) -> ObserveOutcome {
        match extract_delta(previous, current, unit) {
            DeltaResult::Delta(delta) => self.apply_delta(key, delta),
            DeltaResult::Missing => self.ignore(key, IgnoreReason::MissingReading),
            DeltaResult::Malformed => self.ignore(key, IgnoreReason::MalformedReading),
            DeltaResult::Reset => self.ignore(key, IgnoreReason::CounterReset),
        }
    }

    /// Apply an observation exactly as it came off the wire
    ///
    /// Resolves the declared unit symbol first; an unrecognized unit is a
    /// hard failure for this single observation and mutates nothing.
    pub fn apply(&mut self, observation: &Observation) -> Result<ObserveOutcome, ReconcileError> {
        let unit: EnergyUnit = observation.unit.parse()?;
        Ok(self.observe(
            &observation.key,
            observation.previous.as_deref(),
            observation.current.as_deref(),
            unit,
        ))
    }

    /// Reconcile an already-extracted canonical delta
    ///
    /// The reporting group's delta first cancels against the counter-party
    /// ledger; the cancelled portion is recognized as pass-through and the
    /// residual is queued on the reporting group's own ledger. A zero
    /// delta is a strict no-op.
    pub fn apply_delta(&mut self, key: &str, delta: i64) -> ObserveOutcome {
        self.seq += 1;
        let group = self.group_of(key);

        let (recognized, residual) = if delta == 0 {
            (0, 0)
        } else {
            let residual = match group {
                MeterGroup::Input => self.output.settle(key, delta),
                MeterGroup::Output => self.input.settle(key, delta),
            };
            let recognized = delta - residual;
            self.pass_through += recognized;
            match group {
                MeterGroup::Input => self.input.append(residual),
                MeterGroup::Output => self.output.append(residual),
            }
            (recognized, residual)
        };

        self.events.log(ReconcileEvent::Applied {
            seq: self.seq,
            key: key.to_string(),
            group,
            delta,
            recognized,
            residual,
        });

        ObserveOutcome::Applied {
            group,
            delta,
            recognized,
            residual,
        }
    }

    fn ignore(&mut self, key: &str, reason: IgnoreReason) -> ObserveOutcome {
        self.seq += 1;
        self.events.log(ReconcileEvent::Ignored {
            seq: self.seq,
            key: key.to_string(),
            reason,
        });
        ObserveOutcome::Ignored(reason)
    }

    /// Group membership, derived from the configured key sets
    ///
    /// Keys outside both sets route as input; construction guarantees a
    /// key is never in both.
    pub fn group_of(&self, key: &str) -> MeterGroup {
        if self.output_keys.contains(key) {
            MeterGroup::Output
        } else {
            MeterGroup::Input
        }
    }

    // ========================================================================
    // Projections
    // ========================================================================

    /// Input group running total (committed + carry + pending)
    pub fn total_input(&self) -> i64 {
        self.input.total()
    }

    /// Output group running total (committed + carry + pending)
    pub fn total_output(&self) -> i64 {
        self.output.total()
    }

    /// Corroborated pass-through total
    pub fn pass_through(&self) -> i64 {
        self.pass_through
    }

    /// Number of observations seen (applied or ignored)
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Stable id of the configured pairing
    pub fn pairing_id(&self) -> Uuid {
        self.pairing_id
    }

    /// The requested group's ledger
    pub fn ledger(&self, group: MeterGroup) -> &PendingLedger {
        match group {
            MeterGroup::Input => &self.input,
            MeterGroup::Output => &self.output,
        }
    }

    /// Number of unsettled entries on the requested group's ledger
    pub fn pending_depth(&self, group: MeterGroup) -> usize {
        self.ledger(group).pending_depth()
    }

    /// Decision log for this engine
    pub fn event_log(&self) -> &EventLog {
        &self.events
    }

    /// Drop all logged events (hosts drain periodically)
    pub fn clear_event_log(&mut self) {
        self.events.clear();
    }
}
