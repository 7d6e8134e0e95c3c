//! Pending-delta ledger
//!
//! One ledger exists per meter group. It holds the group's committed
//! watt-hour total, a one-unit carry buffer, and an insertion-ordered
//! queue of pending deltas, each waiting on corroboration from a fixed
//! set of counter-party sub-meter keys.
//!
//! # Critical Invariants
//!
//! 1. **Accounting identity**: `total() == committed + carry + sum(pending)`
//!    after every operation
//! 2. **Carry bound**: `carry` is 0 or 1
//! 3. **No spent entries**: every queued entry has `amount > 0` and a
//!    non-empty awaiting set
//! 4. **Oldest first**: cancellation and settlement walk the queue in
//!    insertion order

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A delta observed on this group, not yet corroborated
///
/// The entry commits once every key in `awaiting` has reported; until
/// then counter-party deltas may cancel against its amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEntry {
    /// Uncancelled watt-hours, always positive while queued
    pub amount: i64,
    /// Counter-party keys that have not reported since this entry was queued
    pub awaiting: BTreeSet<String>,
}

/// Committed total, carry buffer, and pending queue for one meter group
///
/// # Example
/// ```
/// use passthrough_meter_core_rs::PendingLedger;
/// use std::collections::BTreeSet;
///
/// let outputs: BTreeSet<String> = ["meter_out".to_string()].into();
/// let mut ledger = PendingLedger::new(outputs, 0);
///
/// ledger.append(5);
/// assert_eq!(ledger.total(), 5);
///
/// // The counter-party reports 5: the pending entry cancels fully.
/// let residual = ledger.settle("meter_out", 5);
/// assert_eq!(residual, 0);
/// assert_eq!(ledger.total(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLedger {
    /// Watt-hours corroborated by every counter-party key
    committed: i64,
    /// One-unit borrow guard, 0 or 1; prevents double recognition of a
    /// unit when a batch of entries settles in one step
    carry: i64,
    /// Unsettled deltas, oldest first
    pending: Vec<PendingEntry>,
    /// Counter-party keys every new entry awaits
    corroborators: BTreeSet<String>,
}

impl PendingLedger {
    /// Create a ledger for one group
    ///
    /// # Arguments
    ///
    /// * `corroborators` - the *other* group's sub-meter keys; must be
    ///   non-empty (the engine validates this at construction)
    /// * `seed` - committed total restored from a prior snapshot
    pub fn new(corroborators: BTreeSet<String>, seed: i64) -> Self {
        Self {
            committed: seed,
            carry: 0,
            pending: Vec::new(),
            corroborators,
        }
    }

    /// Rebuild a ledger from snapshot parts
    pub(crate) fn from_parts(
        corroborators: BTreeSet<String>,
        committed: i64,
        carry: i64,
        pending: Vec<PendingEntry>,
    ) -> Self {
        Self {
            committed,
            carry,
            pending,
            corroborators,
        }
    }

    /// Enqueue an uncorroborated delta
    ///
    /// No-op for a zero amount. The entry awaits the full corroboration
    /// set.
    pub fn append(&mut self, amount: i64) {
        debug_assert!(amount >= 0, "ledger amounts are non-negative");
        if amount == 0 {
            return;
        }
        self.pending.push(PendingEntry {
            amount,
            awaiting: self.corroborators.clone(),
        });
    }

    /// Cancel an incoming counter-party delta against the pending queue
    ///
    /// Called when the counter-party sub-meter `key` has reported `amount`
    /// new watt-hours. Walks the queue oldest-first:
    ///
    /// 1. every entry awaiting `key` drops `key` from its set and gives up
    ///    `min(amount, entry.amount)` to the incoming delta; key-removal
    ///    keeps going after the incoming amount is exhausted, since
    ///    corroboration tracking is independent of allocation
    /// 2. entries whose awaiting set emptied fold their remainder into
    ///    `committed`, parking one unit in `carry` when it is free
    /// 3. spent entries (zero amount or empty awaiting set) leave the queue
    /// 4. a held carry unit is returned against a nonzero residual
    ///
    /// Returns the residual: the portion of the incoming delta that found
    /// nothing to cancel. The caller enqueues it on the reporting group's
    /// own ledger.
    pub fn settle(&mut self, key: &str, amount: i64) -> i64 {
        debug_assert!(amount >= 0, "ledger amounts are non-negative");
        let mut remaining = amount;

        // Single rebuild pass; entries are never mutated in place while
        // the queue is being traversed.
        let mut kept = Vec::with_capacity(self.pending.len());
        for mut entry in self.pending.drain(..) {
            if entry.awaiting.remove(key) {
                let allocated = remaining.min(entry.amount);
                entry.amount -= allocated;
                remaining -= allocated;
            }

            if entry.awaiting.is_empty() {
                let mut fold = entry.amount;
                if self.carry == 0 && fold >= 1 {
                    self.carry = 1;
                    fold -= 1;
                }
                self.committed += fold;
                continue;
            }

            if entry.amount > 0 {
                kept.push(entry);
            }
        }
        self.pending = kept;

        if remaining > 0 && self.carry == 1 {
            remaining -= 1;
            self.carry = 0;
        }

        remaining
    }

    /// Committed + carry + pending: the group's running total
    pub fn total(&self) -> i64 {
        self.committed + self.carry + self.pending_value()
    }

    /// Watt-hours corroborated by every counter-party key
    pub fn committed(&self) -> i64 {
        self.committed
    }

    /// Current carry buffer value (0 or 1)
    pub fn carry(&self) -> i64 {
        self.carry
    }

    /// Unsettled entries, oldest first
    pub fn pending(&self) -> &[PendingEntry] {
        &self.pending
    }

    /// Number of unsettled entries
    pub fn pending_depth(&self) -> usize {
        self.pending.len()
    }

    /// Sum of unsettled amounts
    pub fn pending_value(&self) -> i64 {
        self.pending.iter().map(|entry| entry.amount).sum()
    }

    /// Counter-party keys every new entry awaits
    pub fn corroborators(&self) -> &BTreeSet<String> {
        &self.corroborators
    }
}
