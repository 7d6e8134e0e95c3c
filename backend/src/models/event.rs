//! Reconciliation event log
//!
//! Captures every engine decision so hosts can replay, debug, and audit a
//! reconciliation run: which observations mutated the ledgers, how much
//! was recognized as pass-through, and why a report was ignored.

use crate::engine::MeterGroup;

/// Why an observation contributed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A reading was absent (first observation of this meter)
    MissingReading,
    /// A reading failed to parse as a finite decimal
    MalformedReading,
    /// The counter decreased (reset or rollback)
    CounterReset,
}

/// One engine decision, tagged with the observation sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// An observation was reconciled against the ledgers
    ///
    /// `recognized` went to pass-through, `residual` was queued on the
    /// reporting group's ledger. A zero delta logs with all three at 0.
    Applied {
        seq: u64,
        key: String,
        group: MeterGroup,
        delta: i64,
        recognized: i64,
        residual: i64,
    },

    /// An observation was dropped before touching the ledgers
    Ignored {
        seq: u64,
        key: String,
        reason: IgnoreReason,
    },
}

impl ReconcileEvent {
    /// Sequence number of the observation this event belongs to
    pub fn seq(&self) -> u64 {
        match self {
            ReconcileEvent::Applied { seq, .. } => *seq,
            ReconcileEvent::Ignored { seq, .. } => *seq,
        }
    }

    /// Reporting sub-meter key
    pub fn key(&self) -> &str {
        match self {
            ReconcileEvent::Applied { key, .. } => key,
            ReconcileEvent::Ignored { key, .. } => key,
        }
    }

    /// Short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            ReconcileEvent::Applied { .. } => "Applied",
            ReconcileEvent::Ignored { .. } => "Ignored",
        }
    }
}

/// Append-only store of reconciliation events with query helpers
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<ReconcileEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: ReconcileEvent) {
        self.events.push(event);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[ReconcileEvent] {
        &self.events
    }

    /// Get events for a specific sub-meter key
    pub fn events_for_key(&self, key: &str) -> Vec<&ReconcileEvent> {
        self.events.iter().filter(|e| e.key() == key).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&ReconcileEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
