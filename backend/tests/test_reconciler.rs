//! Reconciliation engine scenario tests
//!
//! End-to-end behavior of `observe`/`apply`: routing, cancellation,
//! pass-through recognition, and the recognized no-op conditions.

use passthrough_meter_core_rs::{
    EnergyUnit, IgnoreReason, MeterGroup, ObserveOutcome, Observation, ReconcileError,
    Reconciler, ReconcilerConfig,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn config(inputs: &[&str], outputs: &[&str]) -> ReconcilerConfig {
    ReconcilerConfig {
        input_keys: inputs.iter().map(|s| s.to_string()).collect(),
        output_keys: outputs.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

fn engine(inputs: &[&str], outputs: &[&str]) -> Reconciler {
    Reconciler::new(config(inputs, outputs)).unwrap()
}

// ============================================================================
// No-op conditions
// ============================================================================

#[test]
fn test_zero_delta_mutates_nothing() {
    let mut engine = engine(&["i1"], &["o1"]);
    engine.observe("i1", Some("0"), Some("5"), EnergyUnit::WattHour);

    // The output side reports an unchanged counter: strict no-op.
    let outcome = engine.observe("o1", Some("7"), Some("7"), EnergyUnit::WattHour);
    assert_eq!(
        outcome,
        ObserveOutcome::Applied {
            group: MeterGroup::Output,
            delta: 0,
            recognized: 0,
            residual: 0,
        }
    );

    // The pending input entry is still awaiting o1.
    assert_eq!(engine.total_input(), 5);
    assert_eq!(engine.pass_through(), 0);
    assert_eq!(engine.pending_depth(MeterGroup::Input), 1);
    assert!(engine.ledger(MeterGroup::Input).pending()[0]
        .awaiting
        .contains("o1"));
}

#[test]
fn test_counter_reset_mutates_nothing() {
    let mut engine = engine(&["i1"], &["o1"]);

    let outcome = engine.observe("i1", Some("100"), Some("40"), EnergyUnit::WattHour);
    assert_eq!(outcome, ObserveOutcome::Ignored(IgnoreReason::CounterReset));
    assert_eq!(engine.total_input(), 0);
    assert_eq!(engine.total_output(), 0);
    assert_eq!(engine.pass_through(), 0);
}

#[test]
fn test_missing_and_malformed_are_silent_skips() {
    let mut engine = engine(&["i1"], &["o1"]);

    let outcome = engine.observe("i1", None, Some("40"), EnergyUnit::WattHour);
    assert_eq!(outcome, ObserveOutcome::Ignored(IgnoreReason::MissingReading));

    let outcome = engine.observe("i1", Some("forty"), Some("41"), EnergyUnit::WattHour);
    assert_eq!(
        outcome,
        ObserveOutcome::Ignored(IgnoreReason::MalformedReading)
    );

    assert_eq!(engine.seq(), 2);
    assert_eq!(engine.total_input(), 0);
}

#[test]
fn test_unrecognized_unit_fails_without_mutation() {
    let mut engine = engine(&["i1"], &["o1"]);
    let observation = Observation::new("i1", Some("0"), Some("5"), "BTU");

    let err = engine.apply(&observation).unwrap_err();
    assert!(matches!(err, ReconcileError::Unit(_)));
    assert_eq!(engine.seq(), 0);
    assert_eq!(engine.total_input(), 0);
    assert!(engine.event_log().is_empty());
}

// ============================================================================
// Reconciliation flow
// ============================================================================

#[test]
fn test_uncorroborated_delta_queues_on_own_ledger() {
    let mut engine = engine(&["i1"], &["o1"]);

    let outcome = engine.observe("i1", Some("1"), Some("2"), EnergyUnit::KilowattHour);
    assert_eq!(
        outcome,
        ObserveOutcome::Applied {
            group: MeterGroup::Input,
            delta: 1_000,
            recognized: 0,
            residual: 1_000,
        }
    );

    let pending = engine.ledger(MeterGroup::Input).pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].amount, 1_000);
    assert!(pending[0].awaiting.contains("o1"));
    assert_eq!(engine.pass_through(), 0);
}

#[test]
fn test_end_to_end_pass_through_recognition() {
    let mut engine = engine(&["i1"], &["o1"]);

    // Charge side reports 5 Wh; nothing pending on the output ledger,
    // so the full delta queues as provisional input.
    engine.observe("i1", Some("0"), Some("5"), EnergyUnit::WattHour);
    assert_eq!(engine.total_input(), 5);
    assert_eq!(engine.pass_through(), 0);

    // Discharge side corroborates with the matching 5 Wh.
    let outcome = engine.observe("o1", Some("0"), Some("5"), EnergyUnit::WattHour);
    assert_eq!(
        outcome,
        ObserveOutcome::Applied {
            group: MeterGroup::Output,
            delta: 5,
            recognized: 5,
            residual: 0,
        }
    );
    assert_eq!(engine.pass_through(), 5);
    assert_eq!(engine.pending_depth(MeterGroup::Input), 0);
    assert_eq!(engine.pending_depth(MeterGroup::Output), 0);
}

#[test]
fn test_partial_corroboration_across_output_meters() {
    let mut engine = engine(&["i1"], &["o1", "o2"]);

    engine.observe("i1", Some("0"), Some("10"), EnergyUnit::WattHour);
    assert_eq!(engine.total_input(), 10);

    // o1 cancels 4 of the pending 10; the entry still awaits o2.
    let outcome = engine.observe("o1", Some("0"), Some("4"), EnergyUnit::WattHour);
    assert_eq!(outcome.recognized(), 4);
    assert_eq!(engine.pass_through(), 4);
    assert_eq!(engine.total_input(), 6);
    assert_eq!(engine.pending_depth(MeterGroup::Input), 1);

    // o2 cancels 1 more and completes the corroboration set; the
    // remaining 5 commits (one unit parked in carry).
    let outcome = engine.observe("o2", Some("0"), Some("1"), EnergyUnit::WattHour);
    assert_eq!(outcome.recognized(), 1);
    assert_eq!(engine.pass_through(), 5);
    assert_eq!(engine.pending_depth(MeterGroup::Input), 0);

    let input = engine.ledger(MeterGroup::Input);
    assert_eq!(input.committed(), 4);
    assert_eq!(input.carry(), 1);
    assert_eq!(engine.total_input(), 5);
}

#[test]
fn test_flow_in_the_other_direction() {
    let mut engine = engine(&["i1"], &["o1"]);

    // Discharge observed first: queues on the output ledger awaiting i1.
    engine.observe("o1", Some("0"), Some("3"), EnergyUnit::WattHour);
    assert_eq!(engine.total_output(), 3);
    assert_eq!(engine.pass_through(), 0);

    // Charge report of 5 cancels the pending 3 and queues its residual 2.
    let outcome = engine.observe("i1", Some("0"), Some("5"), EnergyUnit::WattHour);
    assert_eq!(
        outcome,
        ObserveOutcome::Applied {
            group: MeterGroup::Input,
            delta: 5,
            recognized: 3,
            residual: 2,
        }
    );
    assert_eq!(engine.pass_through(), 3);
    assert_eq!(engine.total_input(), 2);
    assert_eq!(engine.pending_depth(MeterGroup::Output), 0);
}

#[test]
fn test_unknown_key_routes_as_input() {
    let mut engine = engine(&["i1"], &["o1"]);

    let outcome = engine.observe("unconfigured", Some("0"), Some("5"), EnergyUnit::WattHour);
    assert!(matches!(
        outcome,
        ObserveOutcome::Applied {
            group: MeterGroup::Input,
            ..
        }
    ));
    assert_eq!(engine.total_input(), 5);
}

// ============================================================================
// Seeding
// ============================================================================

#[test]
fn test_seeds_restore_prior_totals() {
    let mut cfg = config(&["i1"], &["o1"]);
    cfg.seed_input = 100;
    cfg.seed_output = 200;
    cfg.seed_pass_through = 300;
    let mut engine = Reconciler::new(cfg).unwrap();

    assert_eq!(engine.total_input(), 100);
    assert_eq!(engine.total_output(), 200);
    assert_eq!(engine.pass_through(), 300);

    engine.observe("i1", Some("0"), Some("5"), EnergyUnit::WattHour);
    engine.observe("o1", Some("0"), Some("5"), EnergyUnit::WattHour);
    assert_eq!(engine.pass_through(), 305);
    assert_eq!(engine.total_input(), 100);
}

// ============================================================================
// Event log
// ============================================================================

#[test]
fn test_events_record_every_observation() {
    let mut engine = engine(&["i1"], &["o1"]);

    engine.observe("i1", Some("0"), Some("5"), EnergyUnit::WattHour);
    engine.observe("i1", Some("5"), Some("4"), EnergyUnit::WattHour); // reset
    engine.observe("o1", Some("0"), Some("5"), EnergyUnit::WattHour);

    let log = engine.event_log();
    assert_eq!(log.len(), 3);
    assert_eq!(log.events_of_type("Applied").len(), 2);
    assert_eq!(log.events_of_type("Ignored").len(), 1);
    assert_eq!(log.events_for_key("i1").len(), 2);

    // Sequence numbers line up with arrival order.
    let seqs: Vec<u64> = log.events().iter().map(|e| e.seq()).collect();
    assert_eq!(seqs, vec![1, 2, 3]);

    engine.clear_event_log();
    assert!(engine.event_log().is_empty());
}
