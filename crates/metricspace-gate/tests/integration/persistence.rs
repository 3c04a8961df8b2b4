//! Usage and calculator state persisted through real backends.

use std::sync::Arc;

use metricspace_core::{Calculator, NullSink, PlanId, Row};
use metricspace_gate::{Session, SubscriptionGate, UserProfile};
use metricspace_storage::{
    CalculatorState, PersistenceStore, RedbBackend, STORAGE_WRITE_EVENT,
};
use serde_json::json;
use tempfile::TempDir;

use crate::common::TestHarness;

fn redb_store(dir: &TempDir) -> Arc<PersistenceStore> {
    let backend = RedbBackend::open(dir.path().join("metricspace.redb")).unwrap();
    Arc::new(PersistenceStore::new(backend, Arc::new(NullSink)))
}

#[test]
fn test_usage_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let session = Session::login(UserProfile::new("u1", PlanId::Free));
    {
        let gate = SubscriptionGate::new(redb_store(&dir));
        gate.record_calculation(&session, "velocity");
        gate.record_calculation(&session, "throughput");
    }

    let gate = SubscriptionGate::new(redb_store(&dir));
    assert_eq!(gate.usage(&session).calculations_this_month, 2);
}

#[test]
fn test_missing_velocity_rows_default() {
    let harness = TestHarness::new();
    let rows: Vec<Row> = harness.store.read(
        "metricspace_velocity_data",
        vec![Calculator::Velocity.default_row()],
    );
    assert_eq!(
        serde_json::to_value(&rows).unwrap(),
        json!([{"storyPoints": "", "focusFactor": ""}])
    );
}

#[test]
fn test_calculate_flow_saves_state_and_usage() {
    let harness = TestHarness::new();
    let session = Session::anonymous();

    let mut state = CalculatorState::load(&harness.store, Calculator::Velocity);
    state.update_field(0, "storyPoints", "24").unwrap();
    state.update_field(0, "focusFactor", "0.8").unwrap();
    state.save(&harness.store);

    let result = harness
        .gate
        .perform_calculation(&session, Calculator::Velocity.id(), || state.compute());
    assert_eq!(result, Some(Some(24.0 / 0.8)));

    let keys = harness.store.list_keys("metricspace_");
    assert_eq!(
        keys,
        vec!["metricspace_usage_anonymous", "metricspace_velocity_data"]
    );

    let written: Vec<String> = harness
        .events
        .named(STORAGE_WRITE_EVENT)
        .into_iter()
        .filter_map(|e| e.attrs.get("key").and_then(|k| k.as_str().map(str::to_string)))
        .collect();
    assert_eq!(
        written,
        vec!["metricspace_velocity_data", "metricspace_usage_anonymous"]
    );

    let reloaded = CalculatorState::load(&harness.store, Calculator::Velocity);
    assert_eq!(reloaded, state);
}

#[test]
fn test_reset_state_persists_default_row() {
    let harness = TestHarness::new();
    let mut state = CalculatorState::load(&harness.store, Calculator::Throughput);
    state.add_row();
    state.add_row();
    state.save(&harness.store);
    assert_eq!(
        CalculatorState::load(&harness.store, Calculator::Throughput).rows().len(),
        3
    );

    state.reset();
    state.save(&harness.store);
    assert_eq!(
        CalculatorState::load(&harness.store, Calculator::Throughput),
        CalculatorState::new(Calculator::Throughput)
    );
}
