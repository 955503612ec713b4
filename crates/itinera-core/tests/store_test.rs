//! Plan store round-trips with real plans.

use std::sync::Arc;

use itinera_core::{Plan, PlanId, PlanStore, build};
use itinera_test_utils::{text_upload, trip_request};

#[test]
fn stored_plan_reads_back_identical() {
    let store: PlanStore = PlanStore::new();
    let mut uploads = vec![text_upload("notas.txt", "relax y gastronomía")];
    let (text, summaries) = itinera_core::extract(&mut uploads);
    let plan = build(&trip_request("Ana", "2024-03-01", "2024-03-03"), &text, summaries);

    let id = store.insert(plan.clone());
    let stored: Arc<Plan> = store.get(&id).expect("plan should be stored");
    assert_eq!(*stored, plan);

    let by_text = store.get_str(&id.to_string()).expect("lookup by text id");
    assert!(Arc::ptr_eq(&stored, &by_text));
}

#[test]
fn unknown_identifier_is_not_found() {
    let store: PlanStore = PlanStore::new();
    store.insert(build(&trip_request("Ana", "2024-03-01", "2024-03-01"), "", Vec::new()));
    assert!(store.get(&PlanId::new_random()).is_none());
    assert!(store.get_str("00000000000000000000000000000000").is_none());
}

#[test]
fn plan_survives_json_roundtrip() {
    let plan = build(&trip_request("Ana", "2024-03-01", "2024-03-02"), "arte", Vec::new());
    let json = serde_json::to_string(&plan).unwrap();
    let back: Plan = serde_json::from_str(&json).unwrap();
    assert_eq!(back, plan);
}
