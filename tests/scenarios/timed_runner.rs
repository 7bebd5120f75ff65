//! Test: the periodic runner driving several partners

use crate::helpers::*;
use etl_pipeline::execution::{SimulationEvent, SimulationRunner, StopReason};
use etl_pipeline::{FeatureStatus, PipelineStore};
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_runner_finishes_every_partner() {
    let mut store = PipelineStore::default();
    configure_main_line(&mut store, "Acme");
    configure_main_line(&mut store, "Globex");

    let mut engine = eager_engine();
    let completed = Arc::new(Mutex::new(Vec::new()));
    let sink = completed.clone();
    engine.add_event_handler(move |event| {
        if let SimulationEvent::PartnerCompleted { partner, .. } = event {
            sink.lock().unwrap().push(partner.clone());
        }
    });
    engine.start_run(&mut store, "Acme", t0()).unwrap();
    engine.start_run(&mut store, "Globex", t0()).unwrap();

    let mut runner = SimulationRunner::new(store, engine).with_speed(3000.0);
    let outcome = runner.run(t0()).await;

    assert_eq!(outcome.reason, StopReason::Completed);
    assert_eq!(outcome.ticks, 21);
    assert_eq!(outcome.simulated_end, tick_time(21));
    assert_eq!(*completed.lock().unwrap(), vec!["Acme", "Globex"]);

    let shared = runner.store();
    let store = shared.lock().await;
    for partner in ["Acme", "Globex"] {
        for (_, feature) in MAIN_LINE {
            assert_eq!(status(&store, partner, feature), FeatureStatus::Completed);
        }
    }
}

#[tokio::test]
async fn test_runner_leaves_partial_progress_at_tick_limit() {
    let mut store = acme_store();
    let mut engine = scripted_engine([0.9]);
    engine.start_run(&mut store, "Acme", t0()).unwrap();

    let mut runner = SimulationRunner::new(store, engine)
        .with_speed(3000.0)
        .with_max_ticks(8);
    let outcome = runner.run(t0()).await;

    assert_eq!(outcome.reason, StopReason::TickLimit);
    assert_eq!(runner.engine().ticks(), 8);

    let shared = runner.store();
    let store = shared.lock().await;
    assert_eq!(status(&store, "Acme", "1001"), FeatureStatus::Completed);
    // the script ran dry, so the next transition never starts
    assert_eq!(status(&store, "Acme", "1005"), FeatureStatus::NotStarted);
    assert!(store.is_running("Acme"));
}

#[tokio::test]
async fn test_shutdown_from_another_task() {
    let mut store = acme_store();
    let mut engine = scripted_engine(Vec::new());
    engine.start_run(&mut store, "Acme", t0()).unwrap();

    // one tick every 3 s of wall time; shutdown lands long before that
    let mut runner = SimulationRunner::new(store, engine);
    let handle = runner.shutdown_handle();
    let task = tokio::spawn(async move { runner.run(t0()).await });

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    handle.shutdown();

    let outcome = task.await.unwrap();
    assert_eq!(outcome.reason, StopReason::Shutdown);
    assert_eq!(outcome.ticks, 0);
}
