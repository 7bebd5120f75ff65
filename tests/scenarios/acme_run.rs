//! Test: a single partner walking the main line

use crate::helpers::*;
use etl_pipeline::execution::{scheduler, SimulationEvent};
use etl_pipeline::{FeatureStatus, PipelineStore, RunError, TransitionId};

#[test]
fn test_first_feature_starts_then_completes_and_unlocks_next_transition() {
    let mut store = acme_store();
    // tick 1 draw loses, tick 2 draw wins; later draws never start anything
    let mut engine = scripted_engine([0.2, 0.9]);
    engine.start_run(&mut store, "Acme", t0()).unwrap();

    engine.tick(&mut store, tick_time(1));
    assert_eq!(status(&store, "Acme", "1001"), FeatureStatus::NotStarted);

    engine.tick(&mut store, tick_time(2));
    assert_eq!(status(&store, "Acme", "1001"), FeatureStatus::InProgress);
    let feature = store.pipeline("Acme").unwrap().feature("1001").unwrap();
    assert_eq!(feature.state.start_time(), Some(tick_time(2)));

    // 12 simulated seconds in progress at tick 6
    run_ticks(&mut engine, &mut store, 3, 6);
    assert_eq!(status(&store, "Acme", "1001"), FeatureStatus::InProgress);
    assert!(!scheduler::transition_unlocked(
        store.pipeline("Acme").unwrap(),
        TransitionId::Stage0Stage1
    ));

    let events = engine.tick(&mut store, tick_time(7));
    assert_eq!(status(&store, "Acme", "1001"), FeatureStatus::Completed);
    let feature = store.pipeline("Acme").unwrap().feature("1001").unwrap();
    assert_eq!(feature.state.completed_time(), Some(tick_time(7)));
    assert!(events.contains(&SimulationEvent::FeatureCompleted {
        partner: "Acme".to_string(),
        transition: TransitionId::FileStage0,
        step_id: "step-1".to_string(),
        feature_id: "1001".to_string(),
        at: tick_time(7),
        duration_secs: 15,
    }));

    assert!(scheduler::transition_unlocked(
        store.pipeline("Acme").unwrap(),
        TransitionId::Stage0Stage1
    ));
    assert_eq!(status(&store, "Acme", "1005"), FeatureStatus::NotStarted);
}

#[test]
fn test_later_transitions_never_start_early() {
    let mut store = acme_store();
    let mut engine = eager_engine();
    engine.start_run(&mut store, "Acme", t0()).unwrap();

    for n in 1..=5 {
        engine.tick(&mut store, tick_time(n));
        for (_, feature) in &MAIN_LINE[1..] {
            assert_eq!(status(&store, "Acme", feature), FeatureStatus::NotStarted);
        }
    }
}

#[test]
fn test_run_is_rejected_until_main_line_is_configured() {
    let mut store = PipelineStore::default();
    store.add_partner(Some("Acme")).unwrap();
    for (transition, feature) in &MAIN_LINE[..3] {
        let step = store.add_step("Acme", *transition).unwrap();
        store
            .assign_feature_to_step("Acme", *transition, &step, feature)
            .unwrap();
        store.save_transition_configuration("Acme", *transition).unwrap();
    }

    let mut engine = eager_engine();
    let err = engine.start_run(&mut store, "Acme", t0()).unwrap_err();
    let RunError::NotConfigured(validation) = &err else {
        panic!("unexpected error: {}", err);
    };
    assert_eq!(validation.unconfigured, vec![TransitionId::Stage2Target]);
    assert_eq!(
        err.to_string(),
        "Please configure the following transitions for Acme before running: Stage 2 → Target"
    );
    assert!(store.running_partners().is_empty());

    // ticking does nothing for a partner that is not running
    assert!(engine.tick(&mut store, tick_time(1)).is_empty());
}

#[test]
fn test_restart_discards_partial_progress() {
    let mut store = acme_store();
    let mut engine = eager_engine();
    engine.start_run(&mut store, "Acme", t0()).unwrap();
    run_ticks(&mut engine, &mut store, 1, 7);
    assert_eq!(status(&store, "Acme", "1001"), FeatureStatus::Completed);
    assert_eq!(status(&store, "Acme", "1005"), FeatureStatus::InProgress);

    engine.start_run(&mut store, "Acme", tick_time(8)).unwrap();
    let pipeline = store.pipeline("Acme").unwrap();
    for feature in pipeline.selected_features() {
        assert_eq!(feature.status(), FeatureStatus::NotStarted);
        assert_eq!(feature.state.start_time(), None);
        assert_eq!(feature.state.completed_time(), None);
    }
    assert!(store.is_running("Acme"));
}

#[test]
fn test_partners_tick_in_store_order() {
    let mut store = PipelineStore::default();
    configure_main_line(&mut store, "Acme");
    configure_main_line(&mut store, "Globex");

    // Acme draws first, then Globex
    let mut engine = scripted_engine([0.9, 0.1]);
    engine.start_run(&mut store, "Acme", t0()).unwrap();
    engine.start_run(&mut store, "Globex", t0()).unwrap();

    let events = engine.tick(&mut store, tick_time(1));
    assert_eq!(started_features(&events), vec!["1001"]);
    assert_eq!(status(&store, "Acme", "1001"), FeatureStatus::InProgress);
    assert_eq!(status(&store, "Globex", "1001"), FeatureStatus::NotStarted);
}

#[test]
fn test_completed_partner_leaves_running_set() {
    let mut store = PipelineStore::default();
    configure_main_line(&mut store, "Acme");
    configure_main_line(&mut store, "Globex");

    let mut engine = eager_engine();
    engine.start_run(&mut store, "Acme", t0()).unwrap();
    run_ticks(&mut engine, &mut store, 1, 3);
    engine.start_run(&mut store, "Globex", tick_time(3)).unwrap();

    // Acme finishes at tick 21, Globex three ticks later
    let events = run_ticks(&mut engine, &mut store, 4, 21);
    assert!(events.contains(&SimulationEvent::PartnerCompleted {
        partner: "Acme".to_string(),
        at: tick_time(21),
    }));
    assert_eq!(store.running_partners(), vec!["Globex"]);

    run_ticks(&mut engine, &mut store, 22, 24);
    assert!(store.running_partners().is_empty());
    assert!(store.pipeline("Globex").unwrap().is_complete());
}
