//! Test: step gating inside a transition

use crate::helpers::*;
use etl_pipeline::{FeatureStatus, PipelineStore};

const PARALLEL_FIRST: &str = r#"
partners:
  - name: "Acme"
    transitions:
      - id: "file-stage0"
        steps:
          - type: parallel
            features: ["1005", "1006"]
      - id: "stage0-stage1"
        steps:
          - features: ["1002"]
      - id: "stage1-stage2"
        steps:
          - features: ["1009"]
      - id: "stage2-target"
        steps:
          - features: ["1010"]
"#;

#[test]
fn test_parallel_features_start_in_the_same_tick() {
    let mut store = store_from_yaml(PARALLEL_FIRST);
    let mut engine = scripted_engine([0.9, 0.9]);
    engine.start_run(&mut store, "Acme", t0()).unwrap();

    let events = engine.tick(&mut store, tick_time(1));
    assert_eq!(started_features(&events), vec!["1005", "1006"]);
    assert_eq!(status(&store, "Acme", "1005"), FeatureStatus::InProgress);
    assert_eq!(status(&store, "Acme", "1006"), FeatureStatus::InProgress);
}

#[test]
fn test_parallel_features_do_not_wait_on_each_other() {
    let mut store = store_from_yaml(PARALLEL_FIRST);
    // 1005 wins on tick 1, 1006 loses; 1006 wins on tick 2
    let mut engine = scripted_engine([0.9, 0.1, 0.9]);
    engine.start_run(&mut store, "Acme", t0()).unwrap();

    engine.tick(&mut store, tick_time(1));
    assert_eq!(status(&store, "Acme", "1005"), FeatureStatus::InProgress);
    assert_eq!(status(&store, "Acme", "1006"), FeatureStatus::NotStarted);

    engine.tick(&mut store, tick_time(2));
    assert_eq!(status(&store, "Acme", "1005"), FeatureStatus::InProgress);
    assert_eq!(status(&store, "Acme", "1006"), FeatureStatus::InProgress);

    // 1005 completes first; the transition waits for 1006
    run_ticks(&mut engine, &mut store, 3, 6);
    assert_eq!(status(&store, "Acme", "1005"), FeatureStatus::Completed);
    assert_eq!(status(&store, "Acme", "1006"), FeatureStatus::InProgress);
    assert_eq!(status(&store, "Acme", "1002"), FeatureStatus::NotStarted);
}

#[test]
fn test_required_steps_run_one_after_another() {
    let yaml = r#"
partners:
  - name: "Acme"
    transitions:
      - id: "file-stage0"
        steps:
          - features: ["1001"]
          - features: ["1002"]
          - type: parallel
            features: ["1003", "1004"]
"#;
    let mut store = store_from_yaml(yaml);
    let mut engine = eager_engine();
    // complete the main line so the run validates
    for (transition, feature) in &MAIN_LINE[1..] {
        let step = store.add_step("Acme", *transition).unwrap();
        store
            .assign_feature_to_step("Acme", *transition, &step, feature)
            .unwrap();
        store.save_transition_configuration("Acme", *transition).unwrap();
    }
    engine.start_run(&mut store, "Acme", t0()).unwrap();

    let events = engine.tick(&mut store, tick_time(1));
    assert_eq!(started_features(&events), vec!["1001"]);

    // 1001 completes at tick 6 and 1002 starts in the same tick
    let events = run_ticks(&mut engine, &mut store, 2, 6);
    assert_eq!(started_features(&events), vec!["1002"]);
    assert_eq!(status(&store, "Acme", "1003"), FeatureStatus::NotStarted);

    let events = run_ticks(&mut engine, &mut store, 7, 11);
    assert_eq!(started_features(&events), vec!["1003", "1004"]);
}

#[test]
fn test_step_after_an_empty_step_starts_right_away() {
    let mut store = PipelineStore::default();
    configure_main_line(&mut store, "Acme");
    let transition = MAIN_LINE[0].0;
    let _empty = store.add_step("Acme", transition).unwrap();
    let last = store.add_step("Acme", transition).unwrap();
    store
        .assign_feature_to_step("Acme", transition, &last, "1002")
        .unwrap();

    let mut engine = eager_engine();
    engine.start_run(&mut store, "Acme", t0()).unwrap();

    // the empty step is vacuously complete, so only it gates step 3
    let events = engine.tick(&mut store, tick_time(1));
    assert_eq!(started_features(&events), vec!["1001", "1002"]);
    assert_eq!(status(&store, "Acme", "1001"), FeatureStatus::InProgress);
    assert_eq!(status(&store, "Acme", "1002"), FeatureStatus::InProgress);

    // the next transition still waits for every step of this one
    run_ticks(&mut engine, &mut store, 2, 5);
    assert_eq!(status(&store, "Acme", "1005"), FeatureStatus::NotStarted);
}
