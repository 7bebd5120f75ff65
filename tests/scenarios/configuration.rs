//! Test: building and editing partner configurations

use crate::helpers::*;
use etl_pipeline::core::MoveDirection;
use etl_pipeline::{ExecutionType, PartnerFilter, PipelineStore, ScenarioConfig, StoreError, TransitionId};

#[test]
fn test_scenario_yaml_builds_a_runnable_store() {
    let yaml = r#"
name: "Demo"
partners:
  - name: "Acme"
    transitions:
      - id: "file-stage0"
        steps:
          - features: ["1001"]
      - id: "stage0-stage1"
        steps:
          - type: parallel
            features: ["1005", "1006", "1007"]
      - id: "stage1-stage2"
        steps:
          - features: ["1009"]
      - id: "stage2-target"
        steps:
          - features: ["1010"]
  - name: "Globex"
"#;
    let store = store_from_yaml(yaml);
    assert_eq!(store.partner_names(), vec!["Acme", "Globex"]);
    assert!(store.validate_for_run("Acme").is_valid);

    let globex = store.validate_for_run("Globex");
    assert!(!globex.is_valid);
    assert_eq!(globex.unconfigured, TransitionId::REQUIRED.to_vec());
}

#[test]
fn test_unknown_transition_in_yaml_is_rejected() {
    let yaml = r#"
partners:
  - name: "Acme"
    transitions:
      - id: "stage3-target"
"#;
    assert!(ScenarioConfig::from_yaml(yaml).is_err());
}

#[test]
fn test_auto_assignment_follows_topology_order() {
    let mut store = PipelineStore::default();
    let partner = store.add_partner(None).unwrap();
    assert_eq!(partner, "Data Partner A");

    let late = store.add_step(&partner, TransitionId::Stage2Target).unwrap();
    let early = store.add_step(&partner, TransitionId::FileStage0).unwrap();

    store.toggle_feature_selection(&partner, "1001").unwrap();
    store.toggle_feature_selection(&partner, "1002").unwrap();

    let pipeline = store.pipeline(&partner).unwrap();
    let first = pipeline.stage_config(TransitionId::FileStage0).step(&early).unwrap();
    let last = pipeline.stage_config(TransitionId::Stage2Target).step(&late).unwrap();
    assert_eq!(first.features(), ["1001".to_string()]);
    assert_eq!(last.features(), ["1002".to_string()]);
}

#[test]
fn test_required_step_capacity_survives_every_edit() {
    let mut store = PipelineStore::default();
    store.add_partner(Some("Acme")).unwrap();
    let t = TransitionId::Stage0Stage1;
    let step = store.add_step("Acme", t).unwrap();

    store.set_step_execution_type("Acme", t, &step, ExecutionType::Parallel).unwrap();
    for feature in ["1005", "1006", "1007"] {
        assert!(store.assign_feature_to_step("Acme", t, &step, feature).unwrap());
    }
    assert!(store
        .move_feature_priority("Acme", t, &step, "1007", MoveDirection::Up)
        .unwrap());
    let features = store.pipeline("Acme").unwrap().stage_config(t).step(&step).unwrap().features().to_vec();
    assert_eq!(features, vec!["1005", "1007", "1006"]);

    // switching back to required empties the step
    store.set_step_execution_type("Acme", t, &step, ExecutionType::Required).unwrap();
    assert!(store.pipeline("Acme").unwrap().stage_config(t).step(&step).unwrap().is_empty());

    assert!(store.assign_feature_to_step("Acme", t, &step, "1005").unwrap());
    assert!(!store.assign_feature_to_step("Acme", t, &step, "1006").unwrap());
    assert_eq!(
        store.pipeline("Acme").unwrap().stage_config(t).step(&step).unwrap().features().len(),
        1
    );

    assert!(store.remove_feature_from_step("Acme", t, &step, "1005").unwrap());
    assert!(store.pipeline("Acme").unwrap().is_selected("1005"));
}

#[test]
fn test_rename_keeps_configuration_and_running_state() {
    let mut store = acme_store();
    let mut engine = eager_engine();
    engine.start_run(&mut store, "Acme", t0()).unwrap();
    store.set_filter(PartnerFilter::Partner("Acme".to_string())).unwrap();

    store.rename_partner("Acme", "Acme Corp").unwrap();
    assert!(store.pipeline("Acme").is_none());
    assert!(store.validate_for_run("Acme Corp").is_valid);
    assert!(store.is_running("Acme Corp"));
    assert_eq!(store.filter(), &PartnerFilter::Partner("Acme Corp".to_string()));

    engine.tick(&mut store, tick_time(1));
    assert_eq!(
        status(&store, "Acme Corp", "1001"),
        etl_pipeline::FeatureStatus::InProgress
    );
}

#[test]
fn test_remove_partner_stops_its_run() {
    let mut store = acme_store();
    let mut engine = eager_engine();
    engine.start_run(&mut store, "Acme", t0()).unwrap();

    store.remove_partner("Acme").unwrap();
    assert!(store.running_partners().is_empty());
    assert!(engine.tick(&mut store, tick_time(1)).is_empty());
    assert_eq!(
        store.rename_partner("Acme", "Other"),
        Err(StoreError::PartnerNotFound("Acme".to_string()))
    );
}

#[test]
fn test_last_step_cannot_be_removed() {
    let mut store = acme_store();
    let t = TransitionId::FileStage0;
    assert_eq!(store.remove_step("Acme", t, "step-1"), Err(StoreError::LastStep(t)));
    assert_eq!(store.pipeline("Acme").unwrap().stage_config(t).steps().len(), 1);
}

#[test]
fn test_error_feature_blocks_until_recovered() {
    let mut store = acme_store();
    let mut engine = eager_engine();
    engine.start_run(&mut store, "Acme", t0()).unwrap();
    engine.tick(&mut store, tick_time(1));

    store
        .mark_feature_error("Acme", "1001", "Corrupted header", tick_time(2))
        .unwrap();
    assert_eq!(status(&store, "Acme", "1001"), etl_pipeline::FeatureStatus::Error);
    assert_eq!(store.error_features("Acme").len(), 1);

    // an errored feature never completes, so nothing downstream starts
    let events = run_ticks(&mut engine, &mut store, 2, 12);
    assert!(started_features(&events).is_empty());
    assert!(store.is_running("Acme"));

    assert!(store.recover_feature("Acme", "1001").unwrap());
    assert!(store.error_features("Acme").is_empty());
    assert_eq!(status(&store, "Acme", "1001"), etl_pipeline::FeatureStatus::NotStarted);

    let events = engine.tick(&mut store, tick_time(13));
    assert_eq!(started_features(&events), vec!["1001"]);
}

#[test]
fn test_marking_an_unselected_feature_fails() {
    let mut store = acme_store();
    assert_eq!(
        store.mark_feature_error("Acme", "1016", "Bad number", t0()),
        Err(StoreError::FeatureNotSelected("1016".to_string()))
    );
}

#[test]
fn test_bundled_demo_scenario() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/demo.yaml");
    let config = ScenarioConfig::from_file(path).unwrap();
    let store = config.to_store(config.load_catalog().unwrap()).unwrap();

    assert_eq!(store.partner_names(), vec!["Acme", "Globex", "Initech"]);
    assert!(store.validate_for_run("Acme").is_valid);
    assert!(store.validate_for_run("Globex").is_valid);
    assert!(!store.validate_for_run("Initech").is_valid);

    // the optional error-handling edge is saved but not part of the main line
    let globex = store.pipeline("Globex").unwrap();
    assert!(globex.stage_config(TransitionId::Stage1Stage1B).is_ready());
    assert_eq!(globex.selected_features().len(), 8);
}
