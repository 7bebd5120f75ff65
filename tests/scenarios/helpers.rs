//! Test utility functions for etl-pipeline scenarios

use chrono::{DateTime, Duration, TimeZone, Utc};
use etl_pipeline::execution::{SequenceRandom, SimulationEngine, SimulationEvent};
use etl_pipeline::{FeatureCatalog, FeatureStatus, PipelineStore, ScenarioConfig, SimulationSettings, TransitionId};

/// One required step per main-line transition
pub const MAIN_LINE: [(TransitionId, &str); 4] = [
    (TransitionId::FileStage0, "1001"),
    (TransitionId::Stage0Stage1, "1005"),
    (TransitionId::Stage1Stage2, "1009"),
    (TransitionId::Stage2Target, "1010"),
];

/// Fixed start of simulated time
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap()
}

/// Simulated time of tick `n` with the default 3 s interval
pub fn tick_time(n: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(3 * n)
}

pub fn store_from_yaml(yaml: &str) -> PipelineStore {
    let config = ScenarioConfig::from_yaml(yaml).unwrap();
    config.to_store(FeatureCatalog::builtin()).unwrap()
}

/// Add `partner` with the main-line configuration
pub fn configure_main_line(store: &mut PipelineStore, partner: &str) {
    store.add_partner(Some(partner)).unwrap();
    for (transition, feature) in MAIN_LINE {
        let step = store.add_step(partner, transition).unwrap();
        assert!(store
            .assign_feature_to_step(partner, transition, &step, feature)
            .unwrap());
        store.save_transition_configuration(partner, transition).unwrap();
    }
}

pub fn acme_store() -> PipelineStore {
    let mut store = PipelineStore::default();
    configure_main_line(&mut store, "Acme");
    store
}

/// Engine replaying `draws`, then never starting anything
pub fn scripted_engine<I: IntoIterator<Item = f64>>(draws: I) -> SimulationEngine<SequenceRandom> {
    SimulationEngine::with_random(SimulationSettings::default(), SequenceRandom::new(draws))
}

/// Engine whose every draw starts a feature
pub fn eager_engine() -> SimulationEngine<SequenceRandom> {
    SimulationEngine::with_random(SimulationSettings::default(), SequenceRandom::constant(0.99))
}

pub fn status(store: &PipelineStore, partner: &str, feature: &str) -> FeatureStatus {
    store
        .pipeline(partner)
        .and_then(|p| p.feature(feature))
        .map(|f| f.status())
        .unwrap_or_else(|| panic!("{} has no selected feature {}", partner, feature))
}

/// Run ticks `from..=to`, collecting every event
pub fn run_ticks(
    engine: &mut SimulationEngine<SequenceRandom>,
    store: &mut PipelineStore,
    from: i64,
    to: i64,
) -> Vec<SimulationEvent> {
    (from..=to)
        .flat_map(|n| engine.tick(store, tick_time(n)))
        .collect()
}

pub fn started_features(events: &[SimulationEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            SimulationEvent::FeatureStarted { feature_id, .. } => Some(feature_id.as_str()),
            _ => None,
        })
        .collect()
}
