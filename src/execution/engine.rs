//! Simulation engine - advances feature state for every running partner

use crate::{
    core::{config::SimulationSettings, FeatureStatus, PipelineConfig, TransitionId},
    execution::{
        random::{RandomSource, ThreadRandom},
        scheduler,
    },
    store::{PipelineStore, RunValidation, StoreError},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Events that can occur during a simulated run
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    RunStarted {
        partner: String,
        features: usize,
    },
    FeatureStarted {
        partner: String,
        transition: TransitionId,
        step_id: String,
        feature_id: String,
        at: DateTime<Utc>,
    },
    FeatureCompleted {
        partner: String,
        transition: TransitionId,
        step_id: String,
        feature_id: String,
        at: DateTime<Utc>,
        duration_secs: i64,
    },
    /// Every main-line transition completed; the partner left the running set
    PartnerCompleted {
        partner: String,
        at: DateTime<Utc>,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&SimulationEvent) + Send + Sync>;

/// Reasons a run cannot start
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("{}", .0.message)]
    NotConfigured(RunValidation),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Tick-driven state machine over the store's running partners
pub struct SimulationEngine<R = ThreadRandom> {
    settings: SimulationSettings,
    random: R,
    event_handlers: Vec<EventHandler>,
    ticks: u64,
}

impl SimulationEngine<ThreadRandom> {
    pub fn new(settings: SimulationSettings) -> Self {
        Self::with_random(settings, ThreadRandom)
    }
}

impl<R: RandomSource> SimulationEngine<R> {
    pub fn with_random(settings: SimulationSettings, random: R) -> Self {
        Self {
            settings,
            random,
            event_handlers: Vec::new(),
            ticks: 0,
        }
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Number of ticks processed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&SimulationEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    fn emit(&self, event: &SimulationEvent) {
        for handler in &self.event_handlers {
            handler(event);
        }
    }

    /// Validate, reset every selected feature, and mark the partner running
    ///
    /// A run never resumes: starting again, even mid-run, begins from scratch.
    pub fn start_run(
        &mut self,
        store: &mut PipelineStore,
        partner: &str,
        _now: DateTime<Utc>,
    ) -> Result<(), RunError> {
        let validation = store.validate_for_run(partner);
        if !validation.is_valid {
            warn!("Run not started: {}", validation.message);
            return Err(RunError::NotConfigured(validation));
        }

        let pipeline = store.pipeline_mut(partner)?;
        pipeline.reset_features();
        let features = pipeline.selected_features().len();
        store.set_running(partner, true)?;

        info!("Started run for {} ({} features)", partner, features);
        self.emit(&SimulationEvent::RunStarted {
            partner: partner.to_string(),
            features,
        });
        Ok(())
    }

    /// Advance every running partner by one tick, in store order
    pub fn tick(&mut self, store: &mut PipelineStore, now: DateTime<Utc>) -> Vec<SimulationEvent> {
        self.ticks += 1;
        let mut events = Vec::new();

        for partner in store.partners_mut() {
            if !partner.is_running() {
                continue;
            }

            self.advance_partner(&mut partner.pipeline, &partner.name, now, &mut events);

            if partner.pipeline.is_complete() {
                partner.set_running(false);
                info!("Partner {} completed all transitions", partner.name);
                events.push(SimulationEvent::PartnerCompleted {
                    partner: partner.name.clone(),
                    at: now,
                });
            }
        }

        debug!("Tick {} produced {} event(s)", self.ticks, events.len());
        for event in &events {
            self.emit(event);
        }
        events
    }

    fn advance_partner(
        &mut self,
        pipeline: &mut PipelineConfig,
        partner: &str,
        now: DateTime<Utc>,
        events: &mut Vec<SimulationEvent>,
    ) {
        for transition in TransitionId::REQUIRED {
            if !scheduler::transition_unlocked(pipeline, transition) {
                continue;
            }

            let step_count = pipeline.stage_config(transition).steps().len();
            for step_index in 0..step_count {
                let (step_id, feature_ids) = {
                    let steps = pipeline.stage_config(transition).steps_in_order();
                    if !scheduler::step_unlocked(pipeline, &steps, step_index) {
                        continue;
                    }
                    let step = steps[step_index];
                    (step.id.clone(), step.features().to_vec())
                };

                for (feature_index, feature_id) in feature_ids.iter().enumerate() {
                    let unlocked = pipeline
                        .stage_config(transition)
                        .step(&step_id)
                        .is_some_and(|step| scheduler::feature_unlocked(pipeline, step, feature_index));
                    if !unlocked {
                        continue;
                    }

                    if let Some(event) =
                        self.advance_feature(pipeline, partner, transition, &step_id, feature_id, now)
                    {
                        events.push(event);
                    }
                }
            }
        }
    }

    fn advance_feature(
        &mut self,
        pipeline: &mut PipelineConfig,
        partner: &str,
        transition: TransitionId,
        step_id: &str,
        feature_id: &str,
        now: DateTime<Utc>,
    ) -> Option<SimulationEvent> {
        let feature = pipeline.feature_mut(feature_id)?;

        match feature.status() {
            FeatureStatus::NotStarted => {
                let draw = self.random.next_f64();
                if draw <= self.settings.start_threshold || !feature.state.start(now) {
                    return None;
                }
                debug!("{}: started {} in {}/{}", partner, feature_id, transition, step_id);
                Some(SimulationEvent::FeatureStarted {
                    partner: partner.to_string(),
                    transition,
                    step_id: step_id.to_string(),
                    feature_id: feature_id.to_string(),
                    at: now,
                })
            }
            FeatureStatus::InProgress => {
                let elapsed = feature.state.elapsed(now)?;
                if elapsed < self.settings.min_in_progress() || !feature.state.complete(now) {
                    return None;
                }
                debug!("{}: completed {} in {}/{}", partner, feature_id, transition, step_id);
                Some(SimulationEvent::FeatureCompleted {
                    partner: partner.to_string(),
                    transition,
                    step_id: step_id.to_string(),
                    feature_id: feature_id.to_string(),
                    at: now,
                    duration_secs: elapsed.num_seconds(),
                })
            }
            FeatureStatus::Completed | FeatureStatus::Error => None,
        }
    }
}
