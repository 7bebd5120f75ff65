//! Execution scheduler - decides which features may start
//!
//! Gating rules, evaluated against the live feature table so that work
//! finished earlier in a tick unlocks the next step in the same tick:
//!
//! - a main-line transition is unlocked once its predecessor is completed
//! - a step is unlocked once the previous step (by `order`) is completed
//! - in a `parallel` step every feature is eligible together
//! - in a `required` step features run one after another in list order

use crate::core::{ExecutionType, PipelineConfig, Step, TransitionId};

/// Whether the transition may advance at all
pub fn transition_unlocked(pipeline: &PipelineConfig, transition: TransitionId) -> bool {
    if !pipeline.stage_config(transition).is_ready() {
        return false;
    }
    match transition.predecessor() {
        Some(previous) => pipeline.is_transition_completed(previous),
        None => true,
    }
}

/// Every feature of the step is completed (empty steps count as done)
pub fn step_completed(pipeline: &PipelineConfig, step: &Step) -> bool {
    step.features()
        .iter()
        .all(|id| pipeline.feature(id).is_some_and(|f| f.state.is_completed()))
}

/// Whether the step at `index` in order may advance
///
/// Only the immediately preceding step gates it, so an empty step in the
/// middle lets the following step run alongside earlier ones.
pub fn step_unlocked(pipeline: &PipelineConfig, ordered_steps: &[&Step], index: usize) -> bool {
    match index.checked_sub(1).and_then(|previous| ordered_steps.get(previous)) {
        Some(previous) => step_completed(pipeline, previous),
        None => true,
    }
}

/// Whether the feature at `index` of an unlocked step may advance
pub fn feature_unlocked(pipeline: &PipelineConfig, step: &Step, index: usize) -> bool {
    match step.execution_type() {
        ExecutionType::Parallel => true,
        ExecutionType::Required => index == 0 || {
            let previous = &step.features()[index - 1];
            pipeline.feature(previous).is_some_and(|f| f.state.is_completed())
        },
    }
}

/// A feature position the engine may advance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub transition: TransitionId,
    pub step_id: String,
    pub feature_id: String,
}

/// Snapshot of every unlocked feature position, in processing order
///
/// The engine re-evaluates the gates while it mutates; this snapshot is for
/// reporting which work is currently eligible.
pub fn unlocked_slots(pipeline: &PipelineConfig) -> Vec<Slot> {
    let mut slots = Vec::new();

    for transition in TransitionId::REQUIRED {
        if !transition_unlocked(pipeline, transition) {
            continue;
        }
        let steps = pipeline.stage_config(transition).steps_in_order();
        for (step_index, step) in steps.iter().enumerate() {
            if !step_unlocked(pipeline, &steps, step_index) {
                continue;
            }
            for (feature_index, feature_id) in step.features().iter().enumerate() {
                if feature_unlocked(pipeline, step, feature_index) {
                    slots.push(Slot {
                        transition,
                        step_id: step.id.clone(),
                        feature_id: feature_id.clone(),
                    });
                }
            }
        }
    }

    slots
}
