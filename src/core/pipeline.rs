//! Per-partner pipeline configuration

use crate::core::{
    feature::{Feature, SelectedFeature},
    state::{FeatureStatus, StatusCounts},
    step::Step,
    topology::{Stage, TransitionId},
};
use serde::Serialize;

/// Ordered steps configured for one transition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageConfig {
    pub id: TransitionId,
    pub name: String,
    steps: Vec<Step>,
    is_configured: bool,
}

impl StageConfig {
    pub fn new(id: TransitionId) -> Self {
        Self {
            id,
            name: id.config_name(),
            steps: Vec::new(),
            is_configured: false,
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Steps sorted by ascending `order` (stable for equal orders)
    pub fn steps_in_order(&self) -> Vec<&Step> {
        let mut steps: Vec<&Step> = self.steps.iter().collect();
        steps.sort_by_key(|s| s.order);
        steps
    }

    pub fn is_configured(&self) -> bool {
        self.is_configured
    }

    /// At least one step holds at least one feature
    pub fn has_assigned_features(&self) -> bool {
        self.steps.iter().any(|s| !s.is_empty())
    }

    /// Configured and holding work: the condition for a run and for reports
    pub fn is_ready(&self) -> bool {
        self.is_configured && self.has_assigned_features()
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub(crate) fn step_mut(&mut self, step_id: &str) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.id == step_id)
    }

    /// Step currently holding the feature, if any
    pub fn step_containing(&self, feature_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.contains(feature_id))
    }

    /// Feature ids across all steps, in step order
    pub fn assigned_feature_ids(&self) -> Vec<&str> {
        self.steps_in_order()
            .into_iter()
            .flat_map(|s| s.features().iter().map(String::as_str))
            .collect()
    }

    /// Append an empty `required` step numbered after the current step count
    pub(crate) fn add_step(&mut self) -> &Step {
        let mut number = self.steps.len() as u32 + 1;
        while self.step(&format!("step-{}", number)).is_some() {
            number += 1;
        }
        self.steps.push(Step::new(number));
        &self.steps[self.steps.len() - 1]
    }

    pub(crate) fn remove_step(&mut self, step_id: &str) -> bool {
        let before = self.steps.len();
        self.steps.retain(|s| s.id != step_id);
        self.steps.len() != before
    }

    pub(crate) fn remove_feature(&mut self, feature_id: &str) -> bool {
        let mut removed = false;
        for step in &mut self.steps {
            removed |= step.remove(feature_id);
        }
        removed
    }

    pub(crate) fn mark_configured(&mut self) {
        self.is_configured = true;
    }
}

/// One edge of the stage graph with its configuration
#[derive(Debug, Clone, PartialEq)]
pub struct StageTransition {
    pub id: TransitionId,
    pub stage_config: StageConfig,
}

impl StageTransition {
    pub fn new(id: TransitionId) -> Self {
        Self {
            id,
            stage_config: StageConfig::new(id),
        }
    }

    pub fn from_stage(&self) -> Stage {
        self.id.from_stage()
    }

    pub fn to_stage(&self) -> Stage {
        self.id.to_stage()
    }
}

/// Everything a partner has configured
///
/// `selected_features` is the single table of execution state. Steps refer to
/// entries of this table by id, so a feature's status is never duplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    transitions: Vec<StageTransition>,
    selected_features: Vec<SelectedFeature>,
}

impl PipelineConfig {
    /// Six unconfigured transitions and no selected features
    pub fn new() -> Self {
        Self {
            transitions: TransitionId::ALL.iter().map(|id| StageTransition::new(*id)).collect(),
            selected_features: Vec::new(),
        }
    }

    pub fn transitions(&self) -> &[StageTransition] {
        &self.transitions
    }

    pub fn transition(&self, id: TransitionId) -> &StageTransition {
        let index = Self::index_of(id);
        &self.transitions[index]
    }

    pub(crate) fn transition_mut(&mut self, id: TransitionId) -> &mut StageTransition {
        let index = Self::index_of(id);
        &mut self.transitions[index]
    }

    fn index_of(id: TransitionId) -> usize {
        TransitionId::ALL
            .iter()
            .position(|t| *t == id)
            .unwrap_or_default()
    }

    pub fn stage_config(&self, id: TransitionId) -> &StageConfig {
        &self.transition(id).stage_config
    }

    pub fn selected_features(&self) -> &[SelectedFeature] {
        &self.selected_features
    }

    pub fn feature(&self, feature_id: &str) -> Option<&SelectedFeature> {
        self.selected_features.iter().find(|f| f.id() == feature_id)
    }

    pub(crate) fn feature_mut(&mut self, feature_id: &str) -> Option<&mut SelectedFeature> {
        self.selected_features.iter_mut().find(|f| f.id() == feature_id)
    }

    pub fn is_selected(&self, feature_id: &str) -> bool {
        self.feature(feature_id).is_some()
    }

    /// Add a feature to the selection as `not-started`. No-op if present.
    pub(crate) fn select(&mut self, feature: Feature) -> bool {
        if self.is_selected(&feature.id) {
            return false;
        }
        self.selected_features.push(SelectedFeature::new(feature));
        true
    }

    /// Drop a feature from the selection and from every step
    pub(crate) fn deselect(&mut self, feature_id: &str) -> bool {
        let before = self.selected_features.len();
        self.selected_features.retain(|f| f.id() != feature_id);
        for transition in &mut self.transitions {
            transition.stage_config.remove_feature(feature_id);
        }
        self.selected_features.len() != before
    }

    /// Selected features assigned anywhere in a transition, in step order
    pub fn transition_features(&self, id: TransitionId) -> Vec<&SelectedFeature> {
        self.stage_config(id)
            .assigned_feature_ids()
            .into_iter()
            .filter_map(|feature_id| self.feature(feature_id))
            .collect()
    }

    /// Ready, with every assigned feature completed
    pub fn is_transition_completed(&self, id: TransitionId) -> bool {
        if !self.stage_config(id).is_ready() {
            return false;
        }
        let features = self.transition_features(id);
        !features.is_empty() && features.iter().all(|f| f.state.is_completed())
    }

    /// Every main-line transition completed
    pub fn is_complete(&self) -> bool {
        TransitionId::REQUIRED
            .iter()
            .all(|id| self.is_transition_completed(*id))
    }

    /// Put every selected feature back to `not-started`
    pub(crate) fn reset_features(&mut self) {
        for feature in &mut self.selected_features {
            feature.state.reset();
        }
    }

    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::from_statuses(self.selected_features.iter().map(|f| f.status()))
    }

    /// Any selected feature is running or done
    pub fn has_activity(&self) -> bool {
        self.selected_features
            .iter()
            .any(|f| matches!(f.status(), FeatureStatus::InProgress | FeatureStatus::Completed))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}
