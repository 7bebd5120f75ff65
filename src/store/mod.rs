//! Transition configuration store
//!
//! Owns every partner's pipeline configuration. All mutation goes through the
//! command methods on [`PipelineStore`], which keep the step invariants:
//! a `required` step never holds more than one feature, and a feature sits in
//! at most one step of a transition.

pub mod validation;

pub use validation::RunValidation;

use crate::core::{
    ExecutionType, FeatureCatalog, FeatureId, MoveDirection, PipelineConfig, SelectedFeature,
    TransitionId,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error types for store commands
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Partner not found: {0}")]
    PartnerNotFound(String),

    #[error("Partner already exists: {0}")]
    DuplicatePartner(String),

    #[error("Partner name cannot be empty")]
    EmptyPartnerName,

    #[error("Step '{step}' not found in transition '{transition}'")]
    StepNotFound {
        transition: TransitionId,
        step: String,
    },

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Feature '{0}' is not selected")]
    FeatureNotSelected(String),

    #[error("Cannot remove the last step of transition '{0}'")]
    LastStep(TransitionId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A data partner with its pipeline
#[derive(Debug, Clone)]
pub struct Partner {
    pub name: String,
    pub pipeline: PipelineConfig,
    /// Features flagged by a data-quality checker, awaiting recovery
    error_features: Vec<FeatureId>,
    running: bool,
}

impl Partner {
    fn new(name: String) -> Self {
        Self {
            name,
            pipeline: PipelineConfig::new(),
            error_features: Vec::new(),
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn error_feature_ids(&self) -> &[FeatureId] {
        &self.error_features
    }
}

/// Partner selection used by the analytics and bad data views
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PartnerFilter {
    #[default]
    All,
    Partner(String),
}

impl PartnerFilter {
    pub fn matches(&self, partner: &str) -> bool {
        match self {
            PartnerFilter::All => true,
            PartnerFilter::Partner(name) => name == partner,
        }
    }
}

/// In-memory application state: partners in insertion order
#[derive(Debug, Clone)]
pub struct PipelineStore {
    catalog: FeatureCatalog,
    partners: Vec<Partner>,
    filter: PartnerFilter,
}

impl PipelineStore {
    pub fn new(catalog: FeatureCatalog) -> Self {
        Self {
            catalog,
            partners: Vec::new(),
            filter: PartnerFilter::All,
        }
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    pub fn partners(&self) -> &[Partner] {
        &self.partners
    }

    pub fn partner_names(&self) -> Vec<&str> {
        self.partners.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn partner(&self, name: &str) -> Option<&Partner> {
        self.partners.iter().find(|p| p.name == name)
    }

    pub fn pipeline(&self, name: &str) -> Option<&PipelineConfig> {
        self.partner(name).map(|p| &p.pipeline)
    }

    fn partner_mut(&mut self, name: &str) -> StoreResult<&mut Partner> {
        self.partners
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| StoreError::PartnerNotFound(name.to_string()))
    }

    pub(crate) fn partners_mut(&mut self) -> &mut [Partner] {
        &mut self.partners
    }

    pub fn filter(&self) -> &PartnerFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: PartnerFilter) -> StoreResult<()> {
        if let PartnerFilter::Partner(name) = &filter {
            if self.partner(name).is_none() {
                return Err(StoreError::PartnerNotFound(name.clone()));
            }
        }
        self.filter = filter;
        Ok(())
    }

    // ---- partner identity ----

    /// Add a partner with a custom name or the next `Data Partner <Letter>`
    pub fn add_partner(&mut self, name: Option<&str>) -> StoreResult<String> {
        let name = match name.map(str::trim) {
            Some("") => return Err(StoreError::EmptyPartnerName),
            Some(custom) => {
                if self.partner(custom).is_some() {
                    return Err(StoreError::DuplicatePartner(custom.to_string()));
                }
                custom.to_string()
            }
            None => self.next_default_name(),
        };

        info!("Added partner: {}", name);
        self.partners.push(Partner::new(name.clone()));
        Ok(name)
    }

    fn next_default_name(&self) -> String {
        let mut index = self.partners.len();
        loop {
            let candidate = format!("Data Partner {}", partner_letter(index));
            if self.partner(&candidate).is_none() {
                return candidate;
            }
            index += 1;
        }
    }

    /// Rename a partner, keeping its position and configuration
    pub fn rename_partner(&mut self, old: &str, new: &str) -> StoreResult<()> {
        let new = new.trim();
        if new.is_empty() {
            return Err(StoreError::EmptyPartnerName);
        }
        if new == old {
            return Ok(());
        }
        if self.partner(new).is_some() {
            return Err(StoreError::DuplicatePartner(new.to_string()));
        }

        self.partner_mut(old)?.name = new.to_string();
        if self.filter == PartnerFilter::Partner(old.to_string()) {
            self.filter = PartnerFilter::Partner(new.to_string());
        }

        info!("Renamed partner: {} -> {}", old, new);
        Ok(())
    }

    /// Remove a partner and everything it owns
    pub fn remove_partner(&mut self, name: &str) -> StoreResult<Partner> {
        let index = self
            .partners
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| StoreError::PartnerNotFound(name.to_string()))?;

        if self.filter.matches(name) {
            self.filter = PartnerFilter::All;
        }

        info!("Removed partner: {}", name);
        Ok(self.partners.remove(index))
    }

    // ---- transition configuration ----

    /// Move a feature into a step
    ///
    /// Returns `Ok(false)` and changes nothing when the step has no spare
    /// capacity. Otherwise the feature leaves every other step of the same
    /// transition, is appended to the target step, and is selected for the
    /// partner if it was not already.
    pub fn assign_feature_to_step(
        &mut self,
        partner: &str,
        transition: TransitionId,
        step_id: &str,
        feature_id: &str,
    ) -> StoreResult<bool> {
        let template = self.resolve_feature(partner, feature_id)?;
        let pipeline = &mut self.partner_mut(partner)?.pipeline;

        let stage = &mut pipeline.transition_mut(transition).stage_config;
        let step = stage.step(step_id).ok_or_else(|| StoreError::StepNotFound {
            transition,
            step: step_id.to_string(),
        })?;
        if !step.can_accept() {
            debug!(
                "Rejected {} on {}/{}: step is full",
                feature_id, transition, step_id
            );
            return Ok(false);
        }

        stage.remove_feature(feature_id);
        if let Some(step) = stage.step_mut(step_id) {
            step.push(feature_id.to_string());
        }
        pipeline.select(template);

        debug!("Assigned {} to {}/{} for {}", feature_id, transition, step_id, partner);
        Ok(true)
    }

    fn resolve_feature(&self, partner: &str, feature_id: &str) -> StoreResult<crate::core::Feature> {
        let pipeline = self
            .pipeline(partner)
            .ok_or_else(|| StoreError::PartnerNotFound(partner.to_string()))?;
        pipeline
            .feature(feature_id)
            .map(|f| f.feature.clone())
            .or_else(|| self.catalog.feature(feature_id).cloned())
            .ok_or_else(|| StoreError::UnknownFeature(feature_id.to_string()))
    }

    /// Select or deselect a feature for a partner
    ///
    /// Deselecting removes the feature from every step of every transition.
    /// Selecting auto-assigns it to the first step, scanning transitions in
    /// topology order and steps by order, that has spare capacity.
    /// Returns the new selection state.
    pub fn toggle_feature_selection(&mut self, partner: &str, feature_id: &str) -> StoreResult<bool> {
        let template = self.resolve_feature(partner, feature_id)?;
        let owner = self.partner_mut(partner)?;

        if owner.pipeline.is_selected(feature_id) {
            owner.pipeline.deselect(feature_id);
            owner.error_features.retain(|f| f != feature_id);
            debug!("Deselected {} for {}", feature_id, partner);
            return Ok(false);
        }

        owner.pipeline.select(template);
        let target = TransitionId::ALL.iter().find_map(|id| {
            owner
                .pipeline
                .stage_config(*id)
                .steps_in_order()
                .into_iter()
                .find(|s| s.can_accept())
                .map(|s| (*id, s.id.clone()))
        });
        if let Some((transition, step_id)) = target {
            let stage = &mut owner.pipeline.transition_mut(transition).stage_config;
            if let Some(step) = stage.step_mut(&step_id) {
                step.push(feature_id.to_string());
            }
            debug!("Selected {} for {} into {}/{}", feature_id, partner, transition, step_id);
        } else {
            debug!("Selected {} for {} (no step with capacity)", feature_id, partner);
        }
        Ok(true)
    }

    /// Change a step's execution type; the step's assignments are cleared
    pub fn set_step_execution_type(
        &mut self,
        partner: &str,
        transition: TransitionId,
        step_id: &str,
        execution_type: ExecutionType,
    ) -> StoreResult<()> {
        let stage = &mut self.partner_mut(partner)?.pipeline.transition_mut(transition).stage_config;
        let step = stage.step_mut(step_id).ok_or_else(|| StoreError::StepNotFound {
            transition,
            step: step_id.to_string(),
        })?;
        if !step.is_empty() {
            debug!(
                "Clearing {} feature(s) from {}/{} on execution type change",
                step.features().len(),
                transition,
                step_id
            );
        }
        step.set_execution_type(execution_type);
        Ok(())
    }

    /// Append an empty `required` step and return its id
    pub fn add_step(&mut self, partner: &str, transition: TransitionId) -> StoreResult<String> {
        let stage = &mut self.partner_mut(partner)?.pipeline.transition_mut(transition).stage_config;
        Ok(stage.add_step().id.clone())
    }

    /// Delete a step. The last remaining step cannot be removed.
    pub fn remove_step(&mut self, partner: &str, transition: TransitionId, step_id: &str) -> StoreResult<()> {
        let stage = &mut self.partner_mut(partner)?.pipeline.transition_mut(transition).stage_config;
        if stage.step(step_id).is_none() {
            return Err(StoreError::StepNotFound {
                transition,
                step: step_id.to_string(),
            });
        }
        if stage.steps().len() <= 1 {
            return Err(StoreError::LastStep(transition));
        }
        stage.remove_step(step_id);
        Ok(())
    }

    /// Unassign a feature from one step; it stays selected
    pub fn remove_feature_from_step(
        &mut self,
        partner: &str,
        transition: TransitionId,
        step_id: &str,
        feature_id: &str,
    ) -> StoreResult<bool> {
        let stage = &mut self.partner_mut(partner)?.pipeline.transition_mut(transition).stage_config;
        let step = stage.step_mut(step_id).ok_or_else(|| StoreError::StepNotFound {
            transition,
            step: step_id.to_string(),
        })?;
        Ok(step.remove(feature_id))
    }

    /// Reorder a feature within its step
    pub fn move_feature_priority(
        &mut self,
        partner: &str,
        transition: TransitionId,
        step_id: &str,
        feature_id: &str,
        direction: MoveDirection,
    ) -> StoreResult<bool> {
        let stage = &mut self.partner_mut(partner)?.pipeline.transition_mut(transition).stage_config;
        let step = stage.step_mut(step_id).ok_or_else(|| StoreError::StepNotFound {
            transition,
            step: step_id.to_string(),
        })?;
        Ok(step.move_feature(feature_id, direction))
    }

    /// Mark a transition as configured. This is the only way to set the flag.
    pub fn save_transition_configuration(&mut self, partner: &str, transition: TransitionId) -> StoreResult<()> {
        let stage = &mut self.partner_mut(partner)?.pipeline.transition_mut(transition).stage_config;
        stage.mark_configured();
        info!(
            "Saved {} for {} ({} step(s))",
            transition.label(),
            partner,
            stage.steps().len()
        );
        Ok(())
    }

    /// Check that every main-line transition is saved and holds features
    pub fn validate_for_run(&self, partner: &str) -> RunValidation {
        match self.pipeline(partner) {
            Some(pipeline) => RunValidation::check(partner, pipeline),
            None => RunValidation::partner_not_found(partner),
        }
    }

    // ---- bad data ----

    /// Flag a feature as failed on behalf of a data-quality checker
    pub fn mark_feature_error(
        &mut self,
        partner: &str,
        feature_id: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let owner = self.partner_mut(partner)?;
        let original_stage = TransitionId::ALL
            .iter()
            .find(|id| owner.pipeline.stage_config(**id).step_containing(feature_id).is_some())
            .map(|id| id.from_stage());
        let feature = owner
            .pipeline
            .feature_mut(feature_id)
            .ok_or_else(|| StoreError::FeatureNotSelected(feature_id.to_string()))?;

        feature.state.fail(reason.to_string(), original_stage, now);
        if !owner.error_features.iter().any(|f| f == feature_id) {
            owner.error_features.push(feature_id.to_string());
        }

        warn!("Feature {} for {} marked as error: {}", feature_id, partner, reason);
        Ok(())
    }

    /// Reset an errored feature to `not-started` and clear it from the error list
    pub fn recover_feature(&mut self, partner: &str, feature_id: &str) -> StoreResult<bool> {
        let owner = self.partner_mut(partner)?;
        let feature = owner
            .pipeline
            .feature_mut(feature_id)
            .ok_or_else(|| StoreError::FeatureNotSelected(feature_id.to_string()))?;

        let recovered = matches!(feature.status(), crate::core::FeatureStatus::Error);
        if recovered {
            feature.state.reset();
            info!("Recovered feature {} for {}", feature_id, partner);
        }
        owner.error_features.retain(|f| f != feature_id);
        Ok(recovered)
    }

    /// Features of a partner currently flagged as errors
    pub fn error_features(&self, partner: &str) -> Vec<&SelectedFeature> {
        self.partner(partner)
            .map(|p| {
                p.error_features
                    .iter()
                    .filter_map(|id| p.pipeline.feature(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ---- run bookkeeping (driven by the simulation engine) ----

    pub fn is_running(&self, partner: &str) -> bool {
        self.partner(partner).is_some_and(|p| p.running)
    }

    pub fn running_partners(&self) -> Vec<&str> {
        self.partners
            .iter()
            .filter(|p| p.running)
            .map(|p| p.name.as_str())
            .collect()
    }

    pub(crate) fn set_running(&mut self, partner: &str, running: bool) -> StoreResult<()> {
        self.partner_mut(partner)?.set_running(running);
        Ok(())
    }

    pub(crate) fn pipeline_mut(&mut self, partner: &str) -> StoreResult<&mut PipelineConfig> {
        Ok(&mut self.partner_mut(partner)?.pipeline)
    }
}

impl Default for PipelineStore {
    fn default() -> Self {
        Self::new(FeatureCatalog::builtin())
    }
}

/// Spreadsheet-style letters: A..Z, AA, AB, ...
fn partner_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}
