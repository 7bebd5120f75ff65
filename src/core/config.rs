//! Scenario configuration from YAML

use crate::core::{catalog::FeatureCatalog, step::ExecutionType, topology::TransitionId};
use crate::store::PipelineStore;
use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Timing and probability knobs of the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Simulated seconds between two ticks
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// A not-started feature starts when a uniform draw exceeds this value
    #[serde(default = "default_start_threshold")]
    pub start_threshold: f64,

    /// Minimum simulated seconds a feature spends in progress
    #[serde(default = "default_min_in_progress_secs")]
    pub min_in_progress_secs: u64,
}

fn default_tick_interval_secs() -> u64 {
    3
}

fn default_start_threshold() -> f64 {
    0.7
}

fn default_min_in_progress_secs() -> u64 {
    15
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            start_threshold: default_start_threshold(),
            min_in_progress_secs: default_min_in_progress_secs(),
        }
    }
}

/// Upper bound for the second-valued settings (one year)
pub const MAX_SETTING_SECS: u64 = 365 * 24 * 60 * 60;

impl SimulationSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::seconds(self.tick_interval_secs.min(MAX_SETTING_SECS) as i64)
    }

    pub fn min_in_progress(&self) -> Duration {
        Duration::seconds(self.min_in_progress_secs.min(MAX_SETTING_SECS) as i64)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_secs == 0 {
            anyhow::bail!("tick_interval_secs must be greater than zero");
        }
        if self.tick_interval_secs > MAX_SETTING_SECS {
            anyhow::bail!(
                "tick_interval_secs must be at most {}, got {}",
                MAX_SETTING_SECS,
                self.tick_interval_secs
            );
        }
        if self.min_in_progress_secs > MAX_SETTING_SECS {
            anyhow::bail!(
                "min_in_progress_secs must be at most {}, got {}",
                MAX_SETTING_SECS,
                self.min_in_progress_secs
            );
        }
        if !(0.0..1.0).contains(&self.start_threshold) {
            anyhow::bail!(
                "start_threshold must be in [0, 1), got {}",
                self.start_threshold
            );
        }
        Ok(())
    }
}

/// Top-level scenario loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Scenario name (optional)
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub simulation: SimulationSettings,

    /// Path to an external feature catalog (defaults to the built-in one)
    #[serde(default)]
    pub catalog: Option<String>,

    #[serde(default)]
    pub partners: Vec<PartnerConfig>,
}

/// A partner and its transition configurations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerConfig {
    pub name: String,

    #[serde(default)]
    pub transitions: Vec<TransitionConfig>,
}

/// Steps of one transition as written in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConfig {
    pub id: TransitionId,

    /// Save the transition after building it (default true)
    #[serde(default = "default_configured")]
    pub configured: bool,

    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

fn default_configured() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    #[serde(default, rename = "type")]
    pub execution_type: ExecutionType,

    #[serde(default)]
    pub features: Vec<String>,
}

impl ScenarioConfig {
    /// Load a scenario from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse a scenario from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ScenarioConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the structural rules that do not need the catalog
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;

        let mut partner_names = HashSet::new();
        for partner in &self.partners {
            let name = partner.name.trim();
            if name.is_empty() {
                anyhow::bail!("Partner name cannot be empty");
            }
            if !partner_names.insert(name) {
                anyhow::bail!("Duplicate partner name: {}", name);
            }

            let mut transition_ids = HashSet::new();
            for transition in &partner.transitions {
                if !transition_ids.insert(transition.id) {
                    anyhow::bail!(
                        "Partner '{}' configures transition '{}' more than once",
                        name,
                        transition.id
                    );
                }

                let mut seen_features = HashSet::new();
                for (index, step) in transition.steps.iter().enumerate() {
                    if let Some(max) = step.execution_type.capacity() {
                        if step.features.len() > max {
                            anyhow::bail!(
                                "Partner '{}' transition '{}' step {} is required and holds {} features (max {})",
                                name,
                                transition.id,
                                index + 1,
                                step.features.len(),
                                max
                            );
                        }
                    }
                    for feature in &step.features {
                        if !seen_features.insert(feature.as_str()) {
                            anyhow::bail!(
                                "Partner '{}' transition '{}' assigns feature '{}' more than once",
                                name,
                                transition.id,
                                feature
                            );
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Resolve the feature catalog referenced by the scenario
    pub fn load_catalog(&self) -> Result<FeatureCatalog> {
        match &self.catalog {
            Some(path) => FeatureCatalog::from_file(path)
                .with_context(|| format!("Failed to load feature catalog {}", path)),
            None => Ok(FeatureCatalog::builtin()),
        }
    }

    /// Build a store by replaying the scenario through the store commands
    pub fn to_store(&self, catalog: FeatureCatalog) -> Result<PipelineStore> {
        let mut store = PipelineStore::new(catalog);

        for partner in &self.partners {
            let name = store.add_partner(Some(partner.name.as_str()))?;

            for transition in &partner.transitions {
                for (index, step_config) in transition.steps.iter().enumerate() {
                    let step_id = store.add_step(&name, transition.id)?;
                    store.set_step_execution_type(
                        &name,
                        transition.id,
                        &step_id,
                        step_config.execution_type,
                    )?;
                    for feature_id in &step_config.features {
                        let assigned = store
                            .assign_feature_to_step(&name, transition.id, &step_id, feature_id)
                            .with_context(|| {
                                format!(
                                    "Partner '{}' transition '{}' step {}",
                                    name,
                                    transition.id,
                                    index + 1
                                )
                            })?;
                        if !assigned {
                            anyhow::bail!(
                                "Feature '{}' does not fit in step {} of '{}'",
                                feature_id,
                                index + 1,
                                transition.id
                            );
                        }
                    }
                }

                if transition.configured {
                    store.save_transition_configuration(&name, transition.id)?;
                }
            }
        }

        Ok(store)
    }
}
