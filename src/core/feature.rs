//! Feature domain model

use crate::core::state::{FeatureState, FeatureStatus};
use serde::{Deserialize, Serialize};

/// Feature identifiers are catalog ids such as `"1001"`
pub type FeatureId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Immutable catalog definition of a processing feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: FeatureId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub icon: String,
    pub priority: Priority,
    /// Estimated duration in seconds (informational, not used for timing)
    #[serde(default)]
    pub estimated_time: u64,
}

/// A feature a partner has opted into, with its execution state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedFeature {
    #[serde(flatten)]
    pub feature: Feature,
    #[serde(flatten)]
    pub state: FeatureState,
}

impl SelectedFeature {
    pub fn new(feature: Feature) -> Self {
        Self {
            feature,
            state: FeatureState::NotStarted,
        }
    }

    pub fn id(&self) -> &str {
        &self.feature.id
    }

    pub fn name(&self) -> &str {
        &self.feature.name
    }

    pub fn status(&self) -> FeatureStatus {
        self.state.status()
    }
}
