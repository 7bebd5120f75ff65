//! Step domain model

use crate::core::feature::FeatureId;
use serde::{Deserialize, Serialize};

/// Capacity and run policy of a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionType {
    /// Exactly one feature, which must complete before the next step starts
    #[default]
    Required,
    /// Any number of features, all startable together
    Parallel,
}

impl ExecutionType {
    /// Maximum number of features the step may hold (None = unbounded)
    pub fn capacity(&self) -> Option<usize> {
        match self {
            ExecutionType::Required => Some(1),
            ExecutionType::Parallel => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionType::Required => "required",
            ExecutionType::Parallel => "parallel",
        }
    }
}

/// Direction for reordering a feature inside a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// An ordered unit of a transition's configuration
///
/// Steps hold feature ids only; execution state lives in the partner's
/// feature table. The feature list can only be changed through methods that
/// respect the execution type's capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub name: String,
    pub order: u32,
    features: Vec<FeatureId>,
    execution_type: ExecutionType,
}

impl Step {
    /// Create an empty `required` step numbered `number`
    pub fn new(number: u32) -> Self {
        Self {
            id: format!("step-{}", number),
            name: format!("Step {}", number),
            order: number,
            features: Vec::new(),
            execution_type: ExecutionType::Required,
        }
    }

    pub fn features(&self) -> &[FeatureId] {
        &self.features
    }

    pub fn execution_type(&self) -> ExecutionType {
        self.execution_type
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn contains(&self, feature_id: &str) -> bool {
        self.features.iter().any(|f| f == feature_id)
    }

    /// Whether one more feature fits under the capacity rule
    pub fn can_accept(&self) -> bool {
        match self.execution_type.capacity() {
            Some(max) => self.features.len() < max,
            None => true,
        }
    }

    /// Append a feature if capacity allows. Returns false otherwise.
    pub(crate) fn push(&mut self, feature_id: FeatureId) -> bool {
        if !self.can_accept() || self.contains(&feature_id) {
            return false;
        }
        self.features.push(feature_id);
        true
    }

    pub(crate) fn remove(&mut self, feature_id: &str) -> bool {
        let before = self.features.len();
        self.features.retain(|f| f != feature_id);
        self.features.len() != before
    }

    /// Change the execution type, clearing every assignment
    pub(crate) fn set_execution_type(&mut self, execution_type: ExecutionType) {
        self.execution_type = execution_type;
        self.features.clear();
    }

    /// Swap a feature with its neighbour. Out-of-range moves are no-ops.
    pub(crate) fn move_feature(&mut self, feature_id: &str, direction: MoveDirection) -> bool {
        let Some(index) = self.features.iter().position(|f| f == feature_id) else {
            return false;
        };
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|i| *i < self.features.len()),
        };
        match target {
            Some(target) => {
                self.features.swap(index, target);
                true
            }
            None => false,
        }
    }
}
