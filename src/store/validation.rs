//! Pre-run configuration check

use crate::core::{PipelineConfig, TransitionId};
use serde::Serialize;

/// Outcome of checking whether a partner's pipeline may run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunValidation {
    pub partner: String,
    pub is_valid: bool,
    /// Main-line transitions that are unsaved or hold no features
    pub unconfigured: Vec<TransitionId>,
    /// Human-readable advisory, empty when valid
    pub message: String,
}

impl RunValidation {
    pub fn check(partner: &str, pipeline: &PipelineConfig) -> Self {
        let unconfigured: Vec<TransitionId> = TransitionId::REQUIRED
            .iter()
            .copied()
            .filter(|id| !pipeline.stage_config(*id).is_ready())
            .collect();

        if unconfigured.is_empty() {
            return Self {
                partner: partner.to_string(),
                is_valid: true,
                unconfigured,
                message: String::new(),
            };
        }

        let names: Vec<String> = unconfigured.iter().map(|id| id.label()).collect();
        Self {
            partner: partner.to_string(),
            is_valid: false,
            message: format!(
                "Please configure the following transitions for {} before running: {}",
                partner,
                names.join(", ")
            ),
            unconfigured,
        }
    }

    pub fn partner_not_found(partner: &str) -> Self {
        Self {
            partner: partner.to_string(),
            is_valid: false,
            unconfigured: Vec::new(),
            message: "Partner configuration not found".to_string(),
        }
    }
}
