//! etl-pipeline - configure and simulate partner ETL pipelines

pub mod cli;
pub mod core;
pub mod execution;
pub mod export;
pub mod report;
pub mod store;

// Re-export commonly used types
pub use crate::core::config::{ScenarioConfig, SimulationSettings};
pub use crate::core::{
    ExecutionType, Feature, FeatureCatalog, FeatureState, FeatureStatus, PipelineConfig, Stage,
    Step, TransitionId,
};
pub use execution::{RunError, SimulationEngine, SimulationEvent, SimulationRunner};
pub use report::{StageReport, TaskReport};
pub use store::{PartnerFilter, PipelineStore, RunValidation, StoreError};
