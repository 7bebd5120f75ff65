//! Per-transition task reports derived from the feature table

use crate::core::{ExecutionType, FeatureStatus, PipelineConfig, TransitionId};
use crate::store::PipelineStore;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One (step, feature) pair of a transition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    /// `<step-id>-<feature-id>`
    pub id: String,
    pub feature_id: String,
    pub feature_name: String,
    pub step_name: String,
    pub execution_type: ExecutionType,
    pub from_stage: String,
    pub to_stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_time: Option<DateTime<Utc>>,
    /// Seconds between start and completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    pub status: FeatureStatus,
}

/// Aggregated view of one configured transition of one partner
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageReport {
    pub partner: String,
    pub transition_id: TransitionId,
    pub from_stage: String,
    pub to_stage: String,
    pub tasks: Vec<TaskReport>,
    /// First task's start, or the aggregation time when it has not started
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_time: Option<DateTime<Utc>>,
    /// Sum of task durations, only once every task is completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<i64>,
    pub status: FeatureStatus,
}

impl StageReport {
    pub fn completed_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == FeatureStatus::Completed)
            .count()
    }
}

/// Transition status from its tasks: all completed, any activity, or none
pub fn derive_status(tasks: &[TaskReport]) -> FeatureStatus {
    let completed = tasks
        .iter()
        .filter(|t| t.status == FeatureStatus::Completed)
        .count();
    let in_progress = tasks
        .iter()
        .any(|t| t.status == FeatureStatus::InProgress);

    if !tasks.is_empty() && completed == tasks.len() {
        FeatureStatus::Completed
    } else if in_progress || completed > 0 {
        FeatureStatus::InProgress
    } else {
        FeatureStatus::NotStarted
    }
}

/// Reports for one partner, in transition display order
pub fn partner_reports(partner: &str, pipeline: &PipelineConfig, now: DateTime<Utc>) -> Vec<StageReport> {
    let mut reports = Vec::new();

    for transition in pipeline.transitions() {
        let stage = &transition.stage_config;
        if !stage.is_configured() || stage.steps().is_empty() {
            continue;
        }

        let from_stage = transition.from_stage().label().to_string();
        let to_stage = transition.to_stage().label().to_string();

        let mut tasks = Vec::new();
        for step in stage.steps_in_order() {
            for feature_id in step.features() {
                let Some(feature) = pipeline.feature(feature_id) else {
                    continue;
                };
                let start_time = feature.state.start_time();
                let completed_time = feature.state.completed_time();
                tasks.push(TaskReport {
                    id: format!("{}-{}", step.id, feature_id),
                    feature_id: feature_id.clone(),
                    feature_name: feature.name().to_string(),
                    step_name: step.name.clone(),
                    execution_type: step.execution_type(),
                    from_stage: from_stage.clone(),
                    to_stage: to_stage.clone(),
                    start_time,
                    completed_time,
                    duration: start_time
                        .zip(completed_time)
                        .map(|(start, end)| (end - start).num_seconds()),
                    status: feature.status(),
                });
            }
        }

        if tasks.is_empty() {
            continue;
        }

        let status = derive_status(&tasks);
        let all_completed = status == FeatureStatus::Completed;
        reports.push(StageReport {
            partner: partner.to_string(),
            transition_id: transition.id,
            from_stage,
            to_stage,
            start_time: tasks[0].start_time.unwrap_or(now),
            completed_time: if all_completed {
                tasks.iter().filter_map(|t| t.completed_time).max()
            } else {
                None
            },
            total_duration: if all_completed {
                Some(tasks.iter().filter_map(|t| t.duration).sum())
            } else {
                None
            },
            status,
            tasks,
        });
    }

    reports
}

/// Reports for every partner, in store order
pub fn aggregate(store: &PipelineStore, now: DateTime<Utc>) -> Vec<StageReport> {
    store
        .partners()
        .iter()
        .flat_map(|p| partner_reports(&p.name, &p.pipeline, now))
        .collect()
}
