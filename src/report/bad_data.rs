//! Bad data issues raised on the error-handling path
//!
//! Work that reached the `stage1-stage1b` transition is reported as a range
//! error. Features flagged through the store's error list are reported with
//! their recorded reason at critical severity.

use crate::core::{FeatureState, FeatureStatus, TransitionId};
use crate::store::{PartnerFilter, PipelineStore};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadDataIssue {
    pub partner: String,
    pub feature_id: String,
    pub issue_type: String,
    pub description: String,
    pub severity: Severity,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadDataSummary {
    pub total_issues: usize,
    pub critical_issues: usize,
    pub affected_partners: usize,
}

impl BadDataSummary {
    pub fn from_issues(issues: &[BadDataIssue]) -> Self {
        let partners: HashSet<&str> = issues.iter().map(|i| i.partner.as_str()).collect();
        Self {
            total_issues: issues.len(),
            critical_issues: issues
                .iter()
                .filter(|i| i.severity == Severity::Critical)
                .count(),
            affected_partners: partners.len(),
        }
    }
}

/// Issues for the partners under the filter, in store order
pub fn collect_issues(store: &PipelineStore, filter: &PartnerFilter, now: DateTime<Utc>) -> Vec<BadDataIssue> {
    let today = now.date_naive();
    let mut issues = Vec::new();

    for partner in store.partners().iter().filter(|p| filter.matches(&p.name)) {
        let pipeline = &partner.pipeline;

        for feature_id in pipeline
            .stage_config(TransitionId::Stage1Stage1B)
            .assigned_feature_ids()
        {
            let Some(feature) = pipeline.feature(feature_id) else {
                continue;
            };
            if matches!(feature.status(), FeatureStatus::InProgress | FeatureStatus::Completed) {
                issues.push(BadDataIssue {
                    partner: partner.name.clone(),
                    feature_id: feature_id.to_string(),
                    issue_type: "Range Error".to_string(),
                    description: format!("Error detected in {}", feature.name()),
                    severity: Severity::High,
                    date: today,
                });
            }
        }

        for feature_id in partner.error_feature_ids() {
            let Some(feature) = pipeline.feature(feature_id) else {
                continue;
            };
            if let FeatureState::Error {
                reason,
                detected_time,
                ..
            } = &feature.state
            {
                issues.push(BadDataIssue {
                    partner: partner.name.clone(),
                    feature_id: feature_id.clone(),
                    issue_type: reason.clone(),
                    description: format!("Error detected in {}", feature.name()),
                    severity: Severity::Critical,
                    date: detected_time.date_naive(),
                });
            }
        }
    }

    issues
}
