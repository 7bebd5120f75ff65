//! Status distribution and completion summaries

use crate::core::StatusCounts;
use crate::store::{PartnerFilter, PipelineStore};
use serde::Serialize;

/// Share of each status over the filtered features, in rounded percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDistribution {
    pub completed: u32,
    pub in_progress: u32,
    pub not_started: u32,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartnerCompletion {
    pub name: String,
    /// Completed over selected features, rounded percent
    pub completion: u32,
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

fn filtered_counts(store: &PipelineStore, filter: &PartnerFilter) -> StatusCounts {
    StatusCounts::from_statuses(
        store
            .partners()
            .iter()
            .filter(|p| filter.matches(&p.name))
            .flat_map(|p| p.pipeline.selected_features().iter().map(|f| f.status())),
    )
}

/// `None` when no feature is selected under the filter
pub fn status_distribution(store: &PipelineStore, filter: &PartnerFilter) -> Option<StatusDistribution> {
    let counts = filtered_counts(store, filter);
    let total = counts.total();
    if total == 0 {
        return None;
    }
    Some(StatusDistribution {
        completed: percent(counts.completed, total),
        in_progress: percent(counts.in_progress, total),
        not_started: percent(counts.not_started, total),
        total,
    })
}

pub fn partner_completion(store: &PipelineStore, filter: &PartnerFilter) -> Vec<PartnerCompletion> {
    store
        .partners()
        .iter()
        .filter(|p| filter.matches(&p.name))
        .map(|p| {
            let counts = p.pipeline.status_counts();
            PartnerCompletion {
                name: p.name.clone(),
                completion: percent(counts.completed, counts.total()),
            }
        })
        .collect()
}

/// Any feature under the filter is in progress or completed
pub fn has_data(store: &PipelineStore, filter: &PartnerFilter) -> bool {
    store
        .partners()
        .iter()
        .filter(|p| filter.matches(&p.name))
        .any(|p| p.pipeline.has_activity())
}
