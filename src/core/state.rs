//! Feature execution state models

use crate::core::topology::Stage;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flat status of a feature, without timing data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureStatus {
    NotStarted,
    InProgress,
    Completed,
    Error,
}

impl FeatureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureStatus::NotStarted => "not-started",
            FeatureStatus::InProgress => "in-progress",
            FeatureStatus::Completed => "completed",
            FeatureStatus::Error => "error",
        }
    }
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution state of a selected feature
///
/// `NotStarted → InProgress → Completed` is driven by the simulation engine.
/// `Error` is only ever entered from outside the engine (a data-quality
/// checker) and left through an explicit recovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum FeatureState {
    NotStarted,
    InProgress {
        start_time: DateTime<Utc>,
    },
    Completed {
        start_time: DateTime<Utc>,
        completed_time: DateTime<Utc>,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_time: Option<DateTime<Utc>>,
        detected_time: DateTime<Utc>,
        reason: String,
        /// Stage the feature was running in when the error was raised
        #[serde(default, skip_serializing_if = "Option::is_none")]
        original_stage: Option<Stage>,
    },
}

impl FeatureState {
    pub fn status(&self) -> FeatureStatus {
        match self {
            FeatureState::NotStarted => FeatureStatus::NotStarted,
            FeatureState::InProgress { .. } => FeatureStatus::InProgress,
            FeatureState::Completed { .. } => FeatureStatus::Completed,
            FeatureState::Error { .. } => FeatureStatus::Error,
        }
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        match self {
            FeatureState::NotStarted => None,
            FeatureState::InProgress { start_time } => Some(*start_time),
            FeatureState::Completed { start_time, .. } => Some(*start_time),
            FeatureState::Error { start_time, .. } => *start_time,
        }
    }

    pub fn completed_time(&self) -> Option<DateTime<Utc>> {
        match self {
            FeatureState::Completed { completed_time, .. } => Some(*completed_time),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, FeatureState::Completed { .. })
    }

    /// Time spent so far in `InProgress`, or total run time once completed
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self {
            FeatureState::InProgress { start_time } => Some(now - *start_time),
            FeatureState::Completed {
                start_time,
                completed_time,
            } => Some(*completed_time - *start_time),
            _ => None,
        }
    }

    /// `NotStarted → InProgress`. Returns false from any other state.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if !matches!(self, FeatureState::NotStarted) {
            return false;
        }
        *self = FeatureState::InProgress { start_time: now };
        true
    }

    /// `InProgress → Completed`. Returns false from any other state.
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        let FeatureState::InProgress { start_time } = *self else {
            return false;
        };
        *self = FeatureState::Completed {
            start_time,
            completed_time: now,
        };
        true
    }

    /// Move to `Error`, keeping the start time if there was one
    pub fn fail(&mut self, reason: String, original_stage: Option<Stage>, now: DateTime<Utc>) {
        *self = FeatureState::Error {
            start_time: self.start_time(),
            detected_time: now,
            reason,
            original_stage,
        };
    }

    /// Back to `NotStarted`, clearing every timestamp
    pub fn reset(&mut self) {
        *self = FeatureState::NotStarted;
    }
}

impl Default for FeatureState {
    fn default() -> Self {
        FeatureState::NotStarted
    }
}

/// Status counts over a set of features
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub error: usize,
}

impl StatusCounts {
    pub fn from_statuses<I: IntoIterator<Item = FeatureStatus>>(statuses: I) -> Self {
        let mut counts = StatusCounts::default();
        for status in statuses {
            counts.record(status);
        }
        counts
    }

    pub fn record(&mut self, status: FeatureStatus) {
        match status {
            FeatureStatus::NotStarted => self.not_started += 1,
            FeatureStatus::InProgress => self.in_progress += 1,
            FeatureStatus::Completed => self.completed += 1,
            FeatureStatus::Error => self.error += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.not_started + self.in_progress + self.completed + self.error
    }

    /// Calculate progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total() as f64
    }
}
