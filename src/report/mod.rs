//! Derived views over the store: stage reports, analytics, bad data

pub mod aggregator;
pub mod analytics;
pub mod bad_data;

pub use aggregator::{aggregate, partner_reports, StageReport, TaskReport};
pub use analytics::{PartnerCompletion, StatusDistribution};
pub use bad_data::{BadDataIssue, BadDataSummary, Severity};
