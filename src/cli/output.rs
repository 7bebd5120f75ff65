//! CLI output formatting

use crate::{
    core::{FeatureStatus, Stage, TransitionId},
    execution::SimulationEvent,
    report::{BadDataSummary, StageReport},
    store::RunValidation,
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar over the features of a run
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a feature status for display
pub fn format_status(status: FeatureStatus) -> String {
    match status {
        FeatureStatus::NotStarted => style("NOT STARTED").dim().to_string(),
        FeatureStatus::InProgress => style("IN PROGRESS").yellow().to_string(),
        FeatureStatus::Completed => style("COMPLETED").green().to_string(),
        FeatureStatus::Error => style("ERROR").red().to_string(),
    }
}

/// `Xm Ys`
pub fn format_duration(seconds: i64) -> String {
    format!("{}m {}s", seconds / 60, seconds % 60)
}

fn transition_label(transition: &TransitionId) -> String {
    format!(
        "{} → {}",
        style(transition.from_stage()).dim(),
        style(transition.to_stage()).cyan()
    )
}

/// Format a simulation event for display
pub fn format_event(event: &SimulationEvent) -> String {
    match event {
        SimulationEvent::RunStarted { partner, features } => format!(
            "{} Starting {} ({} features)",
            ROCKET,
            style(partner).bold(),
            features
        ),
        SimulationEvent::FeatureStarted {
            partner,
            transition,
            step_id,
            feature_id,
            ..
        } => format!(
            "{} {} {} [{}] {}",
            SPINNER,
            style(partner).bold(),
            transition_label(transition),
            style(step_id).dim(),
            style(feature_id).cyan()
        ),
        SimulationEvent::FeatureCompleted {
            partner,
            transition,
            step_id,
            feature_id,
            duration_secs,
            ..
        } => format!(
            "{} {} {} [{}] {} ({})",
            CHECK,
            style(partner).bold(),
            transition_label(transition),
            style(step_id).dim(),
            style(feature_id).green(),
            style(format_duration(*duration_secs)).dim()
        ),
        SimulationEvent::PartnerCompleted { partner, .. } => format!(
            "{} {} reached {}",
            INFO,
            style(partner).bold(),
            style(Stage::Target).green()
        ),
    }
}

/// Format a stage report as a header line plus one line per task
pub fn format_stage_report(report: &StageReport) -> String {
    let mut out = format!(
        "  {} {} → {}  {}  {}/{} tasks",
        style(&report.partner).bold(),
        report.from_stage,
        report.to_stage,
        format_status(report.status),
        report.completed_tasks(),
        report.tasks.len()
    );
    if let Some(total) = report.total_duration {
        out.push_str(&format!("  {}", style(format_duration(total)).dim()));
    }

    for task in &report.tasks {
        out.push_str(&format!(
            "\n    {:<8} {:<9} {:<6} {:<40} {}",
            task.step_name,
            task.execution_type.as_str(),
            task.feature_id,
            task.feature_name,
            format_status(task.status)
        ));
    }
    out
}

pub fn format_validation(validation: &RunValidation) -> String {
    if validation.is_valid {
        format!("{} {} is ready to run", CHECK, style(&validation.partner).bold())
    } else {
        format!("{} {}", WARN, style(&validation.message).yellow())
    }
}

pub fn format_bad_data_summary(summary: &BadDataSummary) -> String {
    format!(
        "{} Bad data: {} issue(s), {} critical, {} partner(s) affected",
        if summary.total_issues == 0 { INFO } else { WARN },
        style(summary.total_issues).cyan(),
        style(summary.critical_issues).red(),
        summary.affected_partners
    )
}
