//! JSON exports of partner configurations and stage reports

use crate::core::{ExecutionType, PipelineConfig, SelectedFeature, StageConfig, TransitionId};
use crate::report::StageReport;
use crate::store::{PipelineStore, StoreError};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransitionExport<'a> {
    id: TransitionId,
    from_stage: &'a str,
    to_stage: &'a str,
    features: Vec<&'a SelectedFeature>,
    allow_parallel_execution: bool,
    stage_config: &'a StageConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PipelineExport<'a> {
    transitions: Vec<TransitionExport<'a>>,
    selected_features: &'a [SelectedFeature],
    stage_configs: Vec<&'a StageConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PartnerExport<'a> {
    partner: &'a str,
    pipeline_config: PipelineExport<'a>,
    timestamp: DateTime<Utc>,
}

fn pipeline_export(pipeline: &PipelineConfig) -> PipelineExport<'_> {
    let transitions = pipeline
        .transitions()
        .iter()
        .map(|t| TransitionExport {
            id: t.id,
            from_stage: t.from_stage().label(),
            to_stage: t.to_stage().label(),
            features: pipeline.transition_features(t.id),
            allow_parallel_execution: t
                .stage_config
                .steps()
                .iter()
                .any(|s| s.execution_type() == ExecutionType::Parallel),
            stage_config: &t.stage_config,
        })
        .collect();

    PipelineExport {
        transitions,
        selected_features: pipeline.selected_features(),
        stage_configs: pipeline.transitions().iter().map(|t| &t.stage_config).collect(),
    }
}

/// Pretty-printed snapshot of one partner's configuration and feature state
pub fn export_partner_config(store: &PipelineStore, partner: &str, now: DateTime<Utc>) -> Result<String> {
    let pipeline = store
        .pipeline(partner)
        .ok_or_else(|| StoreError::PartnerNotFound(partner.to_string()))?;

    let export = PartnerExport {
        partner,
        pipeline_config: pipeline_export(pipeline),
        timestamp: now,
    };
    serde_json::to_string_pretty(&export).context("Failed to serialize partner configuration")
}

/// `<partner>-pipeline-config-<yyyy-mm-dd>.json`
///
/// Path separators and characters not allowed in file names are replaced
/// with `_`, so the name never leaves the export directory.
pub fn partner_config_file_name(partner: &str, date: NaiveDate) -> String {
    format!(
        "{}-pipeline-config-{}.json",
        sanitize_file_component(partner),
        date.format("%Y-%m-%d")
    )
}

fn sanitize_file_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

pub fn export_stage_reports(reports: &[StageReport]) -> Result<String> {
    serde_json::to_string_pretty(reports).context("Failed to serialize stage reports")
}

/// `stage-reports-<yyyy-mm-dd>.json`
pub fn stage_reports_file_name(date: NaiveDate) -> String {
    format!("stage-reports-{}.json", date.format("%Y-%m-%d"))
}

/// Write an export into `dir`, creating the directory if needed
pub fn write_export(dir: &Path, file_name: &str, json: &str) -> Result<PathBuf> {
    if Path::new(file_name).file_name().and_then(|n| n.to_str()) != Some(file_name) {
        anyhow::bail!("Export file name must not contain a path: {}", file_name);
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
    let path = dir.join(file_name);
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
