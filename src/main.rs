use anyhow::{Context, Result};
use chrono::Utc;
use etl_pipeline::cli::commands::{CatalogCommand, ExportCommand, RunCommand, ValidateCommand};
use etl_pipeline::cli::output::*;
use etl_pipeline::cli::{Cli, Command};
use etl_pipeline::execution::{scheduler, SimulationEngine, SimulationEvent, SimulationRunner, StopReason};
use etl_pipeline::report::{aggregate, analytics, bad_data, BadDataSummary};
use etl_pipeline::{export, FeatureCatalog, PartnerFilter, PipelineStore, ScenarioConfig};
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; RUST_LOG wins over --verbose
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(log_level.into()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_simulation(cmd).await?,
        Command::Validate(cmd) => validate_scenario(cmd)?,
        Command::Catalog(cmd) => show_catalog(cmd)?,
        Command::Export(cmd) => export_configs(cmd)?,
    }

    Ok(())
}

fn load_scenario(path: &Path) -> Result<(ScenarioConfig, PipelineStore)> {
    let config = ScenarioConfig::from_file(path).context("Failed to load scenario")?;
    let catalog = config.load_catalog()?;
    let store = config.to_store(catalog)?;
    Ok((config, store))
}

async fn run_simulation(cmd: &RunCommand) -> Result<()> {
    let (config, mut store) = load_scenario(&cmd.file)?;
    println!(
        "{} Loaded scenario: {}",
        INFO,
        style(config.name.as_deref().unwrap_or("unnamed")).bold()
    );

    let partners: Vec<String> = if cmd.partner.is_empty() {
        store.partner_names().into_iter().map(String::from).collect()
    } else {
        cmd.partner.clone()
    };

    let progress = create_progress_bar(0);
    let bar = progress.clone();
    let mut engine = SimulationEngine::new(config.simulation.clone());
    engine.add_event_handler(move |event| {
        bar.println(format_event(event));
        match event {
            SimulationEvent::RunStarted { features, .. } => bar.inc_length(*features as u64),
            SimulationEvent::FeatureCompleted { .. } => bar.inc(1),
            _ => {}
        }
    });

    let start = Utc::now();
    let mut started = 0;
    for partner in &partners {
        match engine.start_run(&mut store, partner, start) {
            Ok(()) => started += 1,
            Err(e) => progress.println(format!("{} {}", WARN, style(e).yellow())),
        }
    }

    if started == 0 {
        progress.finish_and_clear();
        println!("{} No partner is ready to run", CROSS);
        std::process::exit(1);
    }

    let mut runner = SimulationRunner::new(store, engine).with_speed(cmd.speed);
    if let Some(max_ticks) = cmd.max_ticks {
        runner = runner.with_max_ticks(max_ticks);
    }

    let shutdown = runner.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.shutdown();
        }
    });

    let outcome = runner.run(start).await;
    progress.finish_and_clear();

    let store = runner.store();
    let store = store.lock().await;
    let now = outcome.simulated_end;
    let elapsed = (now - start).num_seconds();

    match outcome.reason {
        StopReason::Completed => println!(
            "\n{} All partners completed {} ({} ticks, {} simulated)",
            CHECK,
            style("successfully").green(),
            outcome.ticks,
            format_duration(elapsed)
        ),
        StopReason::TickLimit => println!(
            "\n{} Stopped at tick limit ({} ticks); still running: {}",
            WARN,
            outcome.ticks,
            store.running_partners().join(", ")
        ),
        StopReason::Shutdown => println!("\n{} Interrupted after {} ticks", WARN, outcome.ticks),
    }

    for partner in store.running_partners() {
        let Some(pipeline) = store.pipeline(partner) else {
            continue;
        };
        let eligible: Vec<String> = scheduler::unlocked_slots(pipeline)
            .into_iter()
            .filter(|slot| pipeline.feature(&slot.feature_id).is_some_and(|f| !f.state.is_completed()))
            .map(|slot| format!("{}/{}", slot.transition, slot.feature_id))
            .collect();
        println!("  {} waiting on: {}", style(partner).bold(), eligible.join(", "));
    }

    let reports = aggregate(&store, now);
    if cmd.report {
        println!("\n{}", style("Stage reports").bold());
        for report in &reports {
            println!("{}", format_stage_report(report));
        }
    }

    if let Some(distribution) = analytics::status_distribution(&store, &PartnerFilter::All) {
        println!(
            "{} Features: {}% completed, {}% in progress, {}% not started",
            INFO,
            style(distribution.completed).green(),
            style(distribution.in_progress).yellow(),
            style(distribution.not_started).dim()
        );
    }
    let issues = bad_data::collect_issues(&store, &PartnerFilter::All, now);
    println!("{}", format_bad_data_summary(&BadDataSummary::from_issues(&issues)));

    if let Some(dir) = &cmd.export_dir {
        let date = now.date_naive();
        let json = export::export_stage_reports(&reports)?;
        let path = export::write_export(dir, &export::stage_reports_file_name(date), &json)?;
        println!("{} Wrote {}", CHECK, style(path.display()).dim());

        for partner in store.partner_names() {
            let json = export::export_partner_config(&store, partner, now)?;
            let path = export::write_export(dir, &export::partner_config_file_name(partner, date), &json)?;
            println!("{} Wrote {}", CHECK, style(path.display()).dim());
        }
    }

    Ok(())
}

fn validate_scenario(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating scenario...", INFO);

    let (config, store) = match load_scenario(&cmd.file) {
        Ok(loaded) => loaded,
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    };

    println!("{} Scenario is valid!", CHECK);
    if let Some(name) = &config.name {
        println!("  Name: {}", style(name).bold());
    }
    println!("  Partners: {}", style(store.partners().len()).cyan());
    println!(
        "  Tick: {}s, start threshold {}, minimum {}s in progress",
        config.simulation.tick_interval_secs,
        config.simulation.start_threshold,
        config.simulation.min_in_progress_secs
    );

    let validations: Vec<_> = store
        .partner_names()
        .into_iter()
        .map(|partner| store.validate_for_run(partner))
        .collect();
    for validation in &validations {
        println!("  {}", format_validation(validation));
    }

    if cmd.json {
        println!("\n{}", serde_json::to_string_pretty(&validations)?);
    }
    Ok(())
}

fn show_catalog(cmd: &CatalogCommand) -> Result<()> {
    let catalog = match &cmd.file {
        Some(path) => FeatureCatalog::from_file(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => FeatureCatalog::builtin(),
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(catalog.groups())?);
        return Ok(());
    }

    println!("{} {} features in {} groups", INFO, catalog.len(), catalog.groups().len());
    for group in catalog.groups() {
        println!("\n{} {}", style(&group.name).bold(), style(&group.description).dim());
        for feature in &group.features {
            println!(
                "  {} {:<6} {:<42} {:<7} {}s",
                feature.icon,
                style(&feature.id).cyan(),
                feature.name,
                format!("{:?}", feature.priority).to_lowercase(),
                feature.estimated_time
            );
        }
    }
    Ok(())
}

fn export_configs(cmd: &ExportCommand) -> Result<()> {
    let (_, store) = load_scenario(&cmd.file)?;
    let now = Utc::now();

    let partners: Vec<String> = match &cmd.partner {
        Some(partner) => vec![partner.clone()],
        None => store.partner_names().into_iter().map(String::from).collect(),
    };

    for partner in &partners {
        let json = export::export_partner_config(&store, partner, now)?;
        match &cmd.output {
            Some(dir) => {
                let name = export::partner_config_file_name(partner, now.date_naive());
                let path = export::write_export(dir, &name, &json)?;
                println!("{} Wrote {}", CHECK, style(path.display()).dim());
            }
            None => println!("{}", json),
        }
    }
    Ok(())
}
