//! CLI entrypoint for avp-sweep
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use avp_sweep_application::{
    FindMaxSafeUseCase, NoProgress, NoRoundLogger, ResultExporter, RoundCoordinator, RoundLogger,
    RunSweepError, RunSweepInput, RunSweepUseCase, SweepProgressNotifier, VoteArtifactProbe,
};
use avp_sweep_domain::{OutputFormat, SweepConfiguration};
use avp_sweep_infrastructure::{
    ConfigLoader, FileConfig, FileResultExporter, FileSettlementPolicy, JsonlRoundLogger,
    TokioProcessLauncher,
};
use avp_sweep_presentation::{Cli, ConsoleFormatter, ProgressReporter, SettleMode, SimpleProgress};
use clap::Parser;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const EXIT_USAGE: u8 = 1;
const EXIT_TOOLING: u8 = 4;
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::from(EXIT_USAGE)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting avp-sweep");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_cli_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    if cli.predict {
        println!(
            "{}",
            ConsoleFormatter::format_predictions(&config.sweep.moduli)
        );
        return Ok(ExitCode::SUCCESS);
    }

    let configurations = config.sweep.configurations()?;
    let format = config.output.format.unwrap_or_default();

    // Fail before the first round if a program is missing
    if let Some(first) = configurations.first()
        && let Err(e) = configure_launcher(&config, first.modulus()).preflight()
    {
        error!("Preflight failed: {}", e);
        eprintln!("{} {}", "Tooling failure:".red().bold(), e);
        return Ok(ExitCode::from(EXIT_TOOLING));
    }

    // === Dependency Injection ===
    let round_logger: Arc<dyn RoundLogger> = match &config.output.round_log {
        Some(path) => Arc::new(
            JsonlRoundLogger::new(path)
                .ok_or_else(|| anyhow!("Could not create round log {}", path.display()))?,
        ),
        None => Arc::new(NoRoundLogger),
    };
    let artifacts: Arc<dyn VoteArtifactProbe> = Arc::new(config.settlement.artifact_probe());
    let params = config.round_params();

    let cancellation = CancellationToken::new();
    spawn_interrupt_handler(cancellation.clone());

    let use_case = RunSweepUseCase::new(
        FindMaxSafeUseCase::new()
            .with_logger(round_logger)
            .with_cancellation(cancellation),
    );
    let input = RunSweepInput::new(configurations).with_strategy(config.sweep.strategy);

    // One launcher and coordinator per modulus
    let executor_for = |sweep: &SweepConfiguration| {
        let launcher = configure_launcher(&config, sweep.modulus());
        RoundCoordinator::new(Arc::new(launcher), params.clone())
            .with_artifact_probe(Arc::clone(&artifacts))
    };

    if format == OutputFormat::Table && !cli.quiet {
        print_header(&config);
    }

    let progress: Box<dyn SweepProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if cli.verbose > 0 && format == OutputFormat::Table {
        Box::new(SimpleProgress)
    } else {
        Box::new(ProgressReporter::new())
    };

    let output = match use_case
        .execute_with_progress(input, executor_for, progress.as_ref())
        .await
    {
        Ok(output) => output,
        Err(e) => {
            // Keep whatever was measured before the sweep stopped
            if let Some(path) = &config.output.results_path
                && let Some(completed) = e.completed()
                && !completed.is_empty()
            {
                match FileResultExporter::new(path).export(completed) {
                    Ok(()) => info!(
                        "Exported {} completed boundaries to {}",
                        completed.len(),
                        path.display()
                    ),
                    Err(export) => warn!("Could not export completed boundaries: {}", export),
                }
            }
            return Ok(failure_exit(e));
        }
    };

    if let Some(path) = &config.output.results_path {
        FileResultExporter::new(path).export(&output.result)?;
    }

    println!("{}", ConsoleFormatter::format(&output, format));

    let verdict = output.verdict();
    info!("Sweep finished: {}", verdict.as_str());
    Ok(ExitCode::from(verdict.exit_code()))
}

/// Initialize logging based on verbosity level, optionally mirrored to a file
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("--log-file needs a file name: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Could not create log directory {}", dir.display()))?;

            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(console)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Command-line flags win over every configuration source
fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if !cli.moduli.is_empty() {
        config.sweep.moduli = cli.moduli.clone();
    }
    if let Some(max) = cli.max_parties {
        config.sweep.max_party_count = max;
    }
    if let Some(strategy) = cli.strategy {
        config.sweep.strategy = strategy.into();
    }
    if let Some(marker) = &cli.marker {
        config.sweep.success_marker = marker.clone();
    }
    if let Some(settle) = cli.settle {
        config.settlement.policy = match settle {
            SettleMode::Fixed => FileSettlementPolicy::Fixed,
            SettleMode::Barrier => FileSettlementPolicy::Barrier,
            SettleMode::Poll => FileSettlementPolicy::Poll,
        };
    }
    if let Some(secs) = cli.settle_secs {
        config.settlement.delay_secs = secs;
    }
    if let Some(secs) = cli.timeout_secs {
        config.settlement.timeout_secs = secs;
    }
    if cli.reap_by_name {
        config.settlement.reap_stale_by_name = true;
    }
    if let Some(dir) = &cli.working_dir {
        config.protocol.working_dir = Some(dir.clone());
    }
    if let Some(format) = cli.output {
        config.output.format = Some(format.into());
    }
    if let Some(path) = &cli.results {
        config.output.results_path = Some(path.clone());
    }
    if let Some(path) = &cli.round_log {
        config.output.round_log = Some(path.clone());
    }
    if cli.no_color {
        config.output.color = false;
    }
}

fn configure_launcher(config: &FileConfig, modulus: u64) -> TokioProcessLauncher {
    let launcher = TokioProcessLauncher::new(config.protocol.commands())
        .with_modulus(&config.protocol.modulus_env, modulus)
        .with_utility_timeout(Duration::from_secs(config.protocol.utility_timeout_secs));

    match &config.protocol.working_dir {
        Some(dir) => launcher.with_working_dir(dir),
        None => launcher,
    }
}

/// Ctrl-C stops the sweep between rounds; a second one exits at once
fn spawn_interrupt_handler(cancellation: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupted, stopping after the current round");
        eprintln!("Interrupted, stopping after the current round (Ctrl-C again to abort)");
        cancellation.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(i32::from(EXIT_INTERRUPTED));
        }
    });
}

fn failure_exit(e: RunSweepError) -> ExitCode {
    if e.is_cancelled() {
        eprintln!("{}", "Sweep cancelled".yellow());
        return ExitCode::from(EXIT_INTERRUPTED);
    }

    error!("{}", e);
    if e.is_tooling_failure() {
        eprintln!("{} {}", "Tooling failure:".red().bold(), e);
        ExitCode::from(EXIT_TOOLING)
    } else {
        eprintln!("{} {}", "Error:".red().bold(), e);
        ExitCode::from(EXIT_USAGE)
    }
}

fn print_header(config: &FileConfig) {
    println!();
    println!("+============================================================+");
    println!("|           avp-sweep - AVP Threshold Search                 |");
    println!("+============================================================+");
    println!();
    println!(
        "Moduli: {}",
        config
            .sweep
            .moduli
            .iter()
            .map(|q| q.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Max parties: {}", config.sweep.max_party_count);
    println!(
        "Strategy: {}, settlement: {}",
        config.sweep.strategy, config.settlement.policy
    );
    println!();
}
