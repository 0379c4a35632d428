//! Main entry point for the tuner binary
//!
//! Wires the real chat services, case store and artifact store into the
//! tuning loop.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use oracles::{
    ChatAnalyzer, ChatPredictor, ChatPromptGenerator, RealChatClient, RetryPolicy, ServiceEndpoint,
    OPTIMIZER_TEMPERATURE, PREDICTOR_TEMPERATURE,
};
use shared::{logging, run_info, run_warn, RunId};
use tuner::services::{prepare_from_csv, CaseStore, CsvColumns, RealArtifactStore, TracingReporter};
use tuner::{PromptTuner, TunerConfig, DEFAULT_TEMPLATE};

/// Iterative prompt tuner for diagnosis-list generation
#[derive(Parser)]
#[command(name = "tuner")]
#[command(about = "Refines a diagnosis prompt against ground-truth cases using text-generation services")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the tuning loop over a prepared data directory
    Run(RunArgs),
    /// Convert a CSV export into per-case input and ground-truth files
    Prepare(PrepareArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Directory containing inputs/ and gts/
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory for best prompts and the final report
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Directory for run logs and per-round results
    #[arg(long, default_value = "logs")]
    logs_dir: PathBuf,

    /// Initial template file (built-in template when omitted)
    #[arg(long)]
    template: Option<PathBuf>,

    #[arg(long, default_value = "10")]
    max_rounds: u32,

    /// Cases evaluated per round before stagnation extends the sample
    #[arg(long, default_value = "3")]
    base_sample: usize,

    /// Non-improving rounds that end the run
    #[arg(long, default_value = "5")]
    stagnation_limit: u32,

    /// Cases evaluated concurrently
    #[arg(long, default_value = "4")]
    concurrency: usize,

    /// Attempts per service call
    #[arg(long, default_value = "3")]
    retry_attempts: u32,

    /// Initial retry backoff in milliseconds
    #[arg(long, default_value = "1000")]
    retry_backoff_ms: u64,

    /// Per-attempt deadline in seconds
    #[arg(long, default_value = "120")]
    call_timeout_secs: u64,

    /// Do not write a per-run log file
    #[arg(long)]
    no_log_file: bool,
}

#[derive(Args)]
struct PrepareArgs {
    /// CSV export with id, content and ground-truth columns
    csv: PathBuf,

    /// Output data directory
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    #[arg(long, default_value = "ID号")]
    id_column: String,

    #[arg(long, default_value = "content")]
    content_column: String,

    #[arg(long, default_value = "gt")]
    truth_column: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run(args, &cli.log_level).await,
        Command::Prepare(args) => prepare(args, &cli.log_level),
    }
}

async fn run(args: RunArgs, log_level: &str) -> anyhow::Result<()> {
    let log_file = (!args.no_log_file)
        .then(|| args.logs_dir.join(format!("optimization_{}.log", logging::file_timestamp())));
    logging::init_tracing_with_file(Some(log_level), log_file.as_deref()).context("failed to initialize logging")?;

    let run_id = RunId::new();
    logging::log_startup(&run_id, "diagnosis prompt tuner");

    oracles::load_env();
    let predictor_endpoint =
        ServiceEndpoint::from_env("PREDICTOR", PREDICTOR_TEMPERATURE).context("predictor endpoint")?;
    let optimizer_endpoint =
        ServiceEndpoint::from_env("OPTIMIZER", OPTIMIZER_TEMPERATURE).context("optimizer endpoint")?;
    let analyzer_endpoint =
        ServiceEndpoint::from_env_or("ANALYZER", &optimizer_endpoint).context("analyzer endpoint")?;
    run_info!(
        run_id,
        predictor = %predictor_endpoint.model,
        optimizer = %optimizer_endpoint.model,
        analyzer = %analyzer_endpoint.model,
        "🔑 Service endpoints configured"
    );

    let initial_prompt = match &args.template {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read template {}", path.display()))?,
        None => DEFAULT_TEMPLATE.to_string(),
    };

    let load = CaseStore::new(&args.data_dir)
        .load()
        .await
        .with_context(|| format!("failed to load cases from {}", args.data_dir.display()))?;
    for failure in &load.failures {
        run_warn!(run_id, error = %failure, "✗ Case not loaded");
    }
    run_info!(run_id, "📂 Loaded {} valid cases", load.cases.len());
    if load.cases.is_empty() {
        bail!("no valid cases found in {}", args.data_dir.display());
    }

    let policy = RetryPolicy::new(
        args.retry_attempts,
        Duration::from_millis(args.retry_backoff_ms),
        Duration::from_secs(args.call_timeout_secs),
    );
    let predictor = ChatPredictor::new(RealChatClient::new(predictor_endpoint), policy.clone());
    let generator = ChatPromptGenerator::new(RealChatClient::new(optimizer_endpoint), policy.clone());
    let analyzer = ChatAnalyzer::new(RealChatClient::new(analyzer_endpoint), policy);

    let config = TunerConfig {
        max_rounds: args.max_rounds,
        base_sample_size: args.base_sample,
        stagnation_limit: args.stagnation_limit,
        concurrency: args.concurrency,
        results_dir: args.results_dir.clone(),
        logs_dir: args.logs_dir.clone(),
        ..TunerConfig::default()
    };

    let tuner = PromptTuner::new(
        predictor,
        generator,
        analyzer,
        RealArtifactStore::new(&args.results_dir, &args.logs_dir),
        TracingReporter::new(run_id),
        config,
    );

    let outcome = match tuner.run(&initial_prompt, &load.cases).await {
        Ok(outcome) => outcome,
        Err(e) => {
            logging::log_error(&run_id, "Tuning run", &e);
            return Err(e.into());
        }
    };

    logging::log_success(
        &run_id,
        &format!(
            "Finished after {} rounds ({}), best overlap {:.2}%",
            outcome.rounds(),
            outcome.termination_cause,
            outcome.best_score * 100.0
        ),
    );
    run_info!(
        run_id,
        "Best prompt saved to {}",
        args.results_dir.join("best_prompt.txt").display()
    );
    if let Some(path) = log_file {
        run_info!(run_id, "Run log saved to {}", path.display());
    }

    Ok(())
}

fn prepare(args: PrepareArgs, log_level: &str) -> anyhow::Result<()> {
    logging::init_tracing(Some(log_level)).context("failed to initialize logging")?;
    let run_id = RunId::new();

    let columns = CsvColumns {
        id: args.id_column,
        content: args.content_column,
        truth: args.truth_column,
    };
    let summary = prepare_from_csv(&args.csv, &args.data_dir, &columns)
        .with_context(|| format!("failed to prepare cases from {}", args.csv.display()))?;

    logging::log_success(
        &run_id,
        &format!(
            "Wrote {} cases to {} ({} rows without id skipped)",
            summary.written,
            args.data_dir.display(),
            summary.skipped
        ),
    );
    Ok(())
}
