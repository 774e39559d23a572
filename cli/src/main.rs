//! CLI entrypoint for Copilot Council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{
    ConversationLogger, CouncilConfig, NoConversationLogger, NoProgress, ProgressNotifier,
    RunCouncilUseCase,
};
use council_domain::{ConfigIssue, OutputFormat, Question, Severity};
use council_infrastructure::{
    ConfigLoader, CopilotLlmGateway, FileConfig, JsonlConversationLogger,
};
use council_presentation::{
    Cli, ConsoleFormatter, ProgressReporter, SimpleProgress, spinners_supported,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level; RUST_LOG wins when set
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(ExitCode::SUCCESS);
    }

    info!("Starting Copilot Council");

    // === Configuration ===
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")?
    };

    let issues = file_config.validate();
    report_issues(&issues);
    if ConfigIssue::has_errors(&issues) {
        bail!("invalid configuration");
    }

    let config = build_config(&cli, &file_config);
    config.validate()?;

    if !file_config.output.color {
        colored::control::set_override(false);
    }

    let format = cli
        .output
        .map(OutputFormat::from)
        .or(file_config.output.format)
        .unwrap_or_default();

    let question = match &cli.question {
        Some(q) => Question::new(q.as_str())?,
        None => bail!("a question is required"),
    };

    let logger: Arc<dyn ConversationLogger> = match transcript_path(&cli, &file_config) {
        Some(path) => {
            let logger = JsonlConversationLogger::new(&path)
                .with_context(|| format!("failed to open transcript {}", path.display()))?;
            info!("Writing transcript to {}", path.display());
            Arc::new(logger)
        }
        None => Arc::new(NoConversationLogger),
    };

    // === Dependency Injection ===
    // Create infrastructure adapter (Copilot Gateway)
    let gateway = Arc::new(CopilotLlmGateway::new().await?);

    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if spinners_supported() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let result = RunCouncilUseCase::new(gateway, config)
        .with_logger(logger)
        .execute_with_progress(question, progress.as_ref())
        .await;

    // Output results
    let output = match format {
        OutputFormat::Full => ConsoleFormatter::format(&result),
        OutputFormat::Synthesis => ConsoleFormatter::format_synthesis_only(&result),
        OutputFormat::Json => ConsoleFormatter::format_json(&result),
    };

    println!("{}", output);

    if result.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Merge command-line flags over the file config over built-in defaults
fn build_config(cli: &Cli, file: &FileConfig) -> CouncilConfig {
    let defaults = CouncilConfig::default();

    let participants = Some(cli.models())
        .filter(|models| !models.is_empty())
        .or_else(|| file.council.parse_models().0)
        .unwrap_or(defaults.participants);

    let aggregator = cli
        .aggregator()
        .or_else(|| file.council.parse_aggregator().0)
        .unwrap_or(defaults.aggregator);

    let timeout = cli
        .timeout
        .map(std::time::Duration::from_secs)
        .or_else(|| file.council.parse_timeout().0)
        .unwrap_or(defaults.timeout);

    CouncilConfig::new(participants, aggregator)
        .with_timeout(timeout)
        .with_verbose(cli.verbose > 0)
}

fn transcript_path(cli: &Cli, file: &FileConfig) -> Option<PathBuf> {
    cli.transcript.clone().or_else(|| file.output.transcript.clone())
}

fn report_issues(issues: &[ConfigIssue]) {
    for issue in issues {
        match issue.severity {
            Severity::Error => eprintln!("config error: {}", issue.message),
            Severity::Warning => warn!("config: {}", issue.message),
        }
    }
}
