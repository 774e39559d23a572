//! CLI command definitions

use clap::{Parser, ValueEnum};
use council_domain::Model;
use std::path::PathBuf;

/// Output format for council results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every answer, the peer rankings, the final answer and a summary
    Full,
    /// Only the final answer
    Synthesis,
    /// The whole result as JSON
    Json,
}

impl From<OutputFormat> for council_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => council_domain::OutputFormat::Full,
            OutputFormat::Synthesis => council_domain::OutputFormat::Synthesis,
            OutputFormat::Json => council_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for copilot-council
#[derive(Parser, Debug)]
#[command(name = "copilot-council")]
#[command(author, version, about = "AI model council - several models answer, rank each other, and one synthesizes")]
#[command(long_about = r#"
Copilot Council asks several models the same question and turns their answers
into one decisive answer.

The process has three stages:
1. Initial Responses: every model answers your question in parallel
2. Peer Review: each model ranks the others' answers without knowing who wrote them
3. Final Synthesis: an aggregator model writes the final answer from both

Configuration is loaded from (in priority order):
1. COUNCIL_* environment variables (e.g. COUNCIL_COUNCIL__TIMEOUT_SECS=120)
2. --config <path>     Explicit config file
3. ./council.toml      Project-level config
4. ~/.config/copilot-council/config.toml   Global config

Example:
  copilot-council "What's the best way to handle errors in Rust?"
  copilot-council -m gpt-5.2 -m claude-sonnet-4.5 -a gpt-4.1 "Compare async runtimes"
  copilot-council -m gpt-5.2,gemini-3-pro-preview -o synthesis "Explain CRDTs"
"#)]
pub struct Cli {
    /// The question to ask the council
    #[arg(required_unless_present = "show_config")]
    pub question: Option<String>,

    /// Models to include in the council (repeatable, or comma-separated)
    #[arg(short, long, value_name = "MODEL", value_delimiter = ',')]
    pub model: Vec<String>,

    /// Model that writes the final synthesis
    #[arg(short, long, value_name = "MODEL")]
    pub aggregator: Option<String>,

    /// Per-call timeout in seconds
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format [default: full]
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = show prompts and info logs, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write a JSONL transcript of every prompt and reply
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,
}

impl Cli {
    /// Participant models given on the command line, blanks dropped
    pub fn models(&self) -> Vec<Model> {
        self.model
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(Model::from)
            .collect()
    }

    pub fn aggregator(&self) -> Option<Model> {
        self.aggregator.as_deref().map(Model::from)
    }
}
