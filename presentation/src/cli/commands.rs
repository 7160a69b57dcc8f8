//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for council results
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Full formatted output with all stages
    Full,
    /// Only the chairman's final answer
    Final,
    /// JSON output
    Json,
}

/// CLI arguments for llm-council
#[derive(Parser, Debug)]
#[command(name = "llm-council")]
#[command(author, version, about = "LLM Council - models answer, peer-rank, and synthesize")]
#[command(long_about = r#"
llm-council runs one question through a deliberative council of LLMs.

The process has three stages:
1. Council Responses: every member answers the question in parallel
2. Peer Rankings: each member ranks the anonymized answers of the others
3. Chairman Synthesis: a chairman model writes the final answer, informed
   by the answers and the aggregated rankings

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./council.toml      Project-level config
3. ~/.config/llm-council/config.toml   Global config

Example:
  llm-council "What's the best way to handle errors in Rust?"
  llm-council -m gpt-4o -m claude-sonnet-4-5 --chairman gpt-4o "Compare async runtimes"
  llm-council --save "Start a stored conversation"
"#)]
pub struct Cli {
    /// The question to put before the council
    pub question: Option<String>,

    /// Council member models (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Model to use as chairman for the final synthesis
    #[arg(long, value_name = "MODEL")]
    pub chairman: Option<String>,

    /// Continue a stored conversation by id
    #[arg(long, value_name = "ID")]
    pub conversation: Option<String>,

    /// Store this run as a new conversation
    #[arg(long)]
    pub save: bool,

    /// List stored conversations and exit
    #[arg(long)]
    pub list: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "final")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
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
}
