use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rubric",
    version,
    about = "LLM-judged quality scoring for educational content — evaluate, batch, compare, and track"
)]
pub struct Cli {
    /// Engine configuration file
    #[arg(long, global = true, default_value = "rubric.yaml")]
    pub config: PathBuf,

    /// Emit machine-readable JSON instead of console output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a starter rubric.yaml
    Init(InitArgs),
    /// Score one piece of content against its template
    Evaluate(EvaluateArgs),
    /// Score many pieces of content, tolerating per-item failures
    Batch(BatchArgs),
    /// Compare candidate content against a reference text
    Compare(CompareArgs),
    /// Inspect and manage evaluation templates
    Templates(TemplatesArgs),
    /// Score distributions and common issues over stored history
    Analytics(AnalyticsArgs),
    /// Improvement recommendations from stored history
    Recommend,
}

#[derive(clap::Args)]
pub struct InitArgs {
    #[arg(long, default_value = "rubric.yaml")]
    pub path: PathBuf,
}

#[derive(clap::Args)]
pub struct EvaluateArgs {
    /// File holding the content to score
    #[arg(long)]
    pub content: PathBuf,

    /// Identifier recorded with the result; defaults to the file name
    #[arg(long)]
    pub target_id: Option<String>,

    #[arg(long, default_value = "general")]
    pub content_type: String,

    #[arg(long, default_value = "general")]
    pub audience: String,
}

#[derive(clap::Args)]
pub struct BatchArgs {
    /// JSONL file, one evaluation request per line
    #[arg(long)]
    pub input: PathBuf,
}

#[derive(clap::Args)]
pub struct CompareArgs {
    #[arg(long)]
    pub candidate: PathBuf,

    #[arg(long)]
    pub reference: PathBuf,

    #[arg(long, default_value = "general")]
    pub content_type: String,
}

#[derive(clap::Args)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub cmd: TemplatesCmd,
}

#[derive(Subcommand)]
pub enum TemplatesCmd {
    /// List registered templates
    List,
    /// Show which template a content type and audience resolve to
    Recommend {
        #[arg(long)]
        content_type: String,
        #[arg(long, default_value = "general")]
        audience: String,
    },
    /// Register a custom template from a YAML file
    Add {
        #[arg(long)]
        file: PathBuf,
    },
    /// Remove a template by id (no-op when absent)
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(clap::Args)]
pub struct AnalyticsArgs {
    /// Window start, RFC 3339; default 30 days ago
    #[arg(long)]
    pub from: Option<String>,

    /// Window end, RFC 3339; default now
    #[arg(long)]
    pub to: Option<String>,

    #[arg(long, default_value = "day")]
    pub granularity: String,
}
