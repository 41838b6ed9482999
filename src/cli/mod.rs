use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "suppression-gate",
    about = "Flag lint/analyzer suppressions added in a pull request"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a pull request and post review comments via the GitHub API.
    Check(CheckArgs),
    /// Scan a unified diff locally and print findings to stdout.
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Repository in owner/name form.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: String,

    /// Pull request number.
    #[arg(long)]
    pub pr: u64,

    /// Token used for the review-comment API calls.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Base URL of the GitHub REST API.
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub api_url: String,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Unified diff file to scan (reads stdin when omitted).
    /// Must be produced with `--unified=0`.
    #[arg(long)]
    pub diff: Option<PathBuf>,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

#[derive(Args, Debug)]
pub struct PolicyArgs {
    /// Working-tree root that diff paths are resolved against.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Glob pattern for paths whose suppressions are skipped (repeatable).
    #[arg(long = "ignore-path", value_name = "GLOB")]
    pub ignore_paths: Vec<String>,

    /// Report disallowed suppressions without failing the run.
    #[arg(long)]
    pub continue_on_error: bool,

    /// TOML file overriding the built-in allow-lists.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Parse CLI arguments.
pub fn parse_args() -> Cli {
    Cli::parse()
}
