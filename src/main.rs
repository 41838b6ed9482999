use anyhow::{Context, Result, bail};
use std::io::Read;
use tracing::info;
use tracing_subscriber::EnvFilter;

use suppression_gate::cli::{self, CheckArgs, Commands, PolicyArgs, ScanArgs};
use suppression_gate::config::PolicyConfig;
use suppression_gate::git;
use suppression_gate::github::GithubClient;
use suppression_gate::policy::PolicyEvaluator;
use suppression_gate::report::{self, ConsoleReporter, GithubReporter};
use suppression_gate::scanner::scan_diff;

fn main() -> Result<()> {
    // RUST_LOG controls verbosity; diagnostics go to stderr so `scan` output
    // stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    match args.command {
        Commands::Check(check_args) => handle_check(&check_args),
        Commands::Scan(scan_args) => handle_scan(&scan_args),
    }
}

/// Build the policy evaluator from defaults, optional config file, and CLI
/// ignore globs.
fn load_policy(args: &PolicyArgs) -> Result<PolicyEvaluator> {
    let config = match &args.config {
        Some(path) => PolicyConfig::load(path)?,
        None => PolicyConfig::default(),
    }
    .with_extra_ignores(&args.ignore_paths);

    PolicyEvaluator::new(&config, &args.root)
}

/// Handle the check command - full pull-request run against the GitHub API.
fn handle_check(args: &CheckArgs) -> Result<()> {
    let policy = load_policy(&args.policy)?;
    let client = GithubClient::new(&args.api_url, &args.repo, &args.token)?;

    // Reruns must not stack comments: drop everything a previous run posted.
    let deleted = cleanup_stale_comments(&client, args.pr)?;
    if deleted > 0 {
        info!(deleted, "removed review comments from earlier runs");
    }

    let pr = client.pull_request(args.pr)?;

    // Shallow-fetch both endpoints so the diff can be computed post-checkout.
    git::fetch_commit(&pr.base.sha)?;
    git::fetch_commit(&pr.head.sha)?;
    let diff = git::diff_unified0(&pr.base.sha, &pr.head.sha)?;

    let mut reporter = GithubReporter::new(&client, args.pr, pr.head.sha.clone());
    let disallowed = scan_diff(&diff, &policy, &mut reporter)?;

    finish(disallowed, args.policy.continue_on_error)
}

/// Handle the scan command - evaluate a diff locally, print findings.
fn handle_scan(args: &ScanArgs) -> Result<()> {
    let policy = load_policy(&args.policy)?;

    let diff = match &args.diff {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("unable to read diff file {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("unable to read diff from stdin")?;
            buffer
        }
    };

    let mut reporter = ConsoleReporter;
    let disallowed = scan_diff(&diff, &policy, &mut reporter)?;

    finish(disallowed, args.policy.continue_on_error)
}

/// Delete review comments bearing this tool's marker prefix.
///
/// Returns the number of comments deleted. Comments from other authors or
/// without the marker are left alone.
fn cleanup_stale_comments(client: &GithubClient, pull_number: u64) -> Result<usize> {
    let comments = client.list_review_comments(pull_number)?;

    let mut deleted = 0;
    for comment in comments {
        if report::is_stale_comment(&comment.body) {
            client.delete_review_comment(comment.id)?;
            deleted += 1;
        }
    }

    Ok(deleted)
}

fn finish(disallowed: bool, continue_on_error: bool) -> Result<()> {
    if disallowed {
        if continue_on_error {
            eprintln!("⚠ Disallowed suppressions detected (continue-on-error set)");
            return Ok(());
        }
        bail!("detected a suppression that is not allowed");
    }

    println!("✓ No disallowed suppressions");
    Ok(())
}
