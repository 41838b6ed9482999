use crate::github::GithubClient;
use crate::{PolicyDecision, SuppressionMatch};
use anyhow::Result;

/// Marker prefix identifying review comments created by this tool, so a later
/// run can find and delete them.
pub const COMMENT_PREFIX: &str = "[suppression-gate]";

pub const SUPPRESSION_WARNING: &str = "Suppressions should not be used, please make sure with the Project Team that this suppression is ok.";
pub const SUPPRESSION_NOT_ALLOWED: &str = "This suppression is not allowed, please remove it.";

/// Where findings go: GitHub review comments for `check`, stdout for `scan`.
///
/// One call per finding; the scan loop only reports decisions that warrant a
/// comment (warnings and disallowed ones).
pub trait ReportSink {
    fn report(
        &mut self,
        matched: &SuppressionMatch,
        decision: PolicyDecision,
        body: &str,
    ) -> Result<()>;
}

/// True for a review comment created by an earlier run of this tool.
pub fn is_stale_comment(body: &str) -> bool {
    body.contains(COMMENT_PREFIX)
}

/// Posts findings as pull-request review comments anchored to the added line.
pub struct GithubReporter<'a> {
    client: &'a GithubClient,
    pull_number: u64,
    commit_id: String,
}

impl<'a> GithubReporter<'a> {
    pub fn new(client: &'a GithubClient, pull_number: u64, commit_id: String) -> Self {
        Self {
            client,
            pull_number,
            commit_id,
        }
    }
}

impl ReportSink for GithubReporter<'_> {
    fn report(
        &mut self,
        matched: &SuppressionMatch,
        _decision: PolicyDecision,
        body: &str,
    ) -> Result<()> {
        self.client.create_review_comment(
            self.pull_number,
            &self.commit_id,
            &matched.filename,
            matched.line_nr,
            &format!("{COMMENT_PREFIX}\n{body}"),
        )
    }
}

/// Prints findings to stdout, one line each.
pub struct ConsoleReporter;

impl ReportSink for ConsoleReporter {
    fn report(
        &mut self,
        matched: &SuppressionMatch,
        decision: PolicyDecision,
        body: &str,
    ) -> Result<()> {
        let glyph = match decision {
            PolicyDecision::Disallowed => "✗",
            _ => "⚠",
        };
        println!(
            "{} {}:{} [{}] {}",
            glyph,
            matched.filename,
            matched.line_nr,
            matched.kind.marker(),
            body
        );
        Ok(())
    }
}
