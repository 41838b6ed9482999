use crate::detector;
use crate::policy::PolicyEvaluator;
use crate::report::{self, ReportSink};
use crate::{PolicyDecision, ScanContext, SuppressionMatch};
use anyhow::Result;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("unable to parse line number from hunk header: {0:?}")]
    MalformedHunkHeader(String),
}

/// Classification of a single unified-diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLine<'a> {
    /// `+++ b<sep>path`; carries the path with the 6-character prefix stripped.
    FileHeader(&'a str),
    /// `@@ -a[,b] +c[,d] @@ ...`; raw header, parsed by the scan loop.
    HunkHeader(&'a str),
    /// A `+` content line (or any other line passing the first filter).
    AddedContent(&'a str),
    /// Deletion or context line; never affects the scan.
    Other,
}

/// Classify one diff line.
///
/// Only lines starting with `+` or `@` matter; everything else is deletion or
/// context and is skipped wholesale. Branch order mirrors the scan semantics:
/// a `+++ b` prefix wins over content, `@@` wins over content, and whatever
/// remains (including oddities like `+++ /dev/null`) counts as added content.
pub fn classify(line: &str) -> DiffLine<'_> {
    if !(line.starts_with('+') || line.starts_with('@')) {
        DiffLine::Other
    } else if line.starts_with("+++ b") {
        // Strip "+++ b" plus the path separator.
        DiffLine::FileHeader(line.get(6..).unwrap_or(""))
    } else if line.starts_with("@@") {
        DiffLine::HunkHeader(line)
    } else {
        DiffLine::AddedContent(line)
    }
}

/// Parse the added-side start line from a hunk header.
///
/// Accepts `@@ -<old>[,<count>] +<new>[,<count>] @@<anything>`; anything else
/// is fatal, since it means the diff format itself is off.
fn parse_hunk_header(line: &str) -> Result<u32, ScanError> {
    let malformed = || ScanError::MalformedHunkHeader(line.to_string());

    let rest = line.strip_prefix("@@ -").ok_or_else(malformed)?;
    let (old_range, rest) = rest.split_once(' ').ok_or_else(malformed)?;
    range_start(old_range).ok_or_else(malformed)?;

    let rest = rest.strip_prefix('+').ok_or_else(malformed)?;
    let (new_range, _) = rest.split_once(" @@").ok_or_else(malformed)?;
    range_start(new_range).ok_or_else(malformed)
}

/// Parse `start` or `start,count` (count may be empty). Returns the start.
fn range_start(s: &str) -> Option<u32> {
    let (start, count) = match s.split_once(',') {
        Some((start, count)) => (start, count),
        None => (s, ""),
    };
    if start.is_empty() || !start.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !count.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    start.parse().ok()
}

/// Scan a unified diff for suppression directives.
///
/// Walks the diff line by line, threading the (filename, line number) cursor
/// through file and hunk headers, detecting directives on added lines and
/// mapping each policy decision onto the sink. Returns whether at least one
/// disallowed suppression was found.
///
/// The diff must be produced with `--unified=0`: line numbers are counted on
/// the added side only, so context lines would throw the cursor off.
pub fn scan_diff(
    diff: &str,
    policy: &PolicyEvaluator,
    sink: &mut dyn ReportSink,
) -> Result<bool> {
    let mut ctx = ScanContext::default();
    let mut disallowed_found = false;

    for raw in diff.lines() {
        match classify(raw) {
            DiffLine::Other => {}
            DiffLine::FileHeader(path) => {
                ctx.filename = path.to_string();
            }
            DiffLine::HunkHeader(header) => {
                ctx.line_nr = parse_hunk_header(header)?;
            }
            DiffLine::AddedContent(line) => {
                if let Some(kind) = detector::detect(line) {
                    info!(
                        marker = kind.marker(),
                        file = %ctx.filename,
                        line = ctx.line_nr,
                        "detected suppression"
                    );
                    let matched = SuppressionMatch {
                        kind,
                        line_text: line.to_string(),
                        filename: ctx.filename.clone(),
                        line_nr: ctx.line_nr,
                    };
                    match policy.evaluate(&matched.filename, &matched.line_text)? {
                        PolicyDecision::AllowedWithWarning => {
                            sink.report(
                                &matched,
                                PolicyDecision::AllowedWithWarning,
                                report::SUPPRESSION_WARNING,
                            )?;
                        }
                        PolicyDecision::Disallowed => {
                            sink.report(
                                &matched,
                                PolicyDecision::Disallowed,
                                report::SUPPRESSION_NOT_ALLOWED,
                            )?;
                            disallowed_found = true;
                        }
                        PolicyDecision::AllowedSilent | PolicyDecision::SkippedIgnoredPath => {}
                    }
                }
                // Counted for every added line, after detection ran.
                ctx.line_nr += 1;
            }
        }
    }

    Ok(disallowed_found)
}
