use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("git command failed: {0}")]
    CommandFailed(String),
    #[error("invalid git ref: {0}")]
    InvalidRef(String),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GitError>;

/// Validate a git ref to prevent shell injection (only for user-supplied refs).
pub fn validate_git_ref(ref_str: &str) -> Result<()> {
    if ref_str.is_empty() {
        return Err(GitError::InvalidRef("Empty git ref".to_string()));
    }

    // Check for shell metacharacters
    for ch in ref_str.chars() {
        if !ch.is_alphanumeric() && !matches!(ch, '-' | '_' | '/' | '.' | '~' | '^' | '@' | ':') {
            return Err(GitError::InvalidRef(format!(
                "Invalid character in git ref: '{}'",
                ch
            )));
        }
    }

    Ok(())
}

/// Shallow-fetch a single commit so the diff below has both endpoints.
pub fn fetch_commit(sha: &str) -> Result<()> {
    validate_git_ref(sha)?;

    let output = Command::new("git")
        .args([
            "fetch",
            "--no-tags",
            "--prune",
            "--no-recurse-submodules",
            "--depth=1",
            "origin",
            sha,
        ])
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::CommandFailed(format!(
            "git fetch {} failed: {}",
            sha, stderr
        )));
    }

    Ok(())
}

/// Diff two commits with zero context lines.
///
/// The scanner counts added-side line numbers from hunk headers alone, so the
/// diff must not contain context lines.
pub fn diff_unified0(base: &str, head: &str) -> Result<String> {
    validate_git_ref(base)?;
    validate_git_ref(head)?;

    let output = Command::new("git")
        .args(["diff", "--unified=0", base, head])
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::CommandFailed(format!(
            "git diff failed: {}",
            stderr
        )));
    }

    String::from_utf8(output.stdout).map_err(GitError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_shas_and_ranges() {
        assert!(validate_git_ref("deadbeefcafe").is_ok());
        assert!(validate_git_ref("main..HEAD").is_ok());
        assert!(validate_git_ref("origin/feature-1").is_ok());
        assert!(validate_git_ref("HEAD~3").is_ok());
    }

    #[test]
    fn rejects_shell_metacharacters() {
        assert!(validate_git_ref("").is_err());
        assert!(validate_git_ref("main; rm -rf /").is_err());
        assert!(validate_git_ref("$(whoami)").is_err());
        assert!(validate_git_ref("a b").is_err());
    }
}
