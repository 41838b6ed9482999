use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Pull-request metadata, reduced to the commits the scan needs.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub base: CommitRef,
    pub head: CommitRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

/// An existing pull-request review comment.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewComment {
    pub id: u64,
    pub body: String,
}

/// Minimal blocking client for the GitHub REST endpoints this tool touches:
/// pull-request metadata and review-comment list/delete/create.
///
/// Every call is fatal on failure; callers get a descriptive context on the
/// error chain and no retries.
pub struct GithubClient {
    http: Client,
    api_url: String,
    repo: String,
    token: String,
}

impl GithubClient {
    /// `repo` is `owner/name`; `api_url` defaults to the public API and can
    /// point at a GitHub Enterprise instance.
    pub fn new(api_url: &str, repo: &str, token: &str) -> Result<Self> {
        if repo.split('/').filter(|part| !part.is_empty()).count() != 2 {
            bail!("invalid repository '{repo}', expected owner/name");
        }

        let http = Client::builder()
            .user_agent(concat!("suppression-gate/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .context("unable to build http client")?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}", self.api_url, self.repo, path)
    }

    pub fn pull_request(&self, number: u64) -> Result<PullRequest> {
        let url = self.repo_url(&format!("pulls/{number}"));
        debug!(%url, "fetching pull request");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .and_then(|r| r.error_for_status())
            .context("unable to get pull request info")?;
        response.json().context("unable to get pull request info")
    }

    pub fn list_review_comments(&self, number: u64) -> Result<Vec<ReviewComment>> {
        let url = self.repo_url(&format!("pulls/{number}/comments"));
        debug!(%url, "listing review comments");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .query(&[("per_page", "100")])
            .send()
            .and_then(|r| r.error_for_status())
            .context("unable to get review comments")?;
        response.json().context("unable to get review comments")
    }

    pub fn delete_review_comment(&self, comment_id: u64) -> Result<()> {
        let url = self.repo_url(&format!("pulls/comments/{comment_id}"));
        debug!(%url, "deleting review comment");
        self.http
            .delete(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .and_then(|r| r.error_for_status())
            .context("unable to delete review comment")?;
        Ok(())
    }

    /// Create a review comment anchored to an added-side line of the head
    /// commit.
    pub fn create_review_comment(
        &self,
        number: u64,
        commit_id: &str,
        path: &str,
        line: u32,
        body: &str,
    ) -> Result<()> {
        let url = self.repo_url(&format!("pulls/{number}/comments"));
        debug!(%url, path, line, "creating review comment");
        self.http
            .post(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&json!({
                "body": body,
                "commit_id": commit_id,
                "path": path,
                "line": line,
            }))
            .send()
            .and_then(|r| r.error_for_status())
            .context("unable to create review comment")?;
        Ok(())
    }
}
