//! Pull request source trait
//!
//! This module defines the `PullRequestSource` trait that every forge
//! implementation must satisfy.

use crate::repo_ref::RepoRef;
use crate::types::{PullRequestDetail, PullRequestSummary, ReviewAction};
use async_trait::async_trait;

/// Source of pull request data
///
/// Defines the interface for reading pull requests and posting reviews.
/// The diff text returned by [`fetch_diff`](Self::fetch_diff) is plain
/// unified diff, ready for `pr_diff::parse_unified_diff`.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so per-request work can share one
/// source across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use pr_source::{PullRequestSource, RepoRef};
///
/// async fn head_sha(source: &dyn PullRequestSource, repo: &RepoRef) -> anyhow::Result<String> {
///     Ok(source.fetch_pull_request(repo, 42).await?.head_ref_oid)
/// }
/// ```
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// List open pull requests for a repository
    async fn list_open_pull_requests(
        &self,
        repo: &RepoRef,
    ) -> anyhow::Result<Vec<PullRequestSummary>>;

    /// Fetch title, description, head commit and file summaries of one PR
    ///
    /// # Arguments
    ///
    /// * `repo` - Repository reference
    /// * `number` - Pull request number (1..=999999)
    async fn fetch_pull_request(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> anyhow::Result<PullRequestDetail>;

    /// Fetch the raw unified diff of one PR
    async fn fetch_diff(&self, repo: &RepoRef, number: u64) -> anyhow::Result<String>;

    /// Submit a review
    ///
    /// # Arguments
    ///
    /// * `repo` - Repository reference
    /// * `number` - Pull request number
    /// * `action` - Approve, comment, or request changes
    /// * `body` - Optional review body; blank bodies are not sent
    async fn submit_review(
        &self,
        repo: &RepoRef,
        number: u64,
        action: ReviewAction,
        body: Option<&str>,
    ) -> anyhow::Result<()>;
}
