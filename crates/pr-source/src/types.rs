//! Pull request data transfer objects
//!
//! These types mirror the JSON printed by `gh pr list --json` and
//! `gh pr view --json`. They are intentionally separate from the diff model
//! to keep the parser free of forge concerns.

use chrono::{DateTime, Utc};
use pr_config::AppConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A pull request author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// GitHub username
    pub login: String,
}

/// A pull request as listed for a repository
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestSummary {
    /// PR number (e.g., 123)
    pub number: u64,

    /// PR title
    pub title: String,

    /// PR author
    pub author: Author,

    /// Number of lines added
    pub additions: u64,

    /// Number of lines deleted
    pub deletions: u64,

    /// Number of changed files
    pub changed_files: u64,

    /// When the PR was created
    pub created_at: DateTime<Utc>,
}

/// Per-file change summary reported by the forge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// File path relative to repository root
    pub path: String,
    /// Number of lines added
    pub additions: u64,
    /// Number of lines deleted
    pub deletions: u64,
}

/// Full pull request metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestDetail {
    /// PR number
    pub number: u64,

    /// PR title
    pub title: String,

    /// PR author
    pub author: Author,

    /// PR body/description (empty when none was written)
    #[serde(default)]
    pub body: String,

    /// Number of lines added
    pub additions: u64,

    /// Number of lines deleted
    pub deletions: u64,

    /// Number of changed files
    pub changed_files: u64,

    /// When the PR was created
    pub created_at: DateTime<Utc>,

    /// HEAD commit SHA, used to key cached analyses
    pub head_ref_oid: String,

    /// Per-file change summaries
    #[serde(default)]
    pub files: Vec<ChangedFile>,
}

/// Review verdict submitted on a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    /// Approve the PR
    Approve,
    /// Comment only (no approval/rejection)
    Comment,
    /// Request changes
    RequestChanges,
}

impl ReviewAction {
    /// The `gh pr review` flag for this action
    pub fn as_flag(&self) -> &'static str {
        match self {
            ReviewAction::Approve => "--approve",
            ReviewAction::Comment => "--comment",
            ReviewAction::RequestChanges => "--request-changes",
        }
    }

    /// The configured default review body for this action
    pub fn default_message<'a>(&self, config: &'a AppConfig) -> &'a str {
        match self {
            ReviewAction::Approve => &config.approval_message,
            ReviewAction::Comment => &config.comment_message,
            ReviewAction::RequestChanges => &config.request_changes_message,
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReviewAction::Approve => "approve",
            ReviewAction::Comment => "comment",
            ReviewAction::RequestChanges => "request_changes",
        };
        f.write_str(name)
    }
}

impl FromStr for ReviewAction {
    type Err = crate::InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ReviewAction::Approve),
            "comment" => Ok(ReviewAction::Comment),
            "request_changes" => Ok(ReviewAction::RequestChanges),
            other => Err(crate::InputError::InvalidReviewAction(other.to_string())),
        }
    }
}
