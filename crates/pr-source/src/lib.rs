//! Pull request source backed by the GitHub CLI
//!
//! This crate provides a trait-based source for pull request data. The diff
//! parser and analysis pipeline only see the trait, so tests and other forges
//! can plug in their own implementation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │           PullRequestSource trait            │
//! │  - list_open_pull_requests()                 │
//! │  - fetch_pull_request()                      │
//! │  - fetch_diff()                              │
//! │  - submit_review()                           │
//! └──────────────────────────────────────────────┘
//!                        │
//!                        ▼
//!              ┌──────────────────┐
//!              │   GhCliClient    │
//!              │ (spawns `gh`)    │
//!              └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use pr_source::{GhCliClient, PullRequestSource, RepoRef};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = GhCliClient::new();
//! let repo = RepoRef::parse("rust-lang/rust")?;
//!
//! let detail = client.fetch_pull_request(&repo, 1).await?;
//! let diff = client.fetch_diff(&repo, detail.number).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod gh_cli_client;
pub mod repo_ref;
pub mod types;

pub use client::PullRequestSource;
pub use gh_cli_client::{CommandError, GhCliClient};
pub use repo_ref::{parse_github_input, validate_pr_number, InputError, ParsedInput, RepoRef};
pub use types::{Author, ChangedFile, PullRequestDetail, PullRequestSummary, ReviewAction};
