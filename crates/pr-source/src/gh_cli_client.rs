//! GitHub CLI based pull request source
//!
//! Direct implementation of the `PullRequestSource` trait that spawns the
//! `gh` program. Arguments are passed as a vector, never through a shell,
//! so review bodies need no quoting.

use crate::client::PullRequestSource;
use crate::repo_ref::{validate_pr_number, RepoRef};
use crate::types::{PullRequestDetail, PullRequestSummary, ReviewAction};
use anyhow::Context;
use async_trait::async_trait;
use log::debug;
use pr_config::AppConfig;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

const LIST_FIELDS: &str = "number,title,author,additions,deletions,changedFiles,createdAt";
const VIEW_FIELDS: &str =
    "number,title,author,body,additions,deletions,changedFiles,createdAt,headRefOid,files";

/// Errors from running the `gh` program
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read output of '{command}': {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("'{command}' timed out after {seconds}s")]
    TimedOut { command: String, seconds: u64 },

    #[error("'{command}' failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("'{command}' produced more than {limit} bytes of output")]
    OutputTooLarge { command: String, limit: usize },

    #[error("'{command}' printed invalid UTF-8")]
    InvalidUtf8 { command: String },
}

/// Pull request source that shells out to the GitHub CLI
///
/// Authentication is whatever `gh auth` is configured with.
#[derive(Debug, Clone)]
pub struct GhCliClient {
    program: String,
    read_timeout: Duration,
    review_timeout: Duration,
    max_output_bytes: usize,
    list_limit: u32,
}

impl Default for GhCliClient {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl GhCliClient {
    /// Create a client with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client using the configured program, timeouts and limits
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            program: config.gh_command.clone(),
            read_timeout: Duration::from_secs(config.command_timeout_secs),
            review_timeout: Duration::from_secs(config.review_timeout_secs),
            max_output_bytes: config.max_output_bytes,
            list_limit: config.pr_list_limit,
        }
    }

    /// Use a different executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Use a different output ceiling
    pub fn with_max_output_bytes(mut self, limit: usize) -> Self {
        self.max_output_bytes = limit;
        self
    }

    /// The executable this client spawns
    pub fn program(&self) -> &str {
        &self.program
    }

    fn list_args(&self, repo: &RepoRef) -> Vec<String> {
        vec![
            "pr".into(),
            "list".into(),
            "--repo".into(),
            repo.to_string(),
            "--json".into(),
            LIST_FIELDS.into(),
            "--limit".into(),
            self.list_limit.to_string(),
        ]
    }

    fn view_args(repo: &RepoRef, number: u64) -> Vec<String> {
        vec![
            "pr".into(),
            "view".into(),
            number.to_string(),
            "--repo".into(),
            repo.to_string(),
            "--json".into(),
            VIEW_FIELDS.into(),
        ]
    }

    fn diff_args(repo: &RepoRef, number: u64) -> Vec<String> {
        vec![
            "pr".into(),
            "diff".into(),
            number.to_string(),
            "--repo".into(),
            repo.to_string(),
        ]
    }

    fn review_args(
        repo: &RepoRef,
        number: u64,
        action: ReviewAction,
        body: Option<&str>,
    ) -> Vec<String> {
        let mut args = vec![
            "pr".into(),
            "review".into(),
            number.to_string(),
            "--repo".into(),
            repo.to_string(),
            action.as_flag().into(),
        ];
        if let Some(body) = body.filter(|b| !b.trim().is_empty()) {
            args.push("--body".into());
            args.push(body.to_string());
        }
        args
    }

    /// Short description of a command for logs and errors (the review body
    /// is left out).
    fn describe(&self, args: &[String]) -> String {
        let shown: Vec<&str> = args
            .iter()
            .map(String::as_str)
            .take_while(|arg| *arg != "--body")
            .collect();
        format!("{} {}", self.program, shown.join(" "))
    }

    /// Run the program and return its stdout
    ///
    /// The child is killed as soon as stdout grows past the output ceiling
    /// or the timeout expires.
    async fn run(&self, args: Vec<String>, timeout: Duration) -> Result<String, CommandError> {
        let command = self.describe(&args);
        debug!("Running {}", command);

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        match tokio::time::timeout(timeout, self.collect(&mut child, &command)).await {
            Ok(result) => result,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    debug!("Failed to kill {}: {}", command, e);
                }
                Err(CommandError::TimedOut {
                    command,
                    seconds: timeout.as_secs(),
                })
            }
        }
    }

    /// Read a running child's output and wait for it to exit
    async fn collect(&self, child: &mut Child, command: &str) -> Result<String, CommandError> {
        let io_error = |source: io::Error| CommandError::Io {
            command: command.to_string(),
            source,
        };
        let limit = self.max_output_bytes;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io_error(io::Error::other("stdout not captured")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io_error(io::Error::other("stderr not captured")))?;

        // stderr is drained alongside so a chatty child cannot block on it
        let stderr_task = tokio::spawn(read_capped(stderr, limit));
        let stdout = read_capped(stdout, limit).await.map_err(io_error)?;

        if stdout.len() > limit {
            stderr_task.abort();
            if let Err(e) = child.kill().await {
                debug!("Failed to kill {}: {}", command, e);
            }
            return Err(CommandError::OutputTooLarge {
                command: command.to_string(),
                limit,
            });
        }

        let status = child.wait().await.map_err(io_error)?;
        let stderr = stderr_task
            .await
            .ok()
            .and_then(Result::ok)
            .unwrap_or_default();

        if !status.success() {
            return Err(CommandError::Failed {
                command: command.to_string(),
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        debug!("{} returned {} bytes", command, stdout.len());
        String::from_utf8(stdout).map_err(|_| CommandError::InvalidUtf8 {
            command: command.to_string(),
        })
    }
}

/// Read at most `limit + 1` bytes, enough to tell whether `limit` was exceeded
async fn read_capped<R>(reader: R, limit: usize) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    reader.take(cap).read_to_end(&mut buf).await?;
    Ok(buf)
}

#[async_trait]
impl PullRequestSource for GhCliClient {
    async fn list_open_pull_requests(
        &self,
        repo: &RepoRef,
    ) -> anyhow::Result<Vec<PullRequestSummary>> {
        let json = self.run(self.list_args(repo), self.read_timeout).await?;
        let prs: Vec<PullRequestSummary> =
            serde_json::from_str(&json).context("Failed to parse `gh pr list` output")?;
        debug!("Fetched {} open PRs for {}", prs.len(), repo);
        Ok(prs)
    }

    async fn fetch_pull_request(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> anyhow::Result<PullRequestDetail> {
        let number = validate_pr_number(number)?;
        let json = self
            .run(Self::view_args(repo, number), self.read_timeout)
            .await?;
        serde_json::from_str(&json).context("Failed to parse `gh pr view` output")
    }

    async fn fetch_diff(&self, repo: &RepoRef, number: u64) -> anyhow::Result<String> {
        let number = validate_pr_number(number)?;
        Ok(self
            .run(Self::diff_args(repo, number), self.read_timeout)
            .await?)
    }

    async fn submit_review(
        &self,
        repo: &RepoRef,
        number: u64,
        action: ReviewAction,
        body: Option<&str>,
    ) -> anyhow::Result<()> {
        let number = validate_pr_number(number)?;
        self.run(
            Self::review_args(repo, number, action, body),
            self.review_timeout,
        )
        .await?;
        debug!("Submitted {} review on {}#{}", action, repo, number);
        Ok(())
    }
}
