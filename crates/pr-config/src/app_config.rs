//! Application configuration
//!
//! Configuration loaded from `.pr-briefing.toml`. Every field has a default,
//! so partial files are fine.

use serde::{Deserialize, Serialize};

/// Analysis results kept in memory when nothing is configured
pub const DEFAULT_ANALYSIS_CACHE_CAPACITY: usize = 50;

/// Files analysed at the same time when nothing is configured
pub const DEFAULT_MAX_CONCURRENT_ANALYSES: usize = 8;

/// Application configuration loaded from .pr-briefing.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Program used to talk to the forge (the GitHub CLI)
    #[serde(default = "default_gh_command")]
    pub gh_command: String,

    /// Timeout for read commands (list, view, diff), in seconds
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// Timeout for review submission, in seconds
    #[serde(default = "default_review_timeout_secs")]
    pub review_timeout_secs: u64,

    /// Largest accepted command output, in bytes
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,

    /// How many open pull requests to list
    #[serde(default = "default_pr_list_limit")]
    pub pr_list_limit: u32,

    /// How many analysis results to keep in memory
    #[serde(default = "default_analysis_cache_capacity")]
    pub analysis_cache_capacity: usize,

    /// How many files are analysed at the same time
    #[serde(default = "default_max_concurrent_analyses")]
    pub max_concurrent_analyses: usize,

    /// Default message for PR approvals
    #[serde(default = "default_approval_message")]
    pub approval_message: String,

    /// Default message for PR comments
    #[serde(default = "default_comment_message")]
    pub comment_message: String,

    /// Default message for requesting changes on PRs
    #[serde(default = "default_request_changes_message")]
    pub request_changes_message: String,
}

fn default_gh_command() -> String {
    "gh".to_string()
}

fn default_command_timeout_secs() -> u64 {
    30
}

fn default_review_timeout_secs() -> u64 {
    15
}

fn default_max_output_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_pr_list_limit() -> u32 {
    20
}

fn default_analysis_cache_capacity() -> usize {
    DEFAULT_ANALYSIS_CACHE_CAPACITY
}

fn default_max_concurrent_analyses() -> usize {
    DEFAULT_MAX_CONCURRENT_ANALYSES
}

fn default_approval_message() -> String {
    ":rocket: thanks for your contribution".to_string()
}

fn default_comment_message() -> String {
    String::new() // Empty default - user must enter comment
}

fn default_request_changes_message() -> String {
    "Please address the following concerns:".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gh_command: default_gh_command(),
            command_timeout_secs: default_command_timeout_secs(),
            review_timeout_secs: default_review_timeout_secs(),
            max_output_bytes: default_max_output_bytes(),
            pr_list_limit: default_pr_list_limit(),
            analysis_cache_capacity: default_analysis_cache_capacity(),
            max_concurrent_analyses: default_max_concurrent_analyses(),
            approval_message: default_approval_message(),
            comment_message: default_comment_message(),
            request_changes_message: default_request_changes_message(),
        }
    }
}

impl AppConfig {
    /// Load config from CWD first, then home directory, then the platform
    /// config directory, or use defaults
    pub fn load() -> Self {
        let content = crate::load_config_file().or_else(|| {
            crate::paths::app_config_path()
                .ok()
                .and_then(|path| crate::load_config_file_from(&[path]))
        });

        match content {
            Some(content) => Self::from_toml(&content),
            None => {
                log::debug!("Using default app config");
                Self::default()
            }
        }
    }

    /// Parse config text, falling back to defaults when it is invalid
    pub fn from_toml(content: &str) -> Self {
        match toml::from_str(content) {
            Ok(config) => {
                log::info!("Loaded app config from file");
                config
            }
            Err(e) => {
                log::warn!("Failed to parse config file: {}", e);
                Self::default()
            }
        }
    }
}
