//! Repository and pull request references
//!
//! Everything that ends up as a `gh` argument goes through here first.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Highest pull request number accepted
pub const MAX_PR_NUMBER: u64 = 999_999;

static REPO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._-]+/[a-zA-Z0-9._-]+$").expect("hardcoded repo regex")
});

static PR_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?github\.com/([^/]+)/([^/]+)/pull/(\d+)").expect("hardcoded PR URL regex")
});

static REPO_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?github\.com/([^/]+)/([^/\s]+)").expect("hardcoded repo URL regex")
});

static HASH_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^/\s]+)/([^#\s]+)#(\d+)$").expect("hardcoded owner/repo#N regex"));

static SLASH_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^/\s]+)/([^/\s]+)/(\d+)$").expect("hardcoded owner/repo/N regex"));

static OWNER_REPO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^/\s]+)/([^/\s]+)$").expect("hardcoded owner/repo regex"));

/// Errors for user-supplied identifiers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid repo format: {0}")]
    InvalidRepo(String),

    #[error("Invalid PR number: {0}")]
    InvalidPrNumber(u64),

    #[error("Invalid review action: {0}")]
    InvalidReviewAction(String),
}

/// A validated `owner/name` repository reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parse and validate `owner/name`
    ///
    /// Only ASCII letters, digits, `.`, `_` and `-` are allowed on either side.
    pub fn parse(input: &str) -> Result<Self, InputError> {
        if !REPO_RE.is_match(input) {
            return Err(InputError::InvalidRepo(input.to_string()));
        }
        let (owner, name) = input
            .split_once('/')
            .ok_or_else(|| InputError::InvalidRepo(input.to_string()))?;
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Build from separate parts, validating the combination
    pub fn new(owner: &str, name: &str) -> Result<Self, InputError> {
        Self::parse(&format!("{}/{}", owner, name))
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Check that a pull request number lies in `1..=999_999`
pub fn validate_pr_number(number: u64) -> Result<u64, InputError> {
    if number == 0 || number > MAX_PR_NUMBER {
        return Err(InputError::InvalidPrNumber(number));
    }
    Ok(number)
}

/// Result of reading a free-form repository or pull request reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    pub owner: String,
    pub repo: String,
    /// Set when the input pointed at a specific pull request
    pub number: Option<u64>,
}

impl ParsedInput {
    fn new(owner: &str, repo: &str, number: Option<u64>) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        }
    }

    /// Validate into a [`RepoRef`]
    pub fn repo_ref(&self) -> Result<RepoRef, InputError> {
        RepoRef::new(&self.owner, &self.repo)
    }
}

/// Read a repository or pull request reference typed by a user
///
/// Accepted forms, tried in this order:
/// - `https://github.com/OWNER/REPO/pull/NUMBER`
/// - `https://github.com/OWNER/REPO` (a trailing `.git` is dropped)
/// - `OWNER/REPO#NUMBER`
/// - `OWNER/REPO/NUMBER`
/// - `OWNER/REPO`
///
/// The scheme is optional for URLs. Returns `None` for anything else.
pub fn parse_github_input(input: &str) -> Option<ParsedInput> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = PR_URL_RE.captures(trimmed) {
        let number = caps[3].parse().ok()?;
        return Some(ParsedInput::new(&caps[1], &caps[2], Some(number)));
    }

    if let Some(caps) = REPO_URL_RE.captures(trimmed) {
        let repo = caps[2].strip_suffix(".git").unwrap_or(&caps[2]);
        return Some(ParsedInput::new(&caps[1], repo, None));
    }

    for re in [&*HASH_NUMBER_RE, &*SLASH_NUMBER_RE] {
        if let Some(caps) = re.captures(trimmed) {
            let number = caps[3].parse().ok()?;
            return Some(ParsedInput::new(&caps[1], &caps[2], Some(number)));
        }
    }

    OWNER_REPO_RE
        .captures(trimmed)
        .map(|caps| ParsedInput::new(&caps[1], &caps[2], None))
}
